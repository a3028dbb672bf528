use std::future::{ready, Ready};
use std::sync::Arc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;

use crate::auth::cookie::SESSION_COOKIE;
use crate::auth::token::{TokenService, AUTHENTICATION_FAILED};
use crate::error::{reject, AppError};

/// Validates the session cookie and attaches the verified `Claims` to the request.
///
/// Mounted innermost: only requests that passed the CSRF and body checks pay for the
/// signature check.
pub struct SessionAuth {
    tokens: Arc<TokenService>,
}

impl SessionAuth {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = SessionAuthService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthService {
            service,
            tokens: Arc::clone(&self.tokens),
        }))
    }
}

pub struct SessionAuthService<S> {
    service: S,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for SessionAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req.request().cookie(SESSION_COOKIE);

        let verified = match token {
            Some(cookie) if !cookie.value().is_empty() => self.tokens.verify(cookie.value()),
            _ => {
                log::warn!("Session cookie not found for {} {}", req.method(), req.path());
                Err(AppError::Unauthorized(AUTHENTICATION_FAILED.into()))
            }
        };

        match verified {
            Ok(claims) => {
                log::debug!("User {} authenticated", claims.user_id);
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(err) => Box::pin(async move { Ok(reject(req, err)) }),
        }
    }
}
