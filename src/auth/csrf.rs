//! Double-submit-cookie CSRF protection.
//!
//! `CsrfIssuer` wraps the token-fetch endpoint: it mints a token, parks it in the request
//! extensions for the handler to echo back, and sets the `_csrf` cookie once the handler has
//! answered successfully. `CsrfValidator` guards every state-changing route and lets a request
//! through only when the `_csrf` cookie and the `X-CSRF-Token` header carry the same value.
//! No token is stored server side; validity is purely structural.

use std::future::{ready, Ready};

use actix_web::{
    body::EitherBody,
    cookie::time::Duration as CookieDuration,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::LocalBoxFuture;
use subtle::ConstantTimeEq;

use crate::auth::cookie::{CookiePolicy, CSRF_COOKIE, CSRF_HEADER};
use crate::error::{reject, AppError};

/// Lifetime of a CSRF cookie.
pub const CSRF_TTL_SECONDS: i64 = 60 * 60;

const TOKEN_BYTES: usize = 32;

/// Anti-forgery token minted for the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl CsrfToken {
    /// 256 bits from the thread-local CSPRNG, hex encoded.
    pub fn generate() -> Self {
        let bytes: [u8; TOKEN_BYTES] = rand::random();
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl FromRequest for CsrfToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<CsrfToken>().cloned() {
            Some(token) => ready(Ok(token)),
            None => ready(Err(AppError::InternalServerError(
                "CSRF token requested on a route without CsrfIssuer".into(),
            )
            .into())),
        }
    }
}

/// Why a request failed the double-submit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    MissingCookie,
    MissingHeader,
    Mismatch,
}

impl CsrfRejection {
    pub fn message(&self) -> &'static str {
        match self {
            CsrfRejection::MissingCookie | CsrfRejection::MissingHeader => "csrf token required",
            CsrfRejection::Mismatch => "invalid csrf token",
        }
    }
}

/// Passes iff both values are present, non-empty and byte-equal.
pub fn check_double_submit(
    cookie: Option<&str>,
    header: Option<&str>,
) -> Result<(), CsrfRejection> {
    let cookie = cookie
        .filter(|value| !value.is_empty())
        .ok_or(CsrfRejection::MissingCookie)?;
    let header = header
        .filter(|value| !value.is_empty())
        .ok_or(CsrfRejection::MissingHeader)?;

    if bool::from(cookie.as_bytes().ct_eq(header.as_bytes())) {
        Ok(())
    } else {
        Err(CsrfRejection::Mismatch)
    }
}

pub struct CsrfIssuer {
    cookies: CookiePolicy,
}

impl CsrfIssuer {
    pub fn new(cookies: CookiePolicy) -> Self {
        Self { cookies }
    }
}

impl<S, B> Transform<S, ServiceRequest> for CsrfIssuer
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = CsrfIssuerService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfIssuerService {
            service,
            cookies: self.cookies.clone(),
        }))
    }
}

pub struct CsrfIssuerService<S> {
    service: S,
    cookies: CookiePolicy,
}

impl<S, B> Service<ServiceRequest> for CsrfIssuerService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = CsrfToken::generate();
        req.extensions_mut().insert(token.clone());
        let cookie = self
            .cookies
            .csrf_cookie(token.into_inner(), CookieDuration::seconds(CSRF_TTL_SECONDS));

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;
            // A failed fetch must not leave a cookie behind.
            if res.status().is_success() {
                res.response_mut().add_cookie(&cookie).map_err(|e| {
                    Error::from(AppError::InternalServerError(format!(
                        "Failed to set csrf cookie: {}",
                        e
                    )))
                })?;
                log::debug!("CSRF token issued");
            }
            Ok(res)
        })
    }
}

/// Rejects with 403 unless the `_csrf` cookie matches the `X-CSRF-Token` header.
pub struct CsrfValidator;

impl<S, B> Transform<S, ServiceRequest> for CsrfValidator
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = CsrfValidatorService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(CsrfValidatorService { service }))
    }
}

pub struct CsrfValidatorService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for CsrfValidatorService<S>
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
        let outcome = {
            let cookie = req.request().cookie(CSRF_COOKIE);
            let header = req
                .headers()
                .get(CSRF_HEADER)
                .and_then(|value| value.to_str().ok());
            check_double_submit(cookie.as_ref().map(|c| c.value()), header)
        };

        match outcome {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => {
                log::warn!(
                    "CSRF validation failed for {} {}: {:?}",
                    req.method(),
                    req.path(),
                    rejection
                );
                let err = AppError::Forbidden(rejection.message().into());
                Box::pin(async move { Ok(reject(req, err)) })
            }
        }
    }
}
