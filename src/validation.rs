//! Request-shape gate.
//!
//! Sits between the CSRF check and session authentication. A mutating request that carries
//! a body must carry a JSON object, otherwise it is answered with 400 before any token is
//! verified. Field-level rules are enforced later by the handlers through `validator`.

use std::future::{ready, Ready};
use std::rc::Rc;

use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::Method,
    web, Error,
};
use futures::future::LocalBoxFuture;
use validator::Validate;

use crate::error::{reject, AppError};

/// Runs the field rules of a decoded body, logging what was rejected.
pub fn validate_fields<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        log::warn!("Field validation failed: {}", errors);
        AppError::from(errors)
    })
}

/// Why a body failed the structural check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyRejection {
    Malformed,
    NotAnObject,
}

impl BodyRejection {
    pub fn message(&self) -> &'static str {
        match self {
            BodyRejection::Malformed => "malformed JSON body",
            BodyRejection::NotAnObject => "request body must be a JSON object",
        }
    }
}

/// An empty body passes; anything else must parse as a JSON object.
pub fn check_body(body: &[u8]) -> Result<(), BodyRejection> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(_)) => Ok(()),
        Ok(_) => Err(BodyRejection::NotAnObject),
        Err(_) => Err(BodyRejection::Malformed),
    }
}

fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

fn restore_payload(req: &mut ServiceRequest, body: web::Bytes) {
    let (_, mut payload) = actix_http::h1::Payload::create(true);
    payload.unread_data(body);
    req.set_payload(payload.into());
}

pub struct JsonBodyGuard;

impl<S, B> Transform<S, ServiceRequest> for JsonBodyGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JsonBodyGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JsonBodyGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct JsonBodyGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JsonBodyGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        if !carries_body(req.method()) {
            let fut = self.service.call(req);
            return Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) });
        }

        let service = Rc::clone(&self.service);
        Box::pin(async move {
            let body = match req.extract::<web::Bytes>().await {
                Ok(body) => body,
                Err(e) => {
                    log::warn!("Unreadable body on {} {}: {}", req.method(), req.path(), e);
                    let err = AppError::BadRequest("unreadable request body".into());
                    return Ok(reject(req, err));
                }
            };

            if let Err(rejection) = check_body(&body) {
                log::warn!(
                    "Request body rejected for {} {}: {:?}",
                    req.method(),
                    req.path(),
                    rejection
                );
                return Ok(reject(req, AppError::BadRequest(rejection.message().into())));
            }

            restore_payload(&mut req, body);
            service
                .call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        })
    }
}
