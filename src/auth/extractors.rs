use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::{Claims, AUTHENTICATION_FAILED};
use crate::error::AppError;

/// Extracts the authenticated user's ID from request extensions.
///
/// Only meaningful on routes mounted behind `SessionAuth`, which verifies the session
/// token and stores its `Claims`. Without them the extractor answers 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUserId(pub i32);

impl FromRequest for AuthenticatedUserId {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>() {
            Some(claims) => ready(Ok(AuthenticatedUserId(claims.user_id))),
            None => {
                log::error!(
                    "No verified session on {}; is SessionAuth mounted?",
                    req.path()
                );
                let err = AppError::Unauthorized(AUTHENTICATION_FAILED.into());
                ready(Err(err.into()))
            }
        }
    }
}
