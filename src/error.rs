//!
//! # Error Handling
//!
//! This module defines `AppError`, the single error type that crosses the API boundary.
//! Each variant is one class of the error taxonomy and maps to exactly one HTTP status.
//!
//! `AppError` implements `actix_web::error::ResponseError`, rendering every failure as the
//! uniform envelope `{"apiVersion": ..., "error": {"code": ..., "message": ...}}`.
//! Internal causes (database, hashing, signing) are logged when the response is built and
//! replaced by a fixed message, so nothing but the class and a safe message leaves the process.

use actix_web::{
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    error::ResponseError,
    http::StatusCode,
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::ValidationErrors;

use crate::API_VERSION;

const INTERNAL_MESSAGE: &str = "internal server error";

/// Represents all possible errors that can occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Missing, invalid or expired credential (HTTP 401).
    Unauthorized(String),
    /// Malformed request that could not be parsed (HTTP 400).
    BadRequest(String),
    /// Request refused before reaching business logic, e.g. a CSRF failure (HTTP 403).
    Forbidden(String),
    /// Resource absent or not owned by the caller (HTTP 404).
    /// Both cases share this variant.
    NotFound(String),
    /// Unexpected server-side failure (HTTP 500). The message is logged, never returned.
    InternalServerError(String),
    /// Failure reported by the persistence layer (HTTP 500). Logged, never returned.
    DatabaseError(String),
    /// Well-formed input that violates a field rule (HTTP 400).
    ValidationError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "Internal Server Error: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// The message that is safe to show to a client.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Unauthorized(msg)
            | AppError::BadRequest(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ValidationError(msg) => msg,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => INTERNAL_MESSAGE,
        }
    }
}

/// Error body as it appears on the wire.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub api_version: String,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: u16,
    pub message: String,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) | AppError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        if matches!(
            self,
            AppError::InternalServerError(_) | AppError::DatabaseError(_)
        ) {
            log::error!("{}", self);
        }

        let status = self.status_code();
        HttpResponse::build(status).json(ErrorEnvelope {
            api_version: API_VERSION.to_string(),
            error: ErrorDetail {
                code: status.as_u16(),
                message: self.public_message().to_string(),
            },
        })
    }
}

/// Short-circuits a middleware chain: the request is answered with the error envelope
/// and no inner service runs.
pub(crate) fn reject<B>(req: ServiceRequest, err: AppError) -> ServiceResponse<EitherBody<B>> {
    req.into_response(err.error_response())
        .map_into_right_body()
}

/// `RowNotFound` becomes `NotFound` and a unique violation `BadRequest`;
/// everything else is an opaque database failure.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::BadRequest("Record already exists".into())
            }
            _ => AppError::DatabaseError(error.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        AppError::InternalServerError(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;

    #[test]
    fn test_error_statuses() {
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), 401);
        assert_eq!(AppError::BadRequest("x".into()).status_code(), 400);
        assert_eq!(AppError::ValidationError("x".into()).status_code(), 400);
        assert_eq!(AppError::Forbidden("x".into()).status_code(), 403);
        assert_eq!(AppError::NotFound("x".into()).status_code(), 404);
        assert_eq!(AppError::InternalServerError("x".into()).status_code(), 500);
        assert_eq!(AppError::DatabaseError("x".into()).status_code(), 500);
    }

    #[actix_rt::test]
    async fn test_envelope_shape() {
        let response = AppError::Forbidden("invalid csrf token".into()).error_response();
        assert_eq!(response.status(), 403);

        let bytes = to_bytes(response.into_body()).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(envelope.api_version, API_VERSION);
        assert_eq!(envelope.error.code, 403);
        assert_eq!(envelope.error.message, "invalid csrf token");
    }

    #[actix_rt::test]
    async fn test_internal_cause_is_not_exposed() {
        let response =
            AppError::DatabaseError("connection refused to 10.0.0.3:5432".into()).error_response();
        let bytes = to_bytes(response.into_body()).await.unwrap();
        let envelope: ErrorEnvelope = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(envelope.error.code, 500);
        assert_eq!(envelope.error.message, "internal server error");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
