//! Route table and middleware ordering.
//!
//! Everything under `/api/v1` passes the gates in ascending cost:
//! CORS, then CSRF, then the JSON body check, then the session token.
//! actix runs the last `wrap` first, so each scope lists its gates inner to outer.
//! Rejections from actix-cors are plain text; an outer `ErrorHandlers` rewrites them
//! into the error envelope like every other gate's.

pub mod account;
pub mod auth;
pub mod csrf;
pub mod health;
pub mod tasks;

use actix_cors::Cors;
use actix_web::{
    dev::ServiceResponse,
    error,
    http::{header, StatusCode},
    middleware::{ErrorHandlerResponse, ErrorHandlers},
    web, ResponseError,
};

use crate::{
    auth::{CsrfIssuer, CsrfValidator, SessionAuth},
    error::AppError,
    validation::JsonBodyGuard,
    AppState,
};

/// Mounts the health check and the versioned API.
pub fn configure(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(health::health).service(
        web::scope("/api/v1")
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config())
            .app_data(path_config())
            .wrap(cors(&state.cors_allow_origins))
            .wrap(ErrorHandlers::new().handler(StatusCode::BAD_REQUEST, cors_rejection))
            .service(
                web::resource("/csrf")
                    .wrap(CsrfIssuer::new(state.cookies.clone()))
                    .route(web::get().to(csrf::issue_token)),
            )
            .service(
                web::scope("")
                    .wrap(JsonBodyGuard)
                    .wrap(CsrfValidator)
                    .service(auth::sign_up)
                    .service(auth::login)
                    .service(auth::logout)
                    .service(
                        web::scope("")
                            .wrap(SessionAuth::new(state.tokens.clone()))
                            .service(tasks::list_tasks)
                            .service(tasks::create_task)
                            .service(tasks::get_task)
                            .service(tasks::update_task)
                            .service(tasks::delete_task)
                            .service(account::delete_account),
                    ),
            ),
    );
}

/// Credentialed CORS restricted to the configured origins.
fn cors(origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::HeaderName::from_static("x-csrf-token"),
        ])
        .supports_credentials()
        .max_age(3600);

    for origin in origins {
        // Credentialed CORS cannot use a wildcard origin.
        if origin == "*" {
            log::warn!("Ignoring wildcard entry in CORS_ALLOW_ORIGINS");
            continue;
        }
        cors = cors.allowed_origin(origin);
    }
    cors
}

/// Our own 400s already carry the JSON envelope; anything else at this layer came
/// from actix-cors refusing the origin or the preflight.
fn cors_rejection<B>(res: ServiceResponse<B>) -> actix_web::Result<ErrorHandlerResponse<B>> {
    let is_envelope = res
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map_or(false, |value| value.starts_with("application/json"));
    if is_envelope {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    }

    let (req, _) = res.into_parts();
    log::warn!("CORS rejected {} {}", req.method(), req.path());
    let response = AppError::BadRequest(CORS_REJECTED.into()).error_response();
    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

const CORS_REJECTED: &str = "origin is not allowed to make this request";

/// Body decoding failures use the error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, req| {
        log::warn!("Rejected JSON body on {}: {}", req.path(), err);
        let message = match &err {
            error::JsonPayloadError::ContentType => "content type must be application/json".into(),
            other => format!("invalid request body: {}", other),
        };
        AppError::BadRequest(message).into()
    })
}

/// A task id that does not parse is reported like a task that does not exist.
fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, req| {
        log::warn!("Rejected path {}: {}", req.path(), err);
        AppError::NotFound("task not found".into()).into()
    })
}
