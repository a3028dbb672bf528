use actix_web::{get, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::API_VERSION;

/// Health check endpoint
///
/// Lives outside the API middleware chain: no CSRF pair or session needed.
#[get("/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "apiVersion": API_VERSION,
        "timestamp": Utc::now()
    }))
}
