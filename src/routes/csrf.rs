use actix_web::{HttpResponse, Responder};

use crate::auth::{CsrfToken, CsrfTokenResponse};
use crate::models::ApiResponse;

/// `GET /api/v1/csrf`
///
/// Echoes the token minted by `CsrfIssuer` for this request. The issuer sets the matching
/// `_csrf` cookie once this handler has answered.
pub async fn issue_token(token: CsrfToken) -> impl Responder {
    HttpResponse::Ok().json(ApiResponse::new(CsrfTokenResponse {
        token: token.into_inner(),
    }))
}
