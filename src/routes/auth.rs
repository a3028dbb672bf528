use actix_web::{post, web, HttpResponse, Responder};

use crate::{
    auth::{LoginRequest, SignUpRequest},
    error::AppError,
    models::{ApiResponse, UserView},
    validation::validate_fields,
    AppState,
};

/// Register a new user
///
/// Creates the account and signs it in: the session cookie is set on the same response.
///
/// ## Responses:
/// - `201 Created`: `{apiVersion, data: User}` plus the `token` cookie.
/// - `400 Bad Request`: Invalid email or password, or the email is already registered.
#[post("/signup")]
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> Result<impl Responder, AppError> {
    let credentials = body.into_inner().user.normalized();
    validate_fields(&credentials)?;

    let session = state.users.sign_up(credentials).await?;
    let cookie = state
        .cookies
        .session_cookie(session.token.token, state.tokens.ttl());

    Ok(HttpResponse::Created()
        .cookie(cookie)
        .json(ApiResponse::new(UserView::from(&session.user))))
}

/// Login user
///
/// ## Responses:
/// - `200 OK`: Empty body, `token` cookie set.
/// - `401 Unauthorized`: Unknown email or wrong password; the two are indistinguishable.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let credentials = body.into_inner().user.normalized();
    validate_fields(&credentials)?;

    let session = state.users.login(credentials).await?;
    let cookie = state
        .cookies
        .session_cookie(session.token.token, state.tokens.ttl());

    Ok(HttpResponse::Ok().cookie(cookie).finish())
}

/// Logout user
///
/// Sessions are stateless, so this only tells the client to drop its cookie.
#[post("/logout")]
pub async fn logout(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok()
        .cookie(state.cookies.cleared_session_cookie())
        .finish()
}
