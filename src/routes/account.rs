use actix_web::{delete, web, HttpResponse, Responder};

use crate::{auth::AuthenticatedUserId, error::AppError, AppState};

/// Deletes the authenticated account and everything it owns, then clears the session cookie.
#[delete("/account")]
pub async fn delete_account(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    state.tasks.delete_all(user.0).await?;
    state.users.delete_account(user.0).await?;

    Ok(HttpResponse::NoContent()
        .cookie(state.cookies.cleared_session_cookie())
        .finish())
}
