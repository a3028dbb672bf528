use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};

use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{ApiResponse, TaskInput, TaskPatch, TaskView},
    validation::validate_fields,
    AppState,
};

/// Lists the authenticated user's tasks, oldest first.
#[get("/tasks")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let tasks: Vec<TaskView> = state
        .tasks
        .list(user.0)
        .await?
        .into_iter()
        .map(TaskView::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::new(tasks)))
}

/// Creates a task owned by the authenticated user.
///
/// ## Request Body:
/// `{"name": "...", "status": {"name": "todo"}}`. A `kind` field is accepted and ignored.
///
/// ## Responses:
/// - `201 Created`: `{apiVersion, data: Task}`.
/// - `400 Bad Request`: Name outside 1..=255 characters or unknown status.
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    body: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    validate_fields(&*body)?;
    let task = state.tasks.create(user.0, body.into_inner().into()).await?;
    Ok(HttpResponse::Created().json(ApiResponse::new(TaskView::from(task))))
}

/// Retrieves one task. Tasks of other users answer 404 like missing ones.
#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(task_id.into_inner(), user.0).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(TaskView::from(task))))
}

/// Partially updates a task; absent fields keep their current value.
#[patch("/tasks/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    task_id: web::Path<i32>,
    body: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    validate_fields(&*body)?;
    let task = state
        .tasks
        .update(task_id.into_inner(), user.0, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(TaskView::from(task))))
}

#[delete("/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUserId,
    task_id: web::Path<i32>,
) -> Result<impl Responder, AppError> {
    state.tasks.delete(task_id.into_inner(), user.0).await?;
    Ok(HttpResponse::NoContent().finish())
}
