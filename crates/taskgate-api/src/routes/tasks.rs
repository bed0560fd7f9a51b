//! Task routes
//!
//! All handlers run behind the auth gate and only ever see the caller's own
//! tasks; someone else's task id answers 404, same as a missing one.

use axum::{
    Extension, Json, Router,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    routing::get,
};
use taskgate_auth::AuthUser;
use taskgate_db::{NewTask, TaskUpdate};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

use super::types::{CreateTaskRequest, DeletedResponse, TaskResponse, UpdateTaskRequest};

/// Maximum allowed title length
const MAX_TITLE_LENGTH: usize = 200;

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title cannot be empty".to_string()));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Title exceeds maximum length of {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(())
}

/// GET /tasks
async fn list_tasks(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.db.list_tasks(user.id).await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// POST /tasks
async fn create_task(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    request: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let Json(request) = request?;
    validate_title(&request.title)?;

    let task = state
        .db
        .insert_task(NewTask {
            title: request.title,
            description: request.description,
            owner_id: user.id,
        })
        .await?;

    info!("User {} created task {}", user.username, task.id);
    Ok((StatusCode::CREATED, Json(task.into())))
}

/// GET /tasks/{id}
async fn get_task(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Path(id) = id?;
    let task = state
        .db
        .get_task(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Task".to_string()))?;

    Ok(Json(task.into()))
}

/// PUT /tasks/{id}
async fn update_task(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    request: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Path(id) = id?;
    let Json(request) = request?;
    validate_title(&request.title)?;
    debug!("Updating task {} for user {}", id, user.username);

    let task = state
        .db
        .update_task(
            id,
            user.id,
            TaskUpdate {
                title: request.title,
                description: request.description,
                completed: request.completed,
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("Task".to_string()))?;

    Ok(Json(task.into()))
}

/// DELETE /tasks/{id}
async fn delete_task(
    Extension(user): Extension<AuthUser>,
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let Path(id) = id?;
    if !state.db.delete_task(id, user.id).await? {
        return Err(ApiError::NotFound("Task".to_string()));
    }

    info!("User {} deleted task {}", user.username, id);
    Ok(Json(DeletedResponse { ok: true }))
}

/// Create task routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
}
