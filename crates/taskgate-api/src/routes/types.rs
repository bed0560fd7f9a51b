//! Request/Response DTOs

use serde::{Deserialize, Serialize};
use taskgate_db::Task;

// ==================== Auth Types ====================

/// Registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// OAuth2 password-grant form; extra fields such as `grant_type` are ignored
#[derive(Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Plain confirmation message
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

// ==================== Task Types ====================

/// Create task request
#[derive(Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Update task request (full replacement)
#[derive(Deserialize)]
pub struct UpdateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

/// Task response
#[derive(Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub owner_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            owner_id: task.owner_id,
            created_at: task.created_at.to_rfc3339(),
            updated_at: task.updated_at.to_rfc3339(),
        }
    }
}

/// Delete acknowledgement
#[derive(Serialize)]
pub struct DeletedResponse {
    pub ok: bool,
}
