//! Task operations
//!
//! Every read and write is scoped by `owner_id`: a task owned by someone else
//! behaves exactly like a task that does not exist.

use chrono::Utc;
use sqlx::Row;

use crate::error::DbError;
use crate::models::{NewTask, Task, TaskUpdate};

use super::Database;

impl Database {
    /// Insert a new task
    pub async fn insert_task(&self, task: NewTask) -> Result<Task, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, completed, owner_id, created_at, updated_at)
            VALUES (?, ?, 0, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.owner_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        let id: i64 = result.get("id");

        Ok(Task {
            id,
            title: task.title,
            description: task.description,
            completed: false,
            owner_id: task.owner_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// List all tasks belonging to a user
    pub async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, completed, owner_id, created_at, updated_at
            FROM tasks
            WHERE owner_id = ?
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| Task::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Get a task by ID if it belongs to `owner_id`
    pub async fn get_task(&self, id: i64, owner_id: i64) -> Result<Option<Task>, DbError> {
        let result = sqlx::query(
            r#"
            SELECT id, title, description, completed, owner_id, created_at, updated_at
            FROM tasks
            WHERE id = ? AND owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Task::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Replace a task's editable fields, returning the updated task
    pub async fn update_task(
        &self,
        id: i64,
        owner_id: i64,
        update: TaskUpdate,
    ) -> Result<Option<Task>, DbError> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, completed = ?, updated_at = ?
            WHERE id = ? AND owner_id = ?
            RETURNING id, title, description, completed, owner_id, created_at, updated_at
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.completed)
        .bind(now.to_rfc3339())
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        result.map(|row| Task::try_from(&row).map_err(DbError::from)).transpose()
    }

    /// Delete a task
    pub async fn delete_task(&self, id: i64, owner_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
