//! Task endpoints.
//!
//! Listing returns the caller's readable set (admins see everything), updates
//! require the updatable set, and deletion is author-only. Sharing read or
//! update rights never grants delete rights.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::access::{self, AccessError};
use crate::db::{CreateTaskRequest, Task, UpdateTaskRequest, User};
use crate::AppState;

use super::error::ApiError;

async fn fetch_task(state: &AppState, id: i64) -> Result<Task, ApiError> {
    sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Task not found"))
}

/// List tasks visible to the caller
///
/// GET /tasks/
pub async fn list_tasks(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<Task>>, ApiError> {
    let tasks = if user.is_admin {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks ORDER BY id")
            .fetch_all(&state.db)
            .await?
    } else {
        let readable = match access::readable_task_ids(&state.db, user.id).await {
            Ok(ids) => ids,
            Err(AccessError::NoAuthorizedTasks) => {
                return Err(ApiError::not_found("No tasks visible to this user"))
            }
            Err(AccessError::Database(e)) => return Err(e.into()),
        };

        let mut ids: Vec<i64> = readable.into_iter().collect();
        ids.sort_unstable();

        // SQLite has no array binds; expand the placeholder list by hand
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!("SELECT * FROM tasks WHERE id IN ({placeholders}) ORDER BY id");
        let mut query = sqlx::query_as::<_, Task>(&sql);
        for id in &ids {
            query = query.bind(*id);
        }
        query.fetch_all(&state.db).await?
    };

    if tasks.is_empty() {
        return Err(ApiError::not_found("No tasks visible to this user"));
    }

    Ok(Json(tasks))
}

/// Create a task owned by the caller
///
/// POST /tasks/
pub async fn create_task(
    State(state): State<Arc<AppState>>,
    user: User,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::validation_field("name", "Task name is required"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let id = sqlx::query(
        "INSERT INTO tasks (name, description, created_at, author_id) VALUES (?, ?, ?, ?)",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&now)
    .bind(user.id)
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    tracing::info!(task_id = id, author = %user.login, "Task created");

    let task = fetch_task(&state, id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

/// Update a task's name and/or description
///
/// PUT /tasks/:id
pub async fn update_task(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<Task>, ApiError> {
    // Existence is reported before rights, so a 404 never masks a 403
    fetch_task(&state, id).await?;

    let updatable = match access::updatable_task_ids(&state.db, user.id).await {
        Ok(ids) => ids,
        Err(AccessError::NoAuthorizedTasks) => {
            return Err(ApiError::forbidden("No update rights on this task"))
        }
        Err(AccessError::Database(e)) => return Err(e.into()),
    };
    if !updatable.contains(&id) {
        return Err(ApiError::forbidden("No update rights on this task"));
    }

    if req.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err(ApiError::validation_field("name", "Task name is required"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    sqlx::query(
        "UPDATE tasks SET \
            name = COALESCE(?, name), \
            description = COALESCE(?, description), \
            updated_at = ? \
         WHERE id = ?",
    )
    .bind(&req.name)
    .bind(&req.description)
    .bind(&now)
    .bind(id)
    .execute(&state.db)
    .await?;

    let task = fetch_task(&state, id).await?;
    Ok(Json(task))
}

/// Delete a task. Author-only; grants cascade with the task row.
///
/// DELETE /tasks/:id
pub async fn delete_task(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    fetch_task(&state, id).await?;

    let owned = match access::owned_task_ids(&state.db, user.id).await {
        Ok(ids) => ids,
        Err(AccessError::NoAuthorizedTasks) => {
            return Err(ApiError::forbidden("Only the task author may delete it"))
        }
        Err(AccessError::Database(e)) => return Err(e.into()),
    };
    if !owned.contains(&id) {
        return Err(ApiError::forbidden("Only the task author may delete it"));
    }

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!(task_id = id, author = %user.login, "Task deleted");

    Ok(StatusCode::NO_CONTENT)
}
