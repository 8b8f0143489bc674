//! Permission-grant endpoints.
//!
//! Every operation here is keyed off ownership of the underlying task, not
//! the grant's own id: only a task's author may create, change or revoke
//! grants on it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::db::access::{self, AccessError};
use crate::db::{CreatePermissionRequest, Permission, UpdatePermissionRequest, User};
use crate::AppState;

use super::error::ApiError;

async fn owned_or_forbidden(
    state: &AppState,
    user: &User,
) -> Result<std::collections::HashSet<i64>, ApiError> {
    match access::owned_task_ids(&state.db, user.id).await {
        Ok(ids) => Ok(ids),
        Err(AccessError::NoAuthorizedTasks) => Err(ApiError::forbidden(
            "Only the task author may manage its grants",
        )),
        Err(AccessError::Database(e)) => Err(e.into()),
    }
}

async fn fetch_permission(state: &AppState, id: i64) -> Result<Permission, ApiError> {
    sqlx::query_as::<_, Permission>("SELECT * FROM permissions WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("Permission not found"))
}

/// Grant read/update rights on an owned task to another user
///
/// POST /permissions/:id (the grantee comes from the body's `user` field)
pub async fn create_permission(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(_user_id): Path<i64>,
    Json(req): Json<CreatePermissionRequest>,
) -> Result<(StatusCode, Json<Permission>), ApiError> {
    let owned = owned_or_forbidden(&state, &user).await?;
    if !owned.contains(&req.task) {
        return Err(ApiError::forbidden(
            "Only the task author may manage its grants",
        ));
    }

    // An unknown grantee trips the users FK and surfaces as a 400
    let id = sqlx::query(
        "INSERT INTO permissions (can_read, can_update, task_id, user_id) VALUES (?, ?, ?, ?)",
    )
    .bind(req.read)
    .bind(req.update)
    .bind(req.task)
    .bind(req.user)
    .execute(&state.db)
    .await?
    .last_insert_rowid();

    tracing::info!(
        permission_id = id,
        task_id = req.task,
        grantee = req.user,
        "Permission granted"
    );

    let permission = fetch_permission(&state, id).await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

/// Overwrite a grant's read/update flags
///
/// PUT /permissions/:id
pub async fn update_permission(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePermissionRequest>,
) -> Result<Json<Permission>, ApiError> {
    let existing = fetch_permission(&state, id).await?;

    let owned = owned_or_forbidden(&state, &user).await?;
    if !owned.contains(&existing.task_id) {
        return Err(ApiError::forbidden(
            "Only the task author may manage its grants",
        ));
    }

    sqlx::query("UPDATE permissions SET can_read = ?, can_update = ? WHERE id = ?")
        .bind(req.read)
        .bind(req.update)
        .bind(id)
        .execute(&state.db)
        .await?;

    let permission = fetch_permission(&state, id).await?;
    Ok(Json(permission))
}

/// Revoke a grant
///
/// DELETE /permissions/:id
pub async fn delete_permission(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let existing = fetch_permission(&state, id).await?;

    let owned = owned_or_forbidden(&state, &user).await?;
    if !owned.contains(&existing.task_id) {
        return Err(ApiError::forbidden(
            "Only the task author may manage its grants",
        ));
    }

    sqlx::query("DELETE FROM permissions WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    tracing::info!(permission_id = id, task_id = existing.task_id, "Permission revoked");

    Ok(StatusCode::NO_CONTENT)
}
