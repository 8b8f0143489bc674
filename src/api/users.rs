//! User endpoints. Listing and fetching arbitrary users is admin-only; every
//! authenticated caller may fetch their own record.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::{User, UserResponse};
use crate::AppState;

use super::error::ApiError;

fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.is_admin {
        Ok(())
    } else {
        Err(ApiError::forbidden("Admin privileges required"))
    }
}

/// List all users
///
/// GET /users/
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    user: User,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    require_admin(&user)?;

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get the caller's own record
///
/// GET /users/me
pub async fn me(user: User) -> Json<UserResponse> {
    Json(user.into())
}

/// Get a single user by id
///
/// GET /users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    user: User,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    require_admin(&user)?;

    let found = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(found.into()))
}
