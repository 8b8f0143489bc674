//! Permission grants: read/update rights on one task for one user.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Permission {
    pub id: i64,
    pub can_read: bool,
    pub can_update: bool,
    pub task_id: i64,
    pub user_id: i64,
}

/// Body of `POST /permissions/{user_id}`. The grantee is the `user` field;
/// the path segment is not consulted.
#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub update: bool,
    pub task: i64,
    pub user: i64,
}

/// Body of `PUT /permissions/{id}`. Omitted flags overwrite to false.
#[derive(Debug, Deserialize)]
pub struct UpdatePermissionRequest {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub update: bool,
}
