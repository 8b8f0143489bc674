//! User records and login payloads.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub display_name: Option<String>,
    pub login: String,
    pub password_digest: Option<String>,
    pub is_admin: bool,
}

/// User payload returned by the API, without the password digest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub display_name: Option<String>,
    pub login: String,
    pub is_admin: bool,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            login: user.login,
            is_admin: user.is_admin,
        }
    }
}

/// Form body of `POST /token/`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}
