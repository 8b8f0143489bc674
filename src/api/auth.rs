//! Login and bearer-credential resolution.
//!
//! The bearer credential issued at login is the literal login string, looked
//! up on every request. There is no expiry, signing or revocation; see
//! DESIGN.md for the trust assumptions before exposing this anywhere hostile.

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::{request::Parts, HeaderMap},
    Form, Json,
};
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::config::AuthConfig;
use crate::db::{DbPool, LoginForm, TokenResponse, User};
use crate::AppState;

use super::error::ApiError;

/// Hash a password into its stored digest form.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a password against a stored digest.
pub fn verify_password(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}

pub async fn find_user_by_login(pool: &DbPool, login: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE login = ?")
        .bind(login)
        .fetch_optional(pool)
        .await
}

/// Login endpoint: `POST /token/` with a form-encoded username and password.
///
/// An unseen login is registered on the spot and treated as a successful
/// login. A seen login must present the password it registered with.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = match find_user_by_login(&state.db, &form.username).await? {
        Some(user) => {
            let digest = user.password_digest.as_deref().unwrap_or_default();
            if !verify_password(&form.password, digest) {
                return Err(ApiError::invalid_credentials("Invalid password"));
            }
            user
        }
        None => {
            let digest = hash_password(&form.password);
            sqlx::query(
                "INSERT INTO users (display_name, login, password_digest, is_admin) VALUES (NULL, ?, ?, 0)",
            )
            .bind(&form.username)
            .bind(&digest)
            .execute(&state.db)
            .await?;

            tracing::info!(login = %form.username, "Registered new user");

            find_user_by_login(&state.db, &form.username)
                .await?
                .ok_or_else(|| ApiError::internal("Registered user not found"))?
        }
    };

    Ok(Json(TokenResponse {
        access_token: user.login,
        token_type: "bearer".to_string(),
    }))
}

/// Look up the user a bearer credential identifies.
pub async fn resolve_credential(pool: &DbPool, credential: &str) -> Result<User, ApiError> {
    find_user_by_login(pool, credential)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid authentication credentials"))
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Extractor for the current authenticated user.
#[async_trait]
impl FromRequestParts<Arc<AppState>> for User {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let credential = extract_bearer(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing bearer credential"))?;
        resolve_credential(&state.db, credential).await
    }
}

/// Create the configured admin account if it does not exist yet. The HTTP
/// surface never sets `is_admin`, so this is the only path to an admin user.
pub async fn ensure_admin_user(pool: &DbPool, auth: &AuthConfig) -> anyhow::Result<()> {
    let (Some(login), Some(password)) = (&auth.admin_login, &auth.admin_password) else {
        return Ok(());
    };

    if find_user_by_login(pool, login).await?.is_none() {
        sqlx::query(
            "INSERT INTO users (display_name, login, password_digest, is_admin) VALUES (NULL, ?, ?, 1)",
        )
        .bind(login)
        .bind(hash_password(password))
        .execute(pool)
        .await?;
        tracing::info!(login = %login, "Created admin user");
    }

    Ok(())
}
