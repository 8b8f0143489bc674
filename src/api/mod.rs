pub mod auth;
mod error;
mod permissions;
mod tasks;
mod users;

pub use error::{ApiError, ErrorCode};

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/token/", post(auth::login))
        .route("/users/", get(users::list_users))
        .route("/users/me", get(users::me))
        .route("/users/:id", get(users::get_user))
        .route("/tasks/", get(tasks::list_tasks))
        .route("/tasks/", post(tasks::create_task))
        .route(
            "/tasks/:id",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route(
            "/permissions/:id",
            post(permissions::create_permission)
                .put(permissions::update_permission)
                .delete(permissions::delete_permission),
        )
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
