//! Authorized-task resolution.
//!
//! A user may act on a task either as its author or through an explicit
//! permission grant. The readable and updatable sets are the union of the
//! owned set with the grants carrying the relevant flag; owned tasks are
//! always included whether or not any permission row exists.
//!
//! Admins get no special treatment here. The admin bypass lives only in the
//! handlers that check `is_admin` themselves (listing users, fetching a user,
//! listing all tasks), never in the update/delete/grant flows.

use std::collections::HashSet;
use thiserror::Error;

use super::DbPool;

#[derive(Debug, Error)]
pub enum AccessError {
    /// The resolved set is empty. Callers usually treat this as "nothing to
    /// show" or "no rights" rather than an internal failure.
    #[error("no authorized tasks")]
    NoAuthorizedTasks,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Tasks authored by the user. Authorship confers every right, including the
/// only path to delete.
pub async fn owned_task_ids(pool: &DbPool, user_id: i64) -> Result<HashSet<i64>, AccessError> {
    let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM tasks WHERE author_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    non_empty(ids)
}

/// Owned tasks plus tasks shared with the user with `can_read` set.
pub async fn readable_task_ids(pool: &DbPool, user_id: i64) -> Result<HashSet<i64>, AccessError> {
    owned_union_granted(pool, user_id, "can_read").await
}

/// Owned tasks plus tasks shared with the user with `can_update` set.
pub async fn updatable_task_ids(pool: &DbPool, user_id: i64) -> Result<HashSet<i64>, AccessError> {
    owned_union_granted(pool, user_id, "can_update").await
}

async fn owned_union_granted(
    pool: &DbPool,
    user_id: i64,
    flag: &str,
) -> Result<HashSet<i64>, AccessError> {
    // `flag` is one of the two fixed column names above, never caller input.
    let sql = format!(
        "SELECT id FROM tasks WHERE author_id = ? \
         UNION \
         SELECT task_id FROM permissions WHERE user_id = ? AND {flag} = 1"
    );
    let ids: Vec<i64> = sqlx::query_scalar(&sql)
        .bind(user_id)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    non_empty(ids)
}

fn non_empty(ids: Vec<i64>) -> Result<HashSet<i64>, AccessError> {
    if ids.is_empty() {
        Err(AccessError::NoAuthorizedTasks)
    } else {
        Ok(ids.into_iter().collect())
    }
}
