//! Active session repository.
//!
//! Sessions are the source of truth for presence: a user is online while at
//! least one fresh session row exists for them. All presence flips happen in
//! single statements so concurrent connections cannot interleave a check with
//! a stale write.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use huddle_core::error::{AppError, ErrorKind};
use huddle_core::result::AppResult;

/// Repository for the `active_sessions` registry.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new session repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a session, refreshing its activity timestamp if it already
    /// exists.
    pub async fn upsert(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO active_sessions (user_id, session_token) VALUES ($1, $2) \
             ON CONFLICT (user_id, session_token) DO UPDATE SET last_activity = NOW()",
        )
        .bind(user_id)
        .bind(session_token)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register session", e))?;

        Ok(())
    }

    /// Refresh the activity timestamp of an existing session.
    pub async fn touch(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE active_sessions SET last_activity = NOW() \
             WHERE user_id = $1 AND session_token = $2",
        )
        .bind(user_id)
        .bind(session_token)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch session", e))?;

        Ok(())
    }

    /// Remove a single session. Returns whether a row was removed.
    pub async fn delete(&self, user_id: i64, session_token: Uuid) -> AppResult<bool> {
        let result = sqlx::query(
            "DELETE FROM active_sessions WHERE user_id = $1 AND session_token = $2",
        )
        .bind(user_id)
        .bind(session_token)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete session", e))?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip users offline when their *freshest* session is older than the
    /// cutoff.
    ///
    /// Grouping on MAX(last_activity) keeps a user online while any one of
    /// their sessions is still fresh.
    pub async fn mark_stale_users_offline(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET is_online = FALSE, last_seen = NOW() WHERE id IN ( \
                 SELECT user_id FROM active_sessions \
                 GROUP BY user_id HAVING MAX(last_activity) < $1 \
             ) AND is_online = TRUE",
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to sweep stale sessions", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Hard-delete session rows whose activity is older than the cutoff.
    pub async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM active_sessions WHERE last_activity < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to prune dead sessions", e)
            })?;

        Ok(result.rows_affected())
    }
}
