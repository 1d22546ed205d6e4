//! Direct (private) message repository.

use sqlx::PgPool;

use huddle_core::error::{AppError, ErrorKind};
use huddle_core::result::AppResult;
use huddle_entity::message::DirectMessage;

const JOINED_SELECT: &str = "SELECT dm.id, dm.message, dm.timestamp, dm.is_read, \
     s.username AS sender_username, s.id AS sender_id, \
     r.username AS recipient_username, r.id AS recipient_id \
     FROM direct_messages dm \
     JOIN users s ON dm.sender_id = s.id \
     JOIN users r ON dm.recipient_id = r.id";

/// Repository for one-to-one private messages.
#[derive(Debug, Clone)]
pub struct DirectMessageRepository {
    pool: PgPool,
}

impl DirectMessageRepository {
    /// Create a new direct message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch messages addressed to `recipient_id` newer than the given id,
    /// ascending.
    pub async fn fetch_since(&self, last_id: i64, recipient_id: i64) -> AppResult<Vec<DirectMessage>> {
        sqlx::query_as::<_, DirectMessage>(&format!(
            "{JOINED_SELECT} WHERE dm.id > $1 AND dm.recipient_id = $2 ORDER BY dm.id ASC"
        ))
        .bind(last_id)
        .bind(recipient_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to fetch direct message feed", e)
        })
    }

    /// Fetch the conversation between two users, oldest first.
    pub async fn conversation(
        &self,
        user_id: i64,
        other_id: i64,
        limit: i64,
    ) -> AppResult<Vec<DirectMessage>> {
        let mut rows = sqlx::query_as::<_, DirectMessage>(&format!(
            "{JOINED_SELECT} WHERE (dm.sender_id = $1 AND dm.recipient_id = $2) \
             OR (dm.sender_id = $2 AND dm.recipient_id = $1) \
             ORDER BY dm.id DESC LIMIT $3"
        ))
        .bind(user_id)
        .bind(other_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load conversation", e)
        })?;

        rows.reverse();
        Ok(rows)
    }

    /// Insert a private message and return it joined with both parties.
    pub async fn create(
        &self,
        sender_id: i64,
        recipient_id: i64,
        message: &str,
    ) -> AppResult<DirectMessage> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO direct_messages (sender_id, recipient_id, message) \
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create direct message", e)
        })?;

        sqlx::query_as::<_, DirectMessage>(&format!("{JOINED_SELECT} WHERE dm.id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load created message", e)
            })
    }

    /// Mark a specific set of messages addressed to `recipient_id` as read.
    ///
    /// Scoped to explicit ids so messages fetched by one connection are never
    /// marked read by another connection racing past them.
    pub async fn mark_read_ids(&self, recipient_id: i64, ids: &[i64]) -> AppResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE direct_messages SET is_read = TRUE \
             WHERE recipient_id = $1 AND id = ANY($2) AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(ids)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark messages read", e)
        })?;

        Ok(result.rows_affected())
    }

    /// Mark every unread message from `sender_id` to `recipient_id` as read.
    pub async fn mark_conversation_read(
        &self,
        recipient_id: i64,
        sender_id: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE direct_messages SET is_read = TRUE \
             WHERE recipient_id = $1 AND sender_id = $2 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(sender_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark conversation read", e)
        })?;

        Ok(result.rows_affected())
    }
}
