//! Broadcast chat message repository.

use sqlx::PgPool;

use huddle_core::error::{AppError, ErrorKind};
use huddle_core::result::AppResult;
use huddle_entity::message::ChatMessage;

const JOINED_SELECT: &str = "SELECT cm.id, cm.message, cm.timestamp, u.username, u.id AS user_id \
     FROM chat_messages cm JOIN users u ON cm.user_id = u.id";

/// Repository for the broadcast chat feed.
#[derive(Debug, Clone)]
pub struct ChatMessageRepository {
    pool: PgPool,
}

impl ChatMessageRepository {
    /// Create a new chat message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch all chat messages newer than the given id, ascending.
    ///
    /// Ids are monotonic, so id order is time order; this is the live-feed
    /// query and must never skip or reorder rows.
    pub async fn fetch_since(&self, last_id: i64) -> AppResult<Vec<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>(&format!(
            "{JOINED_SELECT} WHERE cm.id > $1 ORDER BY cm.id ASC"
        ))
        .bind(last_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to fetch chat feed", e))
    }

    /// Fetch the most recent chat messages, oldest first.
    pub async fn list_recent(&self, limit: i64) -> AppResult<Vec<ChatMessage>> {
        let mut rows = sqlx::query_as::<_, ChatMessage>(&format!(
            "{JOINED_SELECT} ORDER BY cm.id DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list chat messages", e)
        })?;

        rows.reverse();
        Ok(rows)
    }

    /// Insert a new chat message and return it joined with its author.
    pub async fn create(&self, user_id: i64, message: &str) -> AppResult<ChatMessage> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO chat_messages (user_id, message) VALUES ($1, $2) RETURNING id",
        )
        .bind(user_id)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create chat message", e)
        })?;

        sqlx::query_as::<_, ChatMessage>(&format!("{JOINED_SELECT} WHERE cm.id = $1"))
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to load created message", e)
            })
    }
}
