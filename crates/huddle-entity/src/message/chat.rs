//! Broadcast chat message entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A broadcast chat message joined with its author.
///
/// Messages are immutable once created. The `id` is a BIGSERIAL used as the
/// delivery cursor for the live chat feed; `timestamp` is carried for
/// display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Monotonically increasing message identifier.
    pub id: i64,
    /// Message body.
    pub message: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Author's username.
    pub username: String,
    /// Author's user ID.
    pub user_id: i64,
}
