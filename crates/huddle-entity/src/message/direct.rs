//! Direct (user-to-user) message entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A direct message joined with both participants.
///
/// Immutable except for `is_read`, which flips false→true exactly once when
/// the recipient's feed is polled or the conversation is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct DirectMessage {
    /// Monotonically increasing message identifier.
    pub id: i64,
    /// Message body.
    pub message: String,
    /// When the message was sent.
    pub timestamp: DateTime<Utc>,
    /// Whether the recipient has seen the message.
    pub is_read: bool,
    /// Sender's username.
    pub sender_username: String,
    /// Sender's user ID.
    pub sender_id: i64,
    /// Recipient's username.
    pub recipient_username: String,
    /// Recipient's user ID.
    pub recipient_id: i64,
}
