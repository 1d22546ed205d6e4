//! Storage seams for the stream loop.
//!
//! The loop talks to the database only through these traits so the cadence
//! and delivery logic can be exercised against in-memory implementations.

use async_trait::async_trait;
use chrono::Duration;
use uuid::Uuid;

use huddle_core::result::AppResult;
use huddle_entity::message::{ChatMessage, DirectMessage};
use huddle_entity::user::OnlineUser;

/// Identity of one open connection, resolved from the validated JWT before
/// the loop starts. Immutable for the connection's lifetime.
#[derive(Debug, Clone)]
pub struct ConnectionIdentity {
    pub user_id: i64,
    pub username: String,
    /// The JWT's `jti`; keys this connection's registry row.
    pub session_token: Uuid,
}

/// Incremental access to the two message feeds.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// All broadcast chat rows with id greater than the cursor, ascending.
    async fn fetch_chat_since(&self, last_id: i64) -> AppResult<Vec<ChatMessage>>;

    /// All direct rows addressed to `recipient_id` with id greater than the
    /// cursor, ascending.
    async fn fetch_direct_since(
        &self,
        last_id: i64,
        recipient_id: i64,
    ) -> AppResult<Vec<DirectMessage>>;

    /// Flip the given unread rows addressed to `recipient_id` to read.
    async fn mark_direct_read(&self, recipient_id: i64, ids: &[i64]) -> AppResult<()>;
}

/// Shared liveness registry. One row per (user, session token); presence is
/// derived from these rows, never set directly by clients.
#[async_trait]
pub trait SessionRegistry: Send + Sync {
    /// Idempotent upsert: creates or refreshes the row and flips the user's
    /// presence online.
    async fn register(&self, user_id: i64, session_token: Uuid) -> AppResult<()>;

    /// Refresh `last_activity` only. Silent no-op when the row is already
    /// gone (another path may have evicted it).
    async fn refresh(&self, user_id: i64, session_token: Uuid) -> AppResult<()>;

    /// Two-tier cleanup: users whose newest row is older than `stale_after`
    /// flip offline; rows older than `hard_delete_after` are removed.
    async fn sweep(&self, stale_after: Duration, hard_delete_after: Duration) -> AppResult<()>;

    /// Remove the row and flip presence offline if it was the user's last
    /// live session.
    async fn deregister(&self, user_id: i64, session_token: Uuid) -> AppResult<()>;

    /// All online users except the given one, for the presence snapshot.
    async fn list_online_excluding(&self, user_id: i64) -> AppResult<Vec<OnlineUser>>;
}
