//! PostgreSQL-backed implementations of the storage seams.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use huddle_core::result::AppResult;
use huddle_database::repositories::{
    ChatMessageRepository, DirectMessageRepository, SessionRepository, UserRepository,
};
use huddle_entity::message::{ChatMessage, DirectMessage};
use huddle_entity::user::OnlineUser;

use crate::feed::{ChangeFeed, SessionRegistry};

/// Live change feed reading from the message tables.
#[derive(Debug, Clone)]
pub struct PostgresChangeFeed {
    chat: ChatMessageRepository,
    direct: DirectMessageRepository,
}

impl PostgresChangeFeed {
    /// Create a feed over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            chat: ChatMessageRepository::new(pool.clone()),
            direct: DirectMessageRepository::new(pool),
        }
    }
}

#[async_trait]
impl ChangeFeed for PostgresChangeFeed {
    async fn fetch_chat_since(&self, last_id: i64) -> AppResult<Vec<ChatMessage>> {
        self.chat.fetch_since(last_id).await
    }

    async fn fetch_direct_since(
        &self,
        last_id: i64,
        recipient_id: i64,
    ) -> AppResult<Vec<DirectMessage>> {
        self.direct.fetch_since(last_id, recipient_id).await
    }

    async fn mark_direct_read(&self, recipient_id: i64, ids: &[i64]) -> AppResult<()> {
        let flipped = self.direct.mark_read_ids(recipient_id, ids).await?;
        if flipped > 0 {
            debug!(recipient_id, flipped, "marked direct messages read");
        }
        Ok(())
    }
}

/// Registry over the `active_sessions` table, with presence flips on the
/// users table.
#[derive(Debug, Clone)]
pub struct PostgresSessionRegistry {
    sessions: SessionRepository,
    users: UserRepository,
}

impl PostgresSessionRegistry {
    /// Create a registry over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            sessions: SessionRepository::new(pool.clone()),
            users: UserRepository::new(pool),
        }
    }
}

#[async_trait]
impl SessionRegistry for PostgresSessionRegistry {
    async fn register(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        self.sessions.upsert(user_id, session_token).await?;
        self.users.set_presence(user_id, true).await
    }

    async fn refresh(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        self.sessions.touch(user_id, session_token).await
    }

    async fn sweep(&self, stale_after: Duration, hard_delete_after: Duration) -> AppResult<()> {
        let now = Utc::now();
        let flipped = self
            .sessions
            .mark_stale_users_offline(now - stale_after)
            .await?;
        let deleted = self.sessions.delete_older_than(now - hard_delete_after).await?;
        if flipped > 0 || deleted > 0 {
            debug!(flipped, deleted, "session sweep");
        }
        Ok(())
    }

    async fn deregister(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        self.sessions.delete(user_id, session_token).await?;
        // Conditional single-statement flip: stays online while any other
        // session row for this user exists.
        self.users.set_offline_if_no_sessions(user_id).await?;
        Ok(())
    }

    async fn list_online_excluding(&self, user_id: i64) -> AppResult<Vec<OnlineUser>> {
        self.users.list_online_excluding(user_id).await
    }
}
