//! In-memory doubles for exercising the loop without a database or socket.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use huddle_core::error::AppError;
use huddle_core::result::AppResult;
use huddle_entity::message::{ChatMessage, DirectMessage};
use huddle_entity::user::OnlineUser;

use crate::event::StreamEvent;
use crate::feed::{ChangeFeed, ConnectionIdentity, SessionRegistry};
use crate::sink::EventSink;

pub fn identity(user_id: i64) -> ConnectionIdentity {
    ConnectionIdentity {
        user_id,
        username: format!("user{user_id}"),
        session_token: Uuid::new_v4(),
    }
}

/// Change feed over plain vectors, with injectable fetch faults.
#[derive(Default)]
pub struct MemoryFeed {
    chat: Mutex<Vec<ChatMessage>>,
    direct: Mutex<Vec<DirectMessage>>,
    fail_chat: AtomicBool,
    fail_direct: AtomicBool,
    mark_read_calls: AtomicUsize,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_chat(&self, id: i64, message: &str) {
        self.chat.lock().unwrap().push(ChatMessage {
            id,
            message: message.to_string(),
            timestamp: Utc::now(),
            username: "someone".to_string(),
            user_id: 1,
        });
    }

    pub fn push_direct(&self, id: i64, sender_id: i64, recipient_id: i64, message: &str) {
        self.direct.lock().unwrap().push(DirectMessage {
            id,
            message: message.to_string(),
            timestamp: Utc::now(),
            is_read: false,
            sender_username: format!("user{sender_id}"),
            sender_id,
            recipient_username: format!("user{recipient_id}"),
            recipient_id,
        });
    }

    pub fn fail_next_chat_fetch(&self) {
        self.fail_chat.store(true, Ordering::SeqCst);
    }

    pub fn fail_next_direct_fetch(&self) {
        self.fail_direct.store(true, Ordering::SeqCst);
    }

    pub fn direct_is_read(&self, id: i64) -> bool {
        self.direct
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.id == id && m.is_read)
    }

    pub fn mark_read_calls(&self) -> usize {
        self.mark_read_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChangeFeed for MemoryFeed {
    async fn fetch_chat_since(&self, last_id: i64) -> AppResult<Vec<ChatMessage>> {
        if self.fail_chat.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("chat feed unavailable"));
        }
        let mut rows: Vec<_> = self
            .chat
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.id > last_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }

    async fn fetch_direct_since(
        &self,
        last_id: i64,
        recipient_id: i64,
    ) -> AppResult<Vec<DirectMessage>> {
        if self.fail_direct.swap(false, Ordering::SeqCst) {
            return Err(AppError::database("direct feed unavailable"));
        }
        let mut rows: Vec<_> = self
            .direct
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.id > last_id && m.recipient_id == recipient_id)
            .cloned()
            .collect();
        rows.sort_by_key(|m| m.id);
        Ok(rows)
    }

    async fn mark_direct_read(&self, recipient_id: i64, ids: &[i64]) -> AppResult<()> {
        self.mark_read_calls.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.direct.lock().unwrap();
        for row in rows.iter_mut() {
            if row.recipient_id == recipient_id && ids.contains(&row.id) {
                row.is_read = true;
            }
        }
        Ok(())
    }
}

/// Registry over a hash map keyed by (user, session token).
#[derive(Default)]
pub struct MemoryRegistry {
    sessions: Mutex<HashMap<(i64, Uuid), DateTime<Utc>>>,
    online: Mutex<HashMap<i64, bool>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_session(&self, user_id: i64, token: Uuid) -> bool {
        self.sessions.lock().unwrap().contains_key(&(user_id, token))
    }

    pub fn session_count(&self, user_id: i64) -> usize {
        self.sessions
            .lock()
            .unwrap()
            .keys()
            .filter(|(u, _)| *u == user_id)
            .count()
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.online.lock().unwrap().get(&user_id).copied().unwrap_or(false)
    }

    /// Backdate a session's last activity for sweep tests.
    pub fn age_session(&self, user_id: i64, token: Uuid, by: Duration) {
        if let Some(ts) = self.sessions.lock().unwrap().get_mut(&(user_id, token)) {
            *ts -= by;
        }
    }
}

#[async_trait]
impl SessionRegistry for MemoryRegistry {
    async fn register(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert((user_id, session_token), Utc::now());
        self.online.lock().unwrap().insert(user_id, true);
        Ok(())
    }

    async fn refresh(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        if let Some(ts) = self
            .sessions
            .lock()
            .unwrap()
            .get_mut(&(user_id, session_token))
        {
            *ts = Utc::now();
        }
        Ok(())
    }

    async fn sweep(&self, stale_after: Duration, hard_delete_after: Duration) -> AppResult<()> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().unwrap();
        let mut online = self.online.lock().unwrap();

        let mut newest: HashMap<i64, DateTime<Utc>> = HashMap::new();
        for ((user, _), ts) in sessions.iter() {
            let entry = newest.entry(*user).or_insert(*ts);
            if *ts > *entry {
                *entry = *ts;
            }
        }
        for (user, ts) in newest {
            if ts < now - stale_after {
                online.insert(user, false);
            }
        }
        sessions.retain(|_, ts| *ts >= now - hard_delete_after);
        Ok(())
    }

    async fn deregister(&self, user_id: i64, session_token: Uuid) -> AppResult<()> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.remove(&(user_id, session_token));
        if !sessions.keys().any(|(u, _)| *u == user_id) {
            self.online.lock().unwrap().insert(user_id, false);
        }
        Ok(())
    }

    async fn list_online_excluding(&self, user_id: i64) -> AppResult<Vec<OnlineUser>> {
        let online = self.online.lock().unwrap();
        let mut users: Vec<OnlineUser> = online
            .iter()
            .filter(|(id, on)| **on && **id != user_id)
            .map(|(id, _)| OnlineUser {
                id: *id,
                username: format!("user{id}"),
                is_online: true,
                last_seen: Some(Utc::now()),
            })
            .collect();
        users.sort_by_key(|u| u.id);
        Ok(users)
    }
}

/// Sink that records frames, with injectable emit faults and a disconnect
/// switch.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<StreamEvent>>,
    fail_next: AtomicBool,
    disconnected: AtomicBool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn fail_next_emit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn set_disconnected(&self) {
        self.disconnected.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventSink for MemorySink {
    async fn emit(&self, event: StreamEvent) -> AppResult<()> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(AppError::internal("sink write failed"));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }

    fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }
}

mod tests {
    use super::*;

    // Registry contract checks shared by both implementations; the in-memory
    // double must honor the same semantics the SQL statements do.

    #[tokio::test]
    async fn test_register_is_idempotent_per_pair() {
        let registry = MemoryRegistry::new();
        let token = Uuid::new_v4();

        registry.register(1, token).await.unwrap();
        registry.register(1, token).await.unwrap();
        assert_eq!(registry.session_count(1), 1);
        assert!(registry.is_online(1));
    }

    #[tokio::test]
    async fn test_two_tier_sweep_timing() {
        let registry = MemoryRegistry::new();
        let token = Uuid::new_v4();
        registry.register(5, token).await.unwrap();

        // Six minutes old: stale, so presence flips, but the row is kept.
        registry.age_session(5, token, Duration::minutes(6));
        registry
            .sweep(Duration::minutes(5), Duration::minutes(10))
            .await
            .unwrap();
        assert!(!registry.is_online(5));
        assert!(registry.has_session(5, token));

        // Eleven minutes old: past the hard-delete window, row removed.
        registry.age_session(5, token, Duration::minutes(5));
        registry
            .sweep(Duration::minutes(5), Duration::minutes(10))
            .await
            .unwrap();
        assert!(!registry.has_session(5, token));
    }

    #[tokio::test]
    async fn test_user_stays_online_while_any_session_is_fresh() {
        let registry = MemoryRegistry::new();
        let old_token = Uuid::new_v4();
        let fresh_token = Uuid::new_v4();

        registry.register(2, old_token).await.unwrap();
        registry.register(2, fresh_token).await.unwrap();
        registry.age_session(2, old_token, Duration::minutes(8));

        registry
            .sweep(Duration::minutes(5), Duration::minutes(10))
            .await
            .unwrap();
        assert!(registry.is_online(2));

        // Dropping one of two sessions keeps the user online.
        registry.deregister(2, old_token).await.unwrap();
        assert!(registry.is_online(2));

        registry.deregister(2, fresh_token).await.unwrap();
        assert!(!registry.is_online(2));
    }
}
