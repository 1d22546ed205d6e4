//! Per-connection stream loop.
//!
//! One task per open connection. Lifecycle:
//! `Connecting -> Streaming -> Closing(reason) -> Closed`. The loop owns its
//! cursors; everything shared goes through [`ChangeFeed`] and
//! [`SessionRegistry`], whose single-statement mutations make cross-
//! connection coordination lock-free at this layer.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use huddle_core::config::RealtimeConfig;
use huddle_core::result::AppResult;

use crate::cursor::CursorPair;
use crate::event::StreamEvent;
use crate::feed::{ChangeFeed, ConnectionIdentity, SessionRegistry};
use crate::poller::FeedPoller;
use crate::presence::PresenceBroadcaster;
use crate::sink::EventSink;

/// Why a connection left the streaming state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CloseReason {
    /// Peer went away; terminate silently.
    ClientGone,
    /// Non-storage fault; an `error` frame was already emitted.
    FatalError,
}

/// Drives one connection from registration to teardown.
pub struct StreamLoop {
    identity: ConnectionIdentity,
    cursors: CursorPair,
    poller: FeedPoller,
    presence: PresenceBroadcaster,
    registry: Arc<dyn SessionRegistry>,
    sink: Arc<dyn EventSink>,
    config: RealtimeConfig,
    presence_cadence: u64,
    liveness_cadence: u64,
}

impl StreamLoop {
    /// Assemble a loop for an authenticated connection.
    pub fn new(
        identity: ConnectionIdentity,
        cursors: CursorPair,
        feed: Arc<dyn ChangeFeed>,
        registry: Arc<dyn SessionRegistry>,
        sink: Arc<dyn EventSink>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            poller: FeedPoller::new(feed),
            presence: PresenceBroadcaster::new(registry.clone(), &config),
            presence_cadence: config.presence_cadence_ticks.max(1),
            liveness_cadence: config.liveness_cadence_ticks.max(1),
            identity,
            cursors,
            registry,
            sink,
            config,
        }
    }

    /// Run the connection to completion. Never returns an error: every
    /// fault is either surfaced to the client as an `error` frame or
    /// swallowed during teardown.
    pub async fn run(mut self) {
        let reason = match self.connect().await {
            Ok(()) => self.stream_until_closed().await,
            Err(e) => {
                warn!(user_id = self.identity.user_id, error = %e, "connection setup failed");
                let _ = self.sink.emit(StreamEvent::error(e.to_string())).await;
                CloseReason::FatalError
            }
        };
        self.close(reason).await;
    }

    /// Connecting: register the session and echo the identity back.
    async fn connect(&self) -> AppResult<()> {
        self.registry
            .register(self.identity.user_id, self.identity.session_token)
            .await?;
        self.sink
            .emit(StreamEvent::connected(
                self.identity.user_id,
                self.identity.username.clone(),
            ))
            .await?;
        info!(
            user_id = self.identity.user_id,
            username = %self.identity.username,
            "stream connected"
        );
        Ok(())
    }

    /// Streaming: poll-sleep cycle until the client leaves or a fatal
    /// fault fires.
    async fn stream_until_closed(&mut self) -> CloseReason {
        let mut tick: u64 = 0;
        loop {
            let delay = match self.run_tick(tick).await {
                Ok(()) => self.config.tick_interval(),
                Err(e) if e.is_transient() => {
                    // Recoverable: tell the client, back off, keep going.
                    // The failed feed's cursor was not advanced, so nothing
                    // is lost.
                    warn!(user_id = self.identity.user_id, error = %e, "transient stream fault");
                    let _ = self.sink.emit(StreamEvent::error(e.to_string())).await;
                    self.config.error_backoff()
                }
                Err(e) => {
                    warn!(user_id = self.identity.user_id, error = %e, "fatal stream fault");
                    let _ = self.sink.emit(StreamEvent::error(e.to_string())).await;
                    return CloseReason::FatalError;
                }
            };

            tick = tick.wrapping_add(1);
            if self.sink.is_disconnected() {
                return CloseReason::ClientGone;
            }
            sleep(delay).await;
        }
    }

    /// One tick: both feeds, then the cadenced presence broadcast and
    /// liveness refresh.
    async fn run_tick(&mut self, tick: u64) -> AppResult<()> {
        self.poller
            .poll(&self.identity, &mut self.cursors, self.sink.as_ref())
            .await?;

        if tick % self.presence_cadence == 0 {
            self.presence.broadcast(&self.identity, self.sink.as_ref()).await?;
        }
        if tick % self.liveness_cadence == 0 {
            self.registry
                .refresh(self.identity.user_id, self.identity.session_token)
                .await?;
        }
        Ok(())
    }

    /// Closed: best-effort teardown; the client is already gone, so a
    /// cleanup failure has no one left to report to.
    async fn close(self, reason: CloseReason) {
        if let Err(e) = self
            .registry
            .deregister(self.identity.user_id, self.identity.session_token)
            .await
        {
            debug!(user_id = self.identity.user_id, error = %e, "deregister failed during teardown");
        }
        info!(user_id = self.identity.user_id, ?reason, "stream closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryFeed, MemoryRegistry, MemorySink, identity};
    use std::time::Duration;

    struct Harness {
        feed: Arc<MemoryFeed>,
        registry: Arc<MemoryRegistry>,
        sink: Arc<MemorySink>,
        identity: ConnectionIdentity,
    }

    impl Harness {
        fn new(user_id: i64) -> Self {
            Self {
                feed: Arc::new(MemoryFeed::new()),
                registry: Arc::new(MemoryRegistry::new()),
                sink: Arc::new(MemorySink::new()),
                identity: identity(user_id),
            }
        }

        fn spawn(&self) -> tokio::task::JoinHandle<()> {
            let stream = StreamLoop::new(
                self.identity.clone(),
                CursorPair::default(),
                self.feed.clone(),
                self.registry.clone(),
                self.sink.clone(),
                RealtimeConfig::default(),
            );
            tokio::spawn(stream.run())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_registers_and_emits_identity_echo() {
        let h = Harness::new(7);
        h.feed.push_chat(1, "hello");

        let task = h.spawn();
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(h.registry.has_session(7, h.identity.session_token));
        assert!(h.registry.is_online(7));

        // First tick: identity echo, chat batch, then presence + heartbeat
        // (the cadence fires on tick zero).
        let names: Vec<_> = h.sink.events().iter().map(|e| e.name()).collect();
        assert_eq!(
            names,
            vec!["connected", "chat_message", "user_status", "heartbeat"]
        );

        h.sink.set_disconnected();
        task.await.unwrap();

        // Teardown always deregisters.
        assert!(!h.registry.has_session(7, h.identity.session_token));
        assert!(!h.registry.is_online(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_client_gone_terminates_without_error_frame() {
        let h = Harness::new(3);
        let task = h.spawn();

        tokio::time::sleep(Duration::from_secs(1)).await;
        h.sink.set_disconnected();
        task.await.unwrap();

        assert!(h.sink.events().iter().all(|e| e.name() != "error"));
        assert!(!h.registry.is_online(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_fault_backs_off_and_resumes() {
        let h = Harness::new(7);
        h.feed.push_chat(1, "before");

        let task = h.spawn();
        tokio::time::sleep(Duration::from_secs(1)).await;

        // Arm a one-shot storage fault, with a new row waiting behind it.
        h.feed.fail_next_chat_fetch();
        h.feed.push_chat(2, "after");
        tokio::time::sleep(Duration::from_secs(30)).await;
        h.sink.set_disconnected();
        task.await.unwrap();

        let events = h.sink.events();
        assert!(events.iter().any(|e| e.name() == "error"));

        // The faulted fetch lost nothing and the retry delivered it exactly
        // once.
        let delivered: Vec<i64> = events
            .iter()
            .filter_map(|e| match e {
                StreamEvent::ChatMessage(m) => Some(m.id),
                _ => None,
            })
            .collect();
        assert_eq!(delivered, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_fault_terminates_and_deregisters() {
        let h = Harness::new(9);
        // First emit (the identity echo) blows up with a non-storage error.
        h.sink.fail_next_emit();

        h.spawn().await.unwrap();

        assert!(!h.registry.has_session(9, h.identity.session_token));
        assert!(!h.registry.is_online(9));
        // The fatal path still tried to surface an error frame.
        assert!(h.sink.events().iter().any(|e| e.name() == "error"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_cadence_fires_every_tenth_tick() {
        let h = Harness::new(4);
        let task = h.spawn();

        // Ticks land at t = 0, 3, 6, ... so 35 seconds covers ticks 0..=11.
        tokio::time::sleep(Duration::from_secs(35)).await;
        h.sink.set_disconnected();
        task.await.unwrap();

        let snapshots = h
            .sink
            .events()
            .iter()
            .filter(|e| e.name() == "user_status")
            .count();
        assert_eq!(snapshots, 2); // ticks 0 and 10
    }
}
