//! # huddle-realtime
//!
//! Real-time delivery engine for Huddle. Provides:
//!
//! - Per-connection change-feed polling with monotonic resume cursors
//! - Session liveness registry with two-tier stale sweep
//! - Derived presence broadcast (full snapshot + heartbeat)
//! - Transport-agnostic event sink abstraction
//! - The per-connection stream loop state machine
//!
//! Each open connection runs one independent [`stream::StreamLoop`] task.
//! Connections never talk to each other directly; all coordination goes
//! through the shared database via [`feed::ChangeFeed`] and
//! [`feed::SessionRegistry`].

pub mod cursor;
pub mod event;
pub mod feed;
pub mod poller;
pub mod presence;
pub mod sink;
pub mod store;
pub mod stream;

#[cfg(test)]
pub(crate) mod testing;

pub use cursor::CursorPair;
pub use event::StreamEvent;
pub use feed::{ChangeFeed, ConnectionIdentity, SessionRegistry};
pub use poller::FeedPoller;
pub use presence::PresenceBroadcaster;
pub use sink::{ChannelSink, EventSink};
pub use store::{PostgresChangeFeed, PostgresSessionRegistry};
pub use stream::StreamLoop;
