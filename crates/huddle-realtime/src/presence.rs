//! Periodic presence snapshot and registry sweep.

use std::sync::Arc;

use chrono::{Duration, Utc};

use huddle_core::config::RealtimeConfig;
use huddle_core::result::AppResult;

use crate::event::StreamEvent;
use crate::feed::{ConnectionIdentity, SessionRegistry};
use crate::sink::EventSink;

/// Emits the full online-user snapshot on the presence cadence.
///
/// The snapshot is deliberately not a diff: a client that misses one frame
/// is fully corrected by the next.
pub struct PresenceBroadcaster {
    registry: Arc<dyn SessionRegistry>,
    stale_after: Duration,
    hard_delete_after: Duration,
}

impl PresenceBroadcaster {
    /// Create a broadcaster with sweep windows from configuration.
    pub fn new(registry: Arc<dyn SessionRegistry>, config: &RealtimeConfig) -> Self {
        Self {
            registry,
            stale_after: Duration::minutes(config.stale_after_minutes as i64),
            hard_delete_after: Duration::minutes(config.hard_delete_after_minutes as i64),
        }
    }

    /// Sweep the registry, then emit `user_status` and `heartbeat`.
    pub async fn broadcast(
        &self,
        identity: &ConnectionIdentity,
        sink: &dyn EventSink,
    ) -> AppResult<()> {
        self.registry
            .sweep(self.stale_after, self.hard_delete_after)
            .await?;

        let online = self.registry.list_online_excluding(identity.user_id).await?;
        sink.emit(StreamEvent::user_status(online)).await?;
        sink.emit(StreamEvent::heartbeat(Utc::now())).await?;
        Ok(())
    }
}
