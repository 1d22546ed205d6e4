//! Real-time event stream configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Real-time (SSE) delivery loop configuration.
///
/// The stream loop for every connection ticks at `tick_interval_seconds`.
/// Presence broadcasting and session liveness refresh run on tick-count
/// cadences rather than their own timers, so the whole loop stays a single
/// sleep-then-poll cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Seconds between poll ticks.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_seconds: u64,
    /// Seconds to wait after a transient storage fault before retrying.
    #[serde(default = "default_error_backoff")]
    pub error_backoff_seconds: u64,
    /// Presence snapshot + sweep runs every Nth tick.
    #[serde(default = "default_presence_cadence")]
    pub presence_cadence_ticks: u64,
    /// Session liveness refresh runs every Nth tick.
    #[serde(default = "default_liveness_cadence")]
    pub liveness_cadence_ticks: u64,
    /// Minutes of inactivity after which a session counts as stale and its
    /// user is marked offline.
    #[serde(default = "default_stale_after")]
    pub stale_after_minutes: u64,
    /// Minutes of inactivity after which a session row is deleted outright.
    /// Must be greater than `stale_after_minutes`.
    #[serde(default = "default_hard_delete_after")]
    pub hard_delete_after_minutes: u64,
    /// Buffer size of the per-connection outbound event channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
}

impl RealtimeConfig {
    /// Tick interval as a `Duration`.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_seconds)
    }

    /// Error backoff as a `Duration`.
    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_seconds)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: default_tick_interval(),
            error_backoff_seconds: default_error_backoff(),
            presence_cadence_ticks: default_presence_cadence(),
            liveness_cadence_ticks: default_liveness_cadence(),
            stale_after_minutes: default_stale_after(),
            hard_delete_after_minutes: default_hard_delete_after(),
            channel_buffer_size: default_channel_buffer(),
        }
    }
}

fn default_tick_interval() -> u64 {
    3
}

fn default_error_backoff() -> u64 {
    5
}

fn default_presence_cadence() -> u64 {
    10
}

fn default_liveness_cadence() -> u64 {
    5
}

fn default_stale_after() -> u64 {
    5
}

fn default_hard_delete_after() -> u64 {
    10
}

fn default_channel_buffer() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_hard_delete_after_stale() {
        let config = RealtimeConfig::default();
        assert!(config.hard_delete_after_minutes > config.stale_after_minutes);
        assert_eq!(config.tick_interval(), Duration::from_secs(3));
        assert_eq!(config.error_backoff(), Duration::from_secs(5));
    }
}
