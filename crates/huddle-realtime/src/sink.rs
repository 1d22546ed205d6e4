//! Event transport abstraction.

use async_trait::async_trait;
use tokio::sync::mpsc;

use huddle_core::result::AppResult;

use crate::event::StreamEvent;

/// Outbound side of one live connection.
///
/// `emit` hands a frame to the transport for immediate flush; frames to a
/// gone peer are dropped, never queued. `is_disconnected` is polled by the
/// loop after each tick, so cancellation latency is bounded by the tick
/// interval.
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Deliver one named event frame.
    async fn emit(&self, event: StreamEvent) -> AppResult<()>;

    /// Whether the peer has gone away.
    fn is_disconnected(&self) -> bool;
}

/// Sink backed by a bounded channel whose receiving half feeds the HTTP
/// response stream. The channel closing is the disconnect signal.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<StreamEvent>,
}

impl ChannelSink {
    /// Create a sink and the receiver the transport should drain.
    pub fn new(buffer: usize) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(buffer);
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn emit(&self, event: StreamEvent) -> AppResult<()> {
        // A closed channel means the client left; the next disconnect check
        // ends the loop, so a failed send is not an error.
        let _ = self.tx.send(event).await;
        Ok(())
    }

    fn is_disconnected(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_reports_disconnect_after_receiver_drops() {
        let (sink, rx) = ChannelSink::new(4);
        assert!(!sink.is_disconnected());

        drop(rx);
        assert!(sink.is_disconnected());

        // Emitting into a closed channel is silently dropped.
        sink.emit(StreamEvent::error("late frame")).await.unwrap();
    }

    #[tokio::test]
    async fn test_channel_sink_delivers_in_order() {
        let (sink, mut rx) = ChannelSink::new(4);
        sink.emit(StreamEvent::connected(1, "a")).await.unwrap();
        sink.emit(StreamEvent::error("x")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().name(), "connected");
        assert_eq!(rx.recv().await.unwrap().name(), "error");
    }
}
