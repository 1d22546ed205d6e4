//! Per-tick change-feed polling.

use std::sync::Arc;

use tracing::debug;

use huddle_core::result::AppResult;

use crate::cursor::CursorPair;
use crate::event::StreamEvent;
use crate::feed::{ChangeFeed, ConnectionIdentity};
use crate::sink::EventSink;

/// Runs one poll cycle over both feeds for one connection.
///
/// The two feeds are independent: a storage fault in one must not stop the
/// other from being attempted in the same cycle. The first fault is returned
/// after both feeds have run, with the failed feed's cursor untouched.
pub struct FeedPoller {
    feed: Arc<dyn ChangeFeed>,
}

impl FeedPoller {
    /// Create a poller over the given feed.
    pub fn new(feed: Arc<dyn ChangeFeed>) -> Self {
        Self { feed }
    }

    /// Fetch and deliver everything newer than the cursors.
    ///
    /// Each row is emitted before its cursor advance, so a crash mid-batch
    /// loses nothing; the client may see at most one duplicate on reconnect.
    pub async fn poll(
        &self,
        identity: &ConnectionIdentity,
        cursors: &mut CursorPair,
        sink: &dyn EventSink,
    ) -> AppResult<()> {
        let chat_result = self.poll_chat(cursors, sink).await;
        let direct_result = self.poll_direct(identity, cursors, sink).await;

        chat_result.and(direct_result)
    }

    async fn poll_chat(&self, cursors: &mut CursorPair, sink: &dyn EventSink) -> AppResult<()> {
        let rows = self.feed.fetch_chat_since(cursors.last_chat_id).await?;
        if !rows.is_empty() {
            debug!(count = rows.len(), from = cursors.last_chat_id, "chat batch");
        }

        for row in rows {
            let id = row.id;
            sink.emit(StreamEvent::ChatMessage(row)).await?;
            cursors.advance_chat(id);
        }
        Ok(())
    }

    async fn poll_direct(
        &self,
        identity: &ConnectionIdentity,
        cursors: &mut CursorPair,
        sink: &dyn EventSink,
    ) -> AppResult<()> {
        let rows = self
            .feed
            .fetch_direct_since(cursors.last_direct_id, identity.user_id)
            .await?;
        if rows.is_empty() {
            return Ok(());
        }

        // Scoped to the ids we actually fetched, so a second connection for
        // the same user cannot race us into marking rows it never saw.
        let unread: Vec<i64> = rows.iter().filter(|r| !r.is_read).map(|r| r.id).collect();
        self.feed.mark_direct_read(identity.user_id, &unread).await?;

        for mut row in rows {
            row.is_read = true;
            let id = row.id;
            sink.emit(StreamEvent::DirectMessage(row)).await?;
            cursors.advance_direct(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryFeed, MemorySink, identity};

    #[tokio::test]
    async fn test_first_poll_delivers_everything_in_order() {
        let feed = Arc::new(MemoryFeed::new());
        feed.push_chat(1, "hi");
        feed.push_chat(2, "there");

        let poller = FeedPoller::new(feed);
        let sink = MemorySink::new();
        let mut cursors = CursorPair::default();

        poller.poll(&identity(7), &mut cursors, &sink).await.unwrap();

        let names: Vec<_> = sink.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["chat_message", "chat_message"]);
        assert_eq!(cursors.last_chat_id, 2);

        // Second poll with no new rows: no events, cursor unchanged.
        sink.clear();
        poller.poll(&identity(7), &mut cursors, &sink).await.unwrap();
        assert!(sink.events().is_empty());
        assert_eq!(cursors.last_chat_id, 2);
    }

    #[tokio::test]
    async fn test_direct_rows_are_marked_read_once() {
        let feed = Arc::new(MemoryFeed::new());
        feed.push_direct(1, 3, 7, "psst");

        let poller = FeedPoller::new(feed.clone());
        let sink = MemorySink::new();
        let mut cursors = CursorPair::default();

        poller.poll(&identity(7), &mut cursors, &sink).await.unwrap();
        assert_eq!(cursors.last_direct_id, 1);
        assert!(feed.direct_is_read(1));
        assert_eq!(feed.mark_read_calls(), 1);

        // Already-read rows behind the cursor are not re-fetched and the
        // read flag is not re-flipped.
        poller.poll(&identity(7), &mut cursors, &sink).await.unwrap();
        assert_eq!(feed.mark_read_calls(), 1);
    }

    #[tokio::test]
    async fn test_delivered_direct_rows_carry_read_flag() {
        let feed = Arc::new(MemoryFeed::new());
        feed.push_direct(4, 3, 7, "psst");

        let poller = FeedPoller::new(feed);
        let sink = MemorySink::new();
        let mut cursors = CursorPair::default();
        poller.poll(&identity(7), &mut cursors, &sink).await.unwrap();

        match &sink.events()[0] {
            StreamEvent::DirectMessage(m) => assert!(m.is_read),
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_chat_fault_does_not_block_direct_feed() {
        let feed = Arc::new(MemoryFeed::new());
        feed.push_direct(1, 3, 7, "still here");
        feed.fail_next_chat_fetch();

        let poller = FeedPoller::new(feed);
        let sink = MemorySink::new();
        let mut cursors = CursorPair::default();

        let err = poller
            .poll(&identity(7), &mut cursors, &sink)
            .await
            .unwrap_err();
        assert!(err.is_transient());

        // The direct feed still ran and delivered.
        let names: Vec<_> = sink.events().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["direct_message"]);
        assert_eq!(cursors.last_chat_id, 0);
        assert_eq!(cursors.last_direct_id, 1);
    }
}
