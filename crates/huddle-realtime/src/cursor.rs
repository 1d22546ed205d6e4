//! Per-connection delivery cursors.

/// Resume cursors for the two change feeds of one connection.
///
/// Cursors live only in connection memory; the client carries them across
/// reconnects via query parameters. A cursor only ever moves forward, so an
/// empty or out-of-order batch can never cause redelivery of older rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPair {
    /// Highest broadcast chat message id already delivered.
    pub last_chat_id: i64,
    /// Highest direct message id already delivered.
    pub last_direct_id: i64,
}

impl CursorPair {
    /// Seed cursors from client-supplied resume values.
    ///
    /// Negative values are clamped to 0 rather than rejected; a client
    /// sending garbage just restarts from the beginning of the feed.
    pub fn new(last_chat_id: i64, last_direct_id: i64) -> Self {
        Self {
            last_chat_id: last_chat_id.max(0),
            last_direct_id: last_direct_id.max(0),
        }
    }

    /// Advance the chat cursor to the given id, never backwards.
    pub fn advance_chat(&mut self, id: i64) {
        self.last_chat_id = self.last_chat_id.max(id);
    }

    /// Advance the direct cursor to the given id, never backwards.
    pub fn advance_direct(&mut self, id: i64) {
        self.last_direct_id = self.last_direct_id.max(id);
    }
}

impl Default for CursorPair {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_is_monotonic() {
        let mut cursors = CursorPair::new(5, 3);

        cursors.advance_chat(9);
        assert_eq!(cursors.last_chat_id, 9);

        // A smaller id never regresses the cursor.
        cursors.advance_chat(2);
        assert_eq!(cursors.last_chat_id, 9);

        cursors.advance_direct(3);
        assert_eq!(cursors.last_direct_id, 3);
    }

    #[test]
    fn test_negative_resume_values_are_clamped() {
        let cursors = CursorPair::new(-1, -42);
        assert_eq!(cursors.last_chat_id, 0);
        assert_eq!(cursors.last_direct_id, 0);
    }
}
