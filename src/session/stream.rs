use std::collections::VecDeque;

use crate::frame::{DataFrame, StreamId};

/// The per-stream record. Holds priority, half-close flags, send/receive
/// windows, and the queue of outbound data frames stalled by flow control.
#[derive(Debug)]
pub struct StreamEntry {
    pub id: StreamId,
    /// 3-bit priority, 0 highest.
    pub priority: u8,
    /// True if this session's own side opened the stream (via SYN_STREAM).
    pub locally_initiated: bool,
    pub remote_closed: bool,
    pub local_closed: bool,
    /// Locally-initiated streams only: true after the first SYN_REPLY.
    pub received_reply: bool,
    pub send_window: i64,
    pub recv_window: i64,
    /// The most-negative value `recv_window` may legally reach following a
    /// locally-issued SETTINGS that shrank the initial window before the
    /// peer observed it.
    pub recv_window_lower_bound: i64,
    pub pending_writes: VecDeque<DataFrame>,
}

impl StreamEntry {
    pub fn new(
        id: StreamId,
        priority: u8,
        locally_initiated: bool,
        initial_send_window: i64,
        initial_recv_window: i64,
    ) -> StreamEntry {
        StreamEntry {
            id,
            priority,
            locally_initiated,
            remote_closed: false,
            local_closed: false,
            received_reply: false,
            send_window: initial_send_window,
            recv_window: initial_recv_window,
            recv_window_lower_bound: 0,
            pending_writes: VecDeque::new(),
        }
    }

    /// Both halves closed implies the stream is removed from the table.
    pub fn both_closed(&self) -> bool {
        self.remote_closed && self.local_closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stream_starts_fully_open() {
        let entry = StreamEntry::new(1, 0, true, 65_536, 65_536);
        assert!(!entry.remote_closed);
        assert!(!entry.local_closed);
        assert!(!entry.received_reply);
        assert!(!entry.both_closed());
        assert_eq!(entry.send_window, 65_536);
        assert_eq!(entry.recv_window, 65_536);
        assert_eq!(entry.recv_window_lower_bound, 0);
        assert!(entry.pending_writes.is_empty());
    }

    #[test]
    fn both_closed_requires_both_halves() {
        let mut entry = StreamEntry::new(1, 0, true, 0, 0);
        entry.remote_closed = true;
        assert!(!entry.both_closed());
        entry.local_closed = true;
        assert!(entry.both_closed());
    }
}
