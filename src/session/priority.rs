//! SPDY priority is a flat 3-bit value, 0 highest, with no dependency graph
//! the way HTTP/2 priorities have. This manager keeps one FIFO bucket per
//! priority level and drains the highest-priority bucket first.
//!
//! `SessionHandler` consults `drain_order` when a session-wide
//! `initial_send_window` increase makes more than one stalled stream
//! eligible to resume, so a connection-wide credit top-up drains
//! higher-priority streams first instead of in arbitrary table order.

use std::collections::VecDeque;

use crate::frame::StreamId;

const PRIORITY_LEVELS: usize = 8;

#[derive(Debug)]
pub struct PriorityManager {
    buckets: Vec<VecDeque<StreamId>>,
}

impl PriorityManager {
    pub fn new() -> PriorityManager {
        PriorityManager {
            buckets: (0..PRIORITY_LEVELS).map(|_| VecDeque::new()).collect(),
        }
    }

    /// Registers `id` at priority `level` (only the low 3 bits are
    /// significant).
    pub fn register(&mut self, id: StreamId, level: u8) {
        self.buckets[(level & 0x07) as usize].push_back(id);
    }

    pub fn unregister(&mut self, id: StreamId) {
        for bucket in &mut self.buckets {
            bucket.retain(|&existing| existing != id);
        }
    }

    /// Registered ids, highest priority (level 0) first, FIFO within a
    /// level.
    pub fn drain_order(&self) -> Vec<StreamId> {
        self.buckets.iter().flatten().copied().collect()
    }
}

impl Default for PriorityManager {
    fn default() -> Self {
        PriorityManager::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_highest_priority_first() {
        let mut pm = PriorityManager::new();
        pm.register(5, 2);
        pm.register(3, 0);
        pm.register(7, 2);
        assert_eq!(pm.drain_order(), vec![3, 5, 7]);
    }

    #[test]
    fn unregister_removes_from_its_bucket() {
        let mut pm = PriorityManager::new();
        pm.register(5, 1);
        pm.register(6, 1);
        pm.unregister(5);
        assert_eq!(pm.drain_order(), vec![6]);
    }
}
