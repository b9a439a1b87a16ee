//! `SessionTable`: an ordered mapping from stream id to `StreamEntry`, with
//! the aggregate bookkeeping (`active_count`, `any_active`) and the
//! primitive stream mutations the handler drives. A `BTreeMap` keeps active
//! ids in a deterministic order, which the SETTINGS-driven window broadcast
//! relies on for a reproducible full-table walk.

use std::collections::BTreeMap;

use crate::frame::StreamId;
use crate::session::stream::StreamEntry;

#[derive(Debug, Default)]
pub struct SessionTable {
    streams: BTreeMap<StreamId, StreamEntry>,
}

impl SessionTable {
    pub fn new() -> SessionTable {
        SessionTable {
            streams: BTreeMap::new(),
        }
    }

    pub fn contains(&self, id: StreamId) -> bool {
        self.streams.contains_key(&id)
    }

    pub fn get(&self, id: StreamId) -> Option<&StreamEntry> {
        self.streams.get(&id)
    }

    pub fn get_mut(&mut self, id: StreamId) -> Option<&mut StreamEntry> {
        self.streams.get_mut(&id)
    }

    pub fn insert(&mut self, entry: StreamEntry) {
        self.streams.insert(entry.id, entry);
    }

    pub fn remove(&mut self, id: StreamId) -> Option<StreamEntry> {
        self.streams.remove(&id)
    }

    /// Both halves closed implies removal. Callers mutate an entry then
    /// call this to enforce the invariant in one place.
    pub fn remove_if_both_closed(&mut self, id: StreamId) -> bool {
        let closed = self.streams.get(&id).map(|e| e.both_closed()).unwrap_or(false);
        if closed {
            self.streams.remove(&id);
        }
        closed
    }

    pub fn active_count(&self) -> usize {
        self.streams.len()
    }

    pub fn any_active(&self) -> bool {
        !self.streams.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = StreamId> + '_ {
        self.streams.keys().copied()
    }
}
