//! `SessionHandler`, the protocol driver: classifies inbound and outbound
//! frames, validates them against the per-stream and per-session rules,
//! mutates the `SessionTable`, and orchestrates graceful and forced session
//! termination.
//!
//! Every public method takes `&mut self` and no synchronization primitive
//! guards any field. A session is driven by a single event loop per
//! connection, so mutual exclusion falls out of that scheduling model
//! rather than needing a lock here. See `DESIGN.md` for the full rationale.

use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::frame::{GoawayFrame, PingFrame, SessionStatus, SpdyFrame, StreamId};
use crate::session::error::{SessionError, StreamError};
use crate::session::inbound;
use crate::session::outbound;
use crate::session::priority::PriorityManager;
use crate::session::sink::{Downstream, Upstream};
use crate::session::stream::StreamEntry;
use crate::session::table::SessionTable;

use crate::session::error::OutboundError;

/// Default initial window size, both directions.
pub const DEFAULT_INITIAL_WINDOW: i64 = 65_536;

/// Construction input: protocol version and which side of the connection
/// this session represents.
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub version: u8,
    pub is_server: bool,
    pub initial_window: i64,
    pub drain_timeout: Option<Duration>,
}

impl SessionConfig {
    pub fn new(version: u8, is_server: bool) -> SessionConfig {
        SessionConfig {
            version,
            is_server,
            initial_window: DEFAULT_INITIAL_WINDOW,
            drain_timeout: None,
        }
    }

    pub fn with_initial_window(mut self, window: i64) -> SessionConfig {
        self.initial_window = window;
        self
    }

    /// A configurable maximum drain time. The caller (owner of the event
    /// loop and transport) polls `SessionHandler::drain_deadline_elapsed`
    /// and forces the transport closed if it returns `true`; this crate
    /// owns no clock or timer of its own.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> SessionConfig {
        self.drain_timeout = Some(timeout);
        self
    }
}

/// The protocol driver. One instance per transport connection.
pub struct SessionHandler {
    is_server: bool,
    pub(crate) flow_control_enabled: bool,
    pub(crate) table: SessionTable,
    pub(crate) priority: PriorityManager,
    pub(crate) last_good_stream_id: StreamId,
    pub(crate) sent_goaway: bool,
    pub(crate) received_goaway: bool,
    local_concurrent_streams: u32,
    remote_concurrent_streams: u32,
    effective_max_concurrent_streams: u32,
    pub(crate) initial_send_window: i64,
    pub(crate) initial_receive_window: i64,
    pub(crate) outstanding_pings: u32,
    close_callback: Option<Box<dyn FnOnce() + Send>>,
    drain_timeout: Option<Duration>,
    drain_deadline: Option<Instant>,
}

impl SessionHandler {
    pub fn new(config: SessionConfig) -> SessionHandler {
        SessionHandler {
            is_server: config.is_server,
            flow_control_enabled: config.version >= 3,
            table: SessionTable::new(),
            priority: PriorityManager::new(),
            last_good_stream_id: 0,
            sent_goaway: false,
            received_goaway: false,
            local_concurrent_streams: 0,
            remote_concurrent_streams: 0,
            effective_max_concurrent_streams: 0,
            initial_send_window: config.initial_window,
            initial_receive_window: config.initial_window,
            outstanding_pings: 0,
            close_callback: None,
            drain_timeout: config.drain_timeout,
            drain_deadline: None,
        }
    }

    pub fn is_server(&self) -> bool {
        self.is_server
    }

    pub fn flow_control_enabled(&self) -> bool {
        self.flow_control_enabled
    }

    pub fn last_good_stream_id(&self) -> StreamId {
        self.last_good_stream_id
    }

    pub fn sent_goaway(&self) -> bool {
        self.sent_goaway
    }

    pub fn received_goaway(&self) -> bool {
        self.received_goaway
    }

    pub fn active_count(&self) -> usize {
        self.table.active_count()
    }

    pub fn outstanding_pings(&self) -> u32 {
        self.outstanding_pings
    }

    /// Server-initiated ids are even, client-initiated ids are odd. Shared
    /// by stream ids and PING ids.
    pub fn is_locally_initiated_id(&self, id: u32) -> bool {
        if self.is_server {
            id % 2 == 0
        } else {
            id % 2 == 1
        }
    }

    pub fn is_remote_initiated_id(&self, id: u32) -> bool {
        !self.is_locally_initiated_id(id)
    }

    /// `effective_max_concurrent_streams` derivation: both zero means
    /// unspecified; if exactly one is non-zero, use it; else the minimum.
    pub(crate) fn recompute_effective_max(&mut self) {
        self.effective_max_concurrent_streams = match (
            self.local_concurrent_streams,
            self.remote_concurrent_streams,
        ) {
            (0, 0) => 0,
            (0, remote) => remote,
            (local, 0) => local,
            (local, remote) => local.min(remote),
        };
    }

    pub(crate) fn set_remote_concurrent_streams(&mut self, value: u32) {
        self.remote_concurrent_streams = value;
        self.recompute_effective_max();
    }

    pub(crate) fn set_local_concurrent_streams(&mut self, value: u32) {
        self.local_concurrent_streams = value;
        self.recompute_effective_max();
    }

    /// Admits a new stream. Returns `Err(())` on refusal (GOAWAY already
    /// exchanged, or the concurrency cap is reached); the caller maps that
    /// to the appropriate stream error (inbound: REFUSED_STREAM) or
    /// outbound contract violation.
    pub(crate) fn accept_stream(
        &mut self,
        id: StreamId,
        priority: u8,
        remote_closed: bool,
        local_closed: bool,
        locally_initiated: bool,
    ) -> Result<(), ()> {
        if self.received_goaway || self.sent_goaway {
            return Err(());
        }
        let max = self.effective_max_concurrent_streams;
        if max != 0 && self.table.active_count() as u32 >= max {
            return Err(());
        }
        let mut entry = StreamEntry::new(
            id,
            priority,
            locally_initiated,
            self.initial_send_window,
            self.initial_receive_window,
        );
        entry.remote_closed = remote_closed;
        entry.local_closed = local_closed;
        self.table.insert(entry);
        self.priority.register(id, priority);
        if !locally_initiated {
            self.last_good_stream_id = id;
        }
        debug!("accepted stream {id}, active_count={}", self.table.active_count());
        Ok(())
    }

    /// Stream error: remove the stream, emit RST_STREAM downstream,
    /// and — if the stream was previously known to this session — deliver
    /// the same RST_STREAM upstream so the application learns its stream
    /// died. A stream never known to this session (never admitted) has
    /// nothing upstream to notify.
    pub(crate) fn raise_stream_error(
        &mut self,
        err: StreamError,
        upstream: &mut dyn Upstream,
        downstream: &mut dyn Downstream,
    ) {
        warn!("stream {} error: {}", err.stream_id, err.status);
        let existed = self.table.remove(err.stream_id).is_some();
        self.priority.unregister(err.stream_id);
        downstream.deliver(SpdyFrame::RstStream(crate::frame::RstStreamFrame::new(
            err.stream_id,
            err.status,
        )));
        if existed {
            upstream.deliver(SpdyFrame::RstStream(crate::frame::RstStreamFrame::new(
                err.stream_id,
                err.status,
            )));
        }
        self.maybe_fire_close_callback();
    }

    /// Session error: emit GOAWAY, mark `sent_goaway`. The caller
    /// (owner of the transport) closes it once the GOAWAY write completes.
    pub fn raise_session_error(&mut self, err: SessionError, downstream: &mut dyn Downstream) {
        warn!(
            "session error, sending GOAWAY(last_good_stream_id={}, status={})",
            err.last_good_stream_id, err.status
        );
        downstream.deliver(SpdyFrame::GoAway(GoawayFrame::new(
            err.last_good_stream_id,
            err.status,
        )));
        self.sent_goaway = true;
        self.arm_drain_deadline();
    }

    /// Graceful close: emit GOAWAY(OK); close immediately if no
    /// streams are active, else arm `close_promise` (here, `on_drained`)
    /// to fire once `active_count()` reaches zero.
    pub fn close_gracefully<F>(&mut self, downstream: &mut dyn Downstream, on_drained: F)
    where
        F: FnOnce() + Send + 'static,
    {
        debug!(
            "graceful close requested, {} stream(s) active",
            self.table.active_count()
        );
        downstream.deliver(SpdyFrame::GoAway(GoawayFrame::new(
            self.last_good_stream_id,
            SessionStatus::Ok,
        )));
        self.sent_goaway = true;
        self.arm_drain_deadline();
        if self.table.any_active() {
            self.close_callback = Some(Box::new(on_drained));
        } else {
            on_drained();
        }
    }

    fn arm_drain_deadline(&mut self) {
        if self.drain_deadline.is_none() {
            self.drain_deadline = self.drain_timeout.map(|timeout| Instant::now() + timeout);
        }
    }

    /// The caller polls this to decide whether to force the transport
    /// closed rather than keep waiting for drain.
    pub fn drain_deadline_elapsed(&self, now: Instant) -> bool {
        matches!(self.drain_deadline, Some(deadline) if now >= deadline)
    }

    /// Both halves closed implies removal. Wraps
    /// `SessionTable::remove_if_both_closed` with the bookkeeping every
    /// removal needs regardless of cause (error, RST_STREAM, or ordinary
    /// half-close completion): drop the stream from the priority manager
    /// and check whether a pending graceful close can now fire.
    pub(crate) fn close_if_both_closed(&mut self, id: StreamId) -> bool {
        let closed = self.table.remove_if_both_closed(id);
        if closed {
            self.priority.unregister(id);
            self.maybe_fire_close_callback();
        }
        closed
    }

    pub(crate) fn maybe_fire_close_callback(&mut self) {
        if self.sent_goaway && !self.table.any_active() {
            if let Some(cb) = self.close_callback.take() {
                cb();
            }
        }
    }

    /// Inbound dispatch. Preserves batch ordering except that a
    /// SYN_STREAM forces a flush of whatever's buffered so far, so
    /// `last_good_stream_id` is never observed stale by an upstream handler
    /// mid-batch.
    pub fn handle_inbound_batch(
        &mut self,
        frames: Vec<SpdyFrame>,
        upstream: &mut dyn Upstream,
        downstream: &mut dyn Downstream,
    ) -> Result<(), SessionError> {
        let mut pending: Vec<SpdyFrame> = Vec::new();
        for frame in frames {
            if matches!(frame, SpdyFrame::SynStream(_)) {
                for buffered in pending.drain(..) {
                    upstream.deliver(buffered);
                }
            }
            if let Some(forward) = inbound::handle_frame(self, frame, upstream, downstream)? {
                pending.push(forward);
            }
        }
        for buffered in pending.drain(..) {
            upstream.deliver(buffered);
        }
        Ok(())
    }

    /// Outbound dispatch.
    pub fn handle_outbound(
        &mut self,
        frame: SpdyFrame,
        downstream: &mut dyn Downstream,
    ) -> Result<(), OutboundError> {
        outbound::handle_frame(self, frame, downstream)
    }

    /// Issues a locally-initiated PING, for the caller's own liveness
    /// checks. The id must already satisfy `is_locally_initiated_id`.
    pub fn ping(&mut self, id: u32, downstream: &mut dyn Downstream) -> Result<(), OutboundError> {
        self.handle_outbound(SpdyFrame::Ping(PingFrame::new(id)), downstream)
    }
}
