//! Window bookkeeping shared by the inbound and outbound paths: the
//! broadcast of a SETTINGS-driven initial-window change to every active
//! stream, and the pending-write drain that runs whenever a stream's send
//! window grows.

use crate::frame::{DataFrame, SpdyFrame};
use crate::session::priority::PriorityManager;
use crate::session::sink::Downstream;
use crate::session::stream::StreamEntry;
use crate::session::table::SessionTable;

/// Maximum legal `send_window` value.
pub const MAX_SEND_WINDOW: i64 = i32::MAX as i64;

/// Applies `delta` to the stream's send window, then drains `pending_writes`
/// in FIFO order while there's credit and queued frames, fragmenting the
/// head frame if the available credit doesn't cover it whole. Never
/// re-emits a byte: the head frame is mutated in place to hold only its
/// remaining suffix.
pub fn update_send_window_size(entry: &mut StreamEntry, delta: i64, downstream: &mut dyn Downstream) {
    entry.send_window += delta;
    loop {
        if entry.send_window <= 0 {
            break;
        }
        let head_len = match entry.pending_writes.front() {
            Some(frame) => frame.payload.len() as i64,
            None => break,
        };
        if entry.send_window >= head_len {
            let frame = entry.pending_writes.pop_front().expect("front just checked");
            entry.send_window -= head_len;
            if frame.last {
                entry.local_closed = true;
            }
            downstream.deliver(SpdyFrame::Data(frame));
        } else {
            let avail = entry.send_window as usize;
            let placeholder = DataFrame::new(entry.id, Vec::new());
            let whole = std::mem::replace(
                entry.pending_writes.front_mut().expect("front just checked"),
                placeholder,
            );
            let (prefix, suffix) = whole.split_at(avail);
            *entry.pending_writes.front_mut().expect("front just checked") = suffix;
            entry.send_window -= avail as i64;
            downstream.deliver(SpdyFrame::Data(prefix));
        }
    }
}

/// Every active stream's `send_window` observes the delta, in `priority`'s
/// drain order so a credit top-up resumes higher-priority streams first.
/// May drive the pending-write drain on streams that become eligible.
pub fn update_initial_send_window(
    table: &mut SessionTable,
    initial_send_window: &mut i64,
    new: i64,
    priority: &PriorityManager,
    downstream: &mut dyn Downstream,
) {
    let delta = new - *initial_send_window;
    *initial_send_window = new;
    for id in priority.drain_order() {
        if let Some(entry) = table.get_mut(id) {
            update_send_window_size(entry, delta, downstream);
        }
    }
}

/// Every active stream's `recv_window` observes the delta. When the window
/// shrinks (`delta < 0`), `recv_window_lower_bound` moves by the same delta
/// so DATA already in flight under the old, larger window isn't spuriously
/// flagged as a flow-control violation.
pub fn update_initial_receive_window(
    table: &mut SessionTable,
    initial_receive_window: &mut i64,
    new: i64,
    priority: &PriorityManager,
) {
    let delta = new - *initial_receive_window;
    *initial_receive_window = new;
    for id in priority.drain_order() {
        if let Some(entry) = table.get_mut(id) {
            entry.recv_window += delta;
            if delta < 0 {
                entry.recv_window_lower_bound += delta;
            }
        }
    }
}
