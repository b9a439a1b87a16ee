//! Per-type inbound validation. Each handler mutates the
//! session/table state, may emit a control frame downstream, and returns
//! `Ok(Some(frame))` when the (possibly unchanged) frame should still be
//! forwarded upstream, or `Ok(None)` when it already forwarded everything
//! itself (DATA fragmentation, RST_STREAM notification) or the frame was
//! silently dropped. A session-scoped violation is the one case that
//! escapes as `Err`.

use log::debug;

use crate::frame::{
    DataFrame, GoawayFrame, HeadersFrame, PingFrame, RstStreamFrame, SettingId, SettingsFrame,
    SessionStatus, SpdyFrame, StreamStatus, SynReplyFrame, SynStreamFrame, WindowUpdateFrame,
};
use crate::session::error::{SessionError, StreamError};
use crate::session::flow;
use crate::session::handler::SessionHandler;
use crate::session::sink::{Downstream, Upstream};

pub(crate) fn handle_frame(
    handler: &mut SessionHandler,
    frame: SpdyFrame,
    upstream: &mut dyn Upstream,
    downstream: &mut dyn Downstream,
) -> Result<Option<SpdyFrame>, SessionError> {
    debug!("inbound {} stream={}", frame.kind_name(), frame.stream_id());
    match frame {
        SpdyFrame::Data(f) => Ok(handle_data(handler, f, upstream, downstream)),
        SpdyFrame::SynStream(f) => handle_syn_stream(handler, f, upstream, downstream),
        SpdyFrame::SynReply(f) => Ok(handle_syn_reply(handler, f, upstream, downstream)),
        SpdyFrame::RstStream(f) => Ok(handle_rst_stream(handler, f)),
        SpdyFrame::Settings(f) => Ok(handle_settings(handler, f, downstream)),
        SpdyFrame::Ping(f) => Ok(handle_ping(handler, f, downstream)),
        SpdyFrame::GoAway(f) => Ok(handle_goaway(handler, f)),
        SpdyFrame::Headers(f) => Ok(handle_headers(handler, f, upstream, downstream)),
        SpdyFrame::WindowUpdate(f) => Ok(handle_window_update(handler, f, upstream, downstream)),
    }
}

/// DATA.
fn handle_data(
    handler: &mut SessionHandler,
    frame: DataFrame,
    upstream: &mut dyn Upstream,
    downstream: &mut dyn Downstream,
) -> Option<SpdyFrame> {
    let id = frame.stream_id;

    if !handler.table.contains(id) {
        if id <= handler.last_good_stream_id {
            handler.raise_stream_error(StreamError::new(id, StreamStatus::ProtocolError), upstream, downstream);
        } else if !handler.sent_goaway {
            handler.raise_stream_error(StreamError::new(id, StreamStatus::InvalidStream), upstream, downstream);
        }
        // else: no GOAWAY sent yet is false (i.e. we did send one) -- silently drop.
        return None;
    }

    if handler.table.get(id).unwrap().remote_closed {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::StreamAlreadyClosed), upstream, downstream);
        return None;
    }

    {
        let entry = handler.table.get(id).unwrap();
        if entry.locally_initiated && !entry.received_reply {
            handler.raise_stream_error(StreamError::new(id, StreamStatus::ProtocolError), upstream, downstream);
            return None;
        }
    }

    let last = frame.last;

    if !handler.flow_control_enabled {
        if last {
            handler.table.get_mut(id).unwrap().remote_closed = true;
            handler.close_if_both_closed(id);
        }
        return Some(SpdyFrame::Data(frame));
    }

    let payload_len = frame.payload.len() as i64;
    let (lower_bound, prior_window) = {
        let entry = handler.table.get(id).unwrap();
        (entry.recv_window_lower_bound, entry.recv_window)
    };
    let new_window = prior_window - payload_len;
    if new_window < lower_bound {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::FlowControlError), upstream, downstream);
        return None;
    }
    handler.table.get_mut(id).unwrap().recv_window = new_window;

    let result = if new_window < 0 {
        // These bytes arrived before the peer observed our shrinking
        // SETTINGS; split into initial-receive-window-sized chunks and
        // forward each as its own DATA frame.
        let chunk_size = handler.initial_receive_window.max(1) as usize;
        let mut remaining = frame;
        loop {
            if remaining.payload.len() <= chunk_size {
                upstream.deliver(SpdyFrame::Data(remaining));
                break;
            }
            let (chunk, rest) = remaining.split_at(chunk_size);
            upstream.deliver(SpdyFrame::Data(chunk));
            remaining = rest;
        }
        None
    } else {
        Some(SpdyFrame::Data(frame))
    };

    let half = handler.initial_receive_window / 2;
    if new_window <= half && !last {
        let delta = handler.initial_receive_window - new_window;
        {
            let entry = handler.table.get_mut(id).unwrap();
            entry.recv_window = handler.initial_receive_window;
            entry.recv_window_lower_bound = 0;
        }
        downstream.deliver(SpdyFrame::WindowUpdate(WindowUpdateFrame::new(
            id,
            delta as u32,
        )));
    }

    if last {
        handler.table.get_mut(id).unwrap().remote_closed = true;
        handler.close_if_both_closed(id);
    }

    result
}

/// SYN_STREAM.
fn handle_syn_stream(
    handler: &mut SessionHandler,
    frame: SynStreamFrame,
    upstream: &mut dyn Upstream,
    downstream: &mut dyn Downstream,
) -> Result<Option<SpdyFrame>, SessionError> {
    let id = frame.stream_id;

    if handler.is_locally_initiated_id(id) || handler.table.contains(id) {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::ProtocolError), upstream, downstream);
        return Ok(None);
    }

    if id <= handler.last_good_stream_id {
        return Err(SessionError::new(
            handler.last_good_stream_id,
            SessionStatus::ProtocolError,
        ));
    }

    if handler
        .accept_stream(id, frame.priority, frame.last, frame.unidirectional, false)
        .is_err()
    {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::RefusedStream), upstream, downstream);
        return Ok(None);
    }

    Ok(Some(SpdyFrame::SynStream(frame)))
}

/// SYN_REPLY.
fn handle_syn_reply(
    handler: &mut SessionHandler,
    frame: SynReplyFrame,
    upstream: &mut dyn Upstream,
    downstream: &mut dyn Downstream,
) -> Option<SpdyFrame> {
    let id = frame.stream_id;

    let invalid = !handler.table.contains(id)
        || handler.is_remote_initiated_id(id)
        || handler.table.get(id).unwrap().remote_closed;
    if invalid {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::InvalidStream), upstream, downstream);
        return None;
    }

    if handler.table.get(id).unwrap().received_reply {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::StreamInUse), upstream, downstream);
        return None;
    }

    let entry = handler.table.get_mut(id).unwrap();
    entry.received_reply = true;
    if frame.last {
        entry.remote_closed = true;
    }
    handler.close_if_both_closed(id);

    Some(SpdyFrame::SynReply(frame))
}

/// RST_STREAM: remove unconditionally; never reply in kind.
fn handle_rst_stream(handler: &mut SessionHandler, frame: RstStreamFrame) -> Option<SpdyFrame> {
    handler.table.remove(frame.stream_id);
    handler.priority.unregister(frame.stream_id);
    handler.maybe_fire_close_callback();
    Some(SpdyFrame::RstStream(frame))
}

/// SETTINGS.
fn handle_settings(
    handler: &mut SessionHandler,
    mut frame: SettingsFrame,
    downstream: &mut dyn Downstream,
) -> Option<SpdyFrame> {
    if let Some(setting) = frame.get(SettingId::MaxConcurrentStreams) {
        handler.set_remote_concurrent_streams(setting.value);
    }

    frame.sanitize_initial_window_persistence();

    if handler.flow_control_enabled {
        if let Some(setting) = frame.get(SettingId::InitialWindowSize) {
            let new = setting.value as i64;
            let initial_send_window = &mut handler.initial_send_window;
            flow::update_initial_send_window(
                &mut handler.table,
                initial_send_window,
                new,
                &handler.priority,
                downstream,
            );
        }
    }

    Some(SpdyFrame::Settings(frame))
}

/// PING: echo peer-originated pings, otherwise reconcile against
/// `outstanding_pings`.
fn handle_ping(
    handler: &mut SessionHandler,
    frame: PingFrame,
    downstream: &mut dyn Downstream,
) -> Option<SpdyFrame> {
    if handler.is_remote_initiated_id(frame.id) {
        downstream.deliver(SpdyFrame::Ping(frame));
        Some(SpdyFrame::Ping(frame))
    } else {
        if handler.outstanding_pings == 0 {
            return None;
        }
        handler.outstanding_pings -= 1;
        Some(SpdyFrame::Ping(frame))
    }
}

/// GOAWAY: no new locally-initiated streams after this; in-flight
/// streams continue.
fn handle_goaway(handler: &mut SessionHandler, frame: GoawayFrame) -> Option<SpdyFrame> {
    debug!(
        "peer sent GOAWAY(last_good_stream_id={}, status={}); no further locally-initiated streams",
        frame.last_good_stream_id, frame.status
    );
    handler.received_goaway = true;
    Some(SpdyFrame::GoAway(frame))
}

/// HEADERS.
fn handle_headers(
    handler: &mut SessionHandler,
    frame: HeadersFrame,
    upstream: &mut dyn Upstream,
    downstream: &mut dyn Downstream,
) -> Option<SpdyFrame> {
    let id = frame.stream_id;

    if !handler.table.contains(id) {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::ProtocolError), upstream, downstream);
        return None;
    }
    if handler.table.get(id).unwrap().remote_closed {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::InvalidStream), upstream, downstream);
        return None;
    }

    if frame.last {
        handler.table.get_mut(id).unwrap().remote_closed = true;
        handler.close_if_both_closed(id);
    }

    Some(SpdyFrame::Headers(frame))
}

/// WINDOW_UPDATE, flow control enabled only.
fn handle_window_update(
    handler: &mut SessionHandler,
    frame: WindowUpdateFrame,
    upstream: &mut dyn Upstream,
    downstream: &mut dyn Downstream,
) -> Option<SpdyFrame> {
    if !handler.flow_control_enabled {
        return Some(SpdyFrame::WindowUpdate(frame));
    }

    let id = frame.stream_id;
    let entry = match handler.table.get(id) {
        Some(entry) => entry,
        None => return None,
    };
    if entry.local_closed {
        return None;
    }

    let delta = frame.delta as i64;
    if entry.send_window + delta > flow::MAX_SEND_WINDOW {
        handler.raise_stream_error(StreamError::new(id, StreamStatus::FlowControlError), upstream, downstream);
        return None;
    }

    let entry = handler.table.get_mut(id).unwrap();
    flow::update_send_window_size(entry, delta, downstream);

    Some(SpdyFrame::WindowUpdate(frame))
}
