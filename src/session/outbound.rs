//! Per-type outbound validation. The application hands a typed `SpdyFrame`
//! down; each handler either emits it (possibly fragmented or queued) or
//! fails the write with an `OutboundError`, leaving the rest of the session
//! untouched.

use log::warn;

use crate::frame::{
    HeadersFrame, PingFrame, SettingId, SettingsFrame, SpdyFrame, SynReplyFrame, SynStreamFrame,
};
use crate::session::error::OutboundError;
use crate::session::flow;
use crate::session::handler::SessionHandler;
use crate::session::sink::Downstream;

use super::super::frame::DataFrame;

pub(crate) fn handle_frame(
    handler: &mut SessionHandler,
    frame: SpdyFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    let result = dispatch(handler, frame, downstream);
    if let Err(err) = &result {
        warn!("outbound contract violation: {err}");
    }
    result
}

fn dispatch(
    handler: &mut SessionHandler,
    frame: SpdyFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    match frame {
        SpdyFrame::Data(f) => handle_data(handler, f, downstream),
        SpdyFrame::SynStream(f) => handle_syn_stream(handler, f, downstream),
        SpdyFrame::SynReply(f) => handle_syn_reply(handler, f, downstream),
        SpdyFrame::RstStream(f) => {
            handler.table.remove(f.stream_id);
            handler.priority.unregister(f.stream_id);
            handler.maybe_fire_close_callback();
            downstream.deliver(SpdyFrame::RstStream(f));
            Ok(())
        }
        SpdyFrame::Settings(f) => handle_settings(handler, f, downstream),
        SpdyFrame::Ping(f) => handle_ping(handler, f, downstream),
        SpdyFrame::GoAway(_) => Err(OutboundError::ExplicitGoaway),
        SpdyFrame::Headers(f) => handle_headers(handler, f, downstream),
        SpdyFrame::WindowUpdate(_) => Err(OutboundError::ExplicitWindowUpdate),
    }
}

/// DATA: pre-decrement under credit, split and queue the remainder on
/// partial credit, enqueue whole on no credit.
fn handle_data(
    handler: &mut SessionHandler,
    frame: DataFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    let id = frame.stream_id;

    {
        let entry = handler
            .table
            .get(id)
            .ok_or(OutboundError::UnknownStream(id))?;
        if entry.local_closed {
            return Err(OutboundError::LocallyClosed(id));
        }
    }

    if !handler.flow_control_enabled {
        let last = frame.last;
        downstream.deliver(SpdyFrame::Data(frame));
        if last {
            handler.table.get_mut(id).unwrap().local_closed = true;
            handler.close_if_both_closed(id);
        }
        return Ok(());
    }

    let send_window = handler.table.get(id).unwrap().send_window;
    let length = frame.payload.len() as i64;

    if send_window <= 0 {
        handler.table.get_mut(id).unwrap().pending_writes.push_back(frame);
        return Ok(());
    }

    if send_window < length {
        let (prefix, suffix) = frame.split_at(send_window as usize);
        handler.table.get_mut(id).unwrap().send_window -= send_window;
        downstream.deliver(SpdyFrame::Data(prefix));
        handler.table.get_mut(id).unwrap().pending_writes.push_back(suffix);
        return Ok(());
    }

    handler.table.get_mut(id).unwrap().send_window -= length;
    let last = frame.last;
    downstream.deliver(SpdyFrame::Data(frame));
    if last {
        handler.table.get_mut(id).unwrap().local_closed = true;
        handler.close_if_both_closed(id);
    }
    Ok(())
}

/// SYN_STREAM: id must be locally-initiated.
fn handle_syn_stream(
    handler: &mut SessionHandler,
    frame: SynStreamFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    let id = frame.stream_id;
    if !handler.is_locally_initiated_id(id) {
        return Err(OutboundError::NotLocallyInitiated(id));
    }
    handler
        .accept_stream(id, frame.priority, frame.unidirectional, frame.last, true)
        .map_err(|_| OutboundError::StreamRefused(id))?;
    downstream.deliver(SpdyFrame::SynStream(frame));
    Ok(())
}

/// SYN_REPLY: id must be remote-initiated and not already
/// locally-closed.
fn handle_syn_reply(
    handler: &mut SessionHandler,
    frame: SynReplyFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    let id = frame.stream_id;
    let invalid = {
        let entry = handler
            .table
            .get(id)
            .ok_or(OutboundError::InvalidSynReply(id))?;
        !handler.is_remote_initiated_id(id) || entry.local_closed
    };
    if invalid {
        return Err(OutboundError::InvalidSynReply(id));
    }
    let last = frame.last;
    downstream.deliver(SpdyFrame::SynReply(frame));
    if last {
        handler.table.get_mut(id).unwrap().local_closed = true;
        handler.close_if_both_closed(id);
    }
    Ok(())
}

/// SETTINGS: mirror of inbound, but for locally-originated
/// MAX_CONCURRENT_STREAMS and `update_initial_receive_window`.
fn handle_settings(
    handler: &mut SessionHandler,
    mut frame: SettingsFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    if let Some(setting) = frame.get(SettingId::MaxConcurrentStreams) {
        handler.set_local_concurrent_streams(setting.value);
    }

    frame.sanitize_initial_window_persistence();

    if handler.flow_control_enabled {
        if let Some(setting) = frame.get(SettingId::InitialWindowSize) {
            let new = setting.value as i64;
            let initial_receive_window = &mut handler.initial_receive_window;
            flow::update_initial_receive_window(
                &mut handler.table,
                initial_receive_window,
                new,
                &handler.priority,
            );
        }
    }

    downstream.deliver(SpdyFrame::Settings(frame));
    Ok(())
}

/// PING: id must be locally-initiated.
fn handle_ping(
    handler: &mut SessionHandler,
    frame: PingFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    if !handler.is_locally_initiated_id(frame.id) {
        return Err(OutboundError::InvalidPingId(frame.id));
    }
    handler.outstanding_pings += 1;
    downstream.deliver(SpdyFrame::Ping(frame));
    Ok(())
}

/// HEADERS: `local_closed` forbids further writes.
fn handle_headers(
    handler: &mut SessionHandler,
    frame: HeadersFrame,
    downstream: &mut dyn Downstream,
) -> Result<(), OutboundError> {
    let id = frame.stream_id;
    {
        let entry = handler
            .table
            .get(id)
            .ok_or(OutboundError::LocallyClosed(id))?;
        if entry.local_closed {
            return Err(OutboundError::LocallyClosed(id));
        }
    }
    let last = frame.last;
    downstream.deliver(SpdyFrame::Headers(frame));
    if last {
        handler.table.get_mut(id).unwrap().local_closed = true;
        handler.close_if_both_closed(id);
    }
    Ok(())
}
