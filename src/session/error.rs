//! The three error scopes a SPDY session can produce: stream-scoped,
//! session-scoped, and outbound-contract-violation. Each is a typed
//! `thiserror` value rather than a sentinel exception, so a caller gets a
//! `Result` it can match on instead of a global error singleton.

use thiserror::Error;

use crate::frame::{SessionStatus, StreamId, StreamStatus};

/// A stream-scoped protocol violation. Carries the status that gets written
/// into the RST_STREAM the handler emits in response.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("stream {stream_id} error: {status}")]
pub struct StreamError {
    pub stream_id: StreamId,
    pub status: StreamStatus,
}

impl StreamError {
    pub fn new(stream_id: StreamId, status: StreamStatus) -> StreamError {
        StreamError { stream_id, status }
    }
}

/// A session-scoped protocol violation: the whole connection must be torn
/// down with GOAWAY(`last_good_stream_id`, `status`) and then closed.
/// Returned by `SessionHandler::handle_inbound_batch` so the caller, which
/// owns the transport, can perform the actual close.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("session error (last_good_stream_id={last_good_stream_id}): {status}")]
pub struct SessionError {
    pub last_good_stream_id: StreamId,
    pub status: SessionStatus,
}

impl SessionError {
    pub fn new(last_good_stream_id: StreamId, status: SessionStatus) -> SessionError {
        SessionError {
            last_good_stream_id,
            status,
        }
    }
}

/// An outbound contract violation: the application tried to write a frame
/// the protocol forbids on this stream/session in its current state.
/// Failing the write's completion with this value keeps the violation
/// local to that one write, instead of tearing down the session.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OutboundError {
    #[error("stream {0} is not known to this session")]
    UnknownStream(StreamId),
    #[error("cannot write on locally-closed stream {0}")]
    LocallyClosed(StreamId),
    #[error("SYN_STREAM id {0} is not locally-initiated")]
    NotLocallyInitiated(StreamId),
    #[error("SYN_STREAM id {0} was refused (GOAWAY sent/received or concurrency cap reached)")]
    StreamRefused(StreamId),
    #[error("SYN_REPLY id {0} is not a known, still-open, remote-initiated stream")]
    InvalidSynReply(StreamId),
    #[error("GOAWAY must not be emitted explicitly; close the channel instead")]
    ExplicitGoaway,
    #[error("WINDOW_UPDATE must not be emitted explicitly; the handler manages flow control")]
    ExplicitWindowUpdate,
    #[error("PING id {0} is not locally-initiated")]
    InvalidPingId(StreamId),
}
