//! A SPDY session multiplexing layer: stream lifecycle, windowed flow
//! control, and session-wide error handling (GOAWAY/RST_STREAM), built on
//! top of typed SPDY frame values.
//!
//! The crate is split along the protocol's own seams: `frame` owns the wire
//! format (header packing, per-kind frame structs), `session` owns the
//! protocol driver (`SessionHandler`) that classifies and validates frames
//! against the per-stream and per-session state in `SessionTable`. Reading
//! and writing the actual transport bytes, and the HPACK-less SPDY header
//! compression, are both out of scope; see `DESIGN.md`.

pub mod frame;
pub mod session;

pub use frame::{
    DataFrame, Flag, Frame, FrameHeader, GoawayFrame, HeadersFrame, HttpSetting, PingFrame,
    RawFrame, RstStreamFrame, SessionStatus, SettingId, SettingsFlag, SettingsFrame, SpdyFrame,
    StreamId, StreamStatus, SynReplyFrame, SynStreamFrame, WindowUpdateFrame,
};
pub use session::{
    Downstream, OutboundError, PriorityManager, SessionConfig, SessionError, SessionHandler,
    SessionTable, StreamEntry, StreamError, Upstream, DEFAULT_INITIAL_WINDOW,
};
