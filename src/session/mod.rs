//! The session multiplexing layer: `StreamEntry`, `SessionTable`, and the
//! `SessionHandler` protocol driver built on top of them.

mod error;
mod flow;
mod handler;
mod inbound;
mod outbound;
mod priority;
mod sink;
mod stream;
mod table;

pub use error::{OutboundError, SessionError, StreamError};
pub use handler::{SessionConfig, SessionHandler, DEFAULT_INITIAL_WINDOW};
pub use priority::PriorityManager;
pub use sink::{Downstream, Upstream};
pub use stream::StreamEntry;
pub use table::SessionTable;
