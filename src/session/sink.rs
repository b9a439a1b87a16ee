//! The upstream/downstream delivery contract `SessionHandler` talks to.
//! The actual channel/pipeline plumbing that moves bytes to and from the
//! transport lives outside this crate; these traits are the seam it plugs
//! into, narrow enough that a test can satisfy them with a plain `Vec`.

use crate::frame::SpdyFrame;

/// Receives frames the handler forwards toward the application.
pub trait Upstream {
    fn deliver(&mut self, frame: SpdyFrame);
}

/// Receives frames the handler forwards toward the codec/transport.
pub trait Downstream {
    fn deliver(&mut self, frame: SpdyFrame);
}

impl Upstream for Vec<SpdyFrame> {
    fn deliver(&mut self, frame: SpdyFrame) {
        self.push(frame);
    }
}

impl Downstream for Vec<SpdyFrame> {
    fn deliver(&mut self, frame: SpdyFrame) {
        self.push(frame);
    }
}
