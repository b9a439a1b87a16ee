use super::{Flag, Frame, FrameHeader, RawFrame, StreamId};

/// PING carries no frame-level flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingFlag {}

impl Flag for PingFlag {
    fn bitmask(&self) -> u8 {
        match *self {}
    }
}

/// A liveness probe. Unlike every other frame kind, PING carries a full
/// 32-bit id rather than a 31-bit stream id, since it is not scoped to
/// any stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingFrame {
    pub id: u32,
}

const FRAME_TYPE: u16 = 6;

impl PingFrame {
    pub fn new(id: u32) -> PingFrame {
        PingFrame { id }
    }
}

impl Frame for PingFrame {
    type FlagType = PingFlag;

    fn from_raw(raw: &RawFrame) -> Option<PingFrame> {
        if !raw.header.control || raw.header.frame_type != FRAME_TYPE {
            return None;
        }
        if raw.payload.len() != 4 {
            return None;
        }
        let p = &raw.payload;
        Some(PingFrame {
            id: u32::from_be_bytes([p[0], p[1], p[2], p[3]]),
        })
    }

    fn is_set(&self, flag: PingFlag) -> bool {
        match flag {}
    }

    fn stream_id(&self) -> StreamId {
        0
    }

    fn serialize(&self) -> Vec<u8> {
        let header = FrameHeader {
            control: true,
            version_or_stream_id: 3,
            frame_type: FRAME_TYPE,
            flags: 0,
            length: 4,
        };
        let mut buf = super::pack_header(&header).to_vec();
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf
    }
}
