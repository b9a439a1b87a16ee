use super::{Flag, Frame, FrameHeader, RawFrame, StreamId};

/// WINDOW_UPDATE carries no frame-level flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowUpdateFlag {}

impl Flag for WindowUpdateFlag {
    fn bitmask(&self) -> u8 {
        match *self {}
    }
}

/// Grants additional send-window credit to the peer for one stream.
/// `delta` is a positive 31-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowUpdateFrame {
    pub stream_id: StreamId,
    pub delta: u32,
}

const FRAME_TYPE: u16 = 9;

impl WindowUpdateFrame {
    pub fn new(stream_id: StreamId, delta: u32) -> WindowUpdateFrame {
        WindowUpdateFrame { stream_id, delta }
    }
}

impl Frame for WindowUpdateFrame {
    type FlagType = WindowUpdateFlag;

    fn from_raw(raw: &RawFrame) -> Option<WindowUpdateFrame> {
        if !raw.header.control || raw.header.frame_type != FRAME_TYPE {
            return None;
        }
        if raw.payload.len() != 8 {
            return None;
        }
        let p = &raw.payload;
        let stream_id = u32::from_be_bytes([p[0] & 0x7F, p[1], p[2], p[3]]);
        let delta = u32::from_be_bytes([p[4] & 0x7F, p[5], p[6], p[7]]);
        Some(WindowUpdateFrame { stream_id, delta })
    }

    fn is_set(&self, flag: WindowUpdateFlag) -> bool {
        match flag {}
    }

    fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    fn serialize(&self) -> Vec<u8> {
        let header = FrameHeader {
            control: true,
            version_or_stream_id: 3,
            frame_type: FRAME_TYPE,
            flags: 0,
            length: 8,
        };
        let mut buf = super::pack_header(&header).to_vec();
        buf.extend_from_slice(&(self.stream_id & 0x7FFF_FFFF).to_be_bytes());
        buf.extend_from_slice(&(self.delta & 0x7FFF_FFFF).to_be_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_serialize_and_from_raw() {
        let frame = WindowUpdateFrame::new(9, 40_000);
        let bytes = frame.serialize();
        let raw = RawFrame::from_buf(&bytes).unwrap();
        let parsed = WindowUpdateFrame::from_raw(&raw).unwrap();
        assert_eq!(parsed, frame);
    }
}
