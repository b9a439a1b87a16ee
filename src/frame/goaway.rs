use super::{Flag, Frame, FrameHeader, RawFrame, SessionStatus, StreamId};

/// GOAWAY carries no frame-level flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoawayFlag {}

impl Flag for GoawayFlag {
    fn bitmask(&self) -> u8 {
        match *self {}
    }
}

/// Session-terminating control frame: the last stream id the sender
/// processed, plus the reason for closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoawayFrame {
    pub last_good_stream_id: StreamId,
    pub status: SessionStatus,
}

const FRAME_TYPE: u16 = 7;

impl GoawayFrame {
    pub fn new(last_good_stream_id: StreamId, status: SessionStatus) -> GoawayFrame {
        GoawayFrame {
            last_good_stream_id,
            status,
        }
    }
}

fn status_from_code(code: u32) -> Option<SessionStatus> {
    Some(match code {
        0 => SessionStatus::Ok,
        1 => SessionStatus::ProtocolError,
        11 => SessionStatus::InternalError,
        _ => return None,
    })
}

impl Frame for GoawayFrame {
    type FlagType = GoawayFlag;

    fn from_raw(raw: &RawFrame) -> Option<GoawayFrame> {
        if !raw.header.control || raw.header.frame_type != FRAME_TYPE {
            return None;
        }
        if raw.payload.len() != 8 {
            return None;
        }
        let p = &raw.payload;
        let last_good_stream_id = u32::from_be_bytes([p[0] & 0x7F, p[1], p[2], p[3]]);
        let code = u32::from_be_bytes([p[4], p[5], p[6], p[7]]);
        Some(GoawayFrame {
            last_good_stream_id,
            status: status_from_code(code)?,
        })
    }

    fn is_set(&self, flag: GoawayFlag) -> bool {
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
            length: 8,
        };
        let mut buf = super::pack_header(&header).to_vec();
        buf.extend_from_slice(&(self.last_good_stream_id & 0x7FFF_FFFF).to_be_bytes());
        buf.extend_from_slice(&(self.status as u32).to_be_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_serialize_and_from_raw() {
        let frame = GoawayFrame::new(5, SessionStatus::ProtocolError);
        let bytes = frame.serialize();
        let raw = RawFrame::from_buf(&bytes).unwrap();
        let parsed = GoawayFrame::from_raw(&raw).unwrap();
        assert_eq!(parsed, frame);
    }
}
