use super::{Flag, Frame, FrameHeader, RawFrame, StreamId};

/// SYN_REPLY flags (SPDY/3.1 §2.6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynReplyFlag {
    Fin = 0x01,
}

impl Flag for SynReplyFlag {
    fn bitmask(&self) -> u8 {
        *self as u8
    }
}

/// The response headers that open the reply direction of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynReplyFrame {
    pub stream_id: StreamId,
    pub last: bool,
    pub headers: Vec<u8>,
}

const FRAME_TYPE: u16 = 2;

impl SynReplyFrame {
    pub fn new(stream_id: StreamId, headers: Vec<u8>) -> SynReplyFrame {
        SynReplyFrame {
            stream_id,
            last: false,
            headers,
        }
    }

    fn payload_len(&self) -> u32 {
        4 + self.headers.len() as u32
    }

    fn flags(&self) -> u8 {
        if self.last {
            SynReplyFlag::Fin.bitmask()
        } else {
            0
        }
    }
}

impl Frame for SynReplyFrame {
    type FlagType = SynReplyFlag;

    fn from_raw(raw: &RawFrame) -> Option<SynReplyFrame> {
        if !raw.header.control || raw.header.frame_type != FRAME_TYPE {
            return None;
        }
        if raw.payload.len() < 4 {
            return None;
        }
        let p = &raw.payload;
        let stream_id = u32::from_be_bytes([p[0] & 0x7F, p[1], p[2], p[3]]);
        Some(SynReplyFrame {
            stream_id,
            last: (raw.header.flags & SynReplyFlag::Fin.bitmask()) != 0,
            headers: p[4..].to_vec(),
        })
    }

    fn is_set(&self, flag: SynReplyFlag) -> bool {
        (self.flags() & flag.bitmask()) != 0
    }

    fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    fn serialize(&self) -> Vec<u8> {
        let header = FrameHeader {
            control: true,
            version_or_stream_id: 3,
            frame_type: FRAME_TYPE,
            flags: self.flags(),
            length: self.payload_len(),
        };
        let mut buf = super::pack_header(&header).to_vec();
        buf.extend_from_slice(&(self.stream_id & 0x7FFF_FFFF).to_be_bytes());
        buf.extend_from_slice(&self.headers);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_serialize_and_from_raw() {
        let frame = SynReplyFrame {
            stream_id: 1,
            last: true,
            headers: b"hdrs".to_vec(),
        };
        let bytes = frame.serialize();
        let raw = RawFrame::from_buf(&bytes).unwrap();
        let parsed = SynReplyFrame::from_raw(&raw).unwrap();
        assert_eq!(parsed, frame);
    }
}
