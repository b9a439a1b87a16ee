use super::{Flag, Frame, FrameHeader, RawFrame, StreamId};

/// SYN_STREAM flags (SPDY/3.1 §2.6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynStreamFlag {
    Fin = 0x01,
    Unidirectional = 0x02,
}

impl Flag for SynStreamFlag {
    fn bitmask(&self) -> u8 {
        *self as u8
    }
}

/// Opens a new stream and carries its request headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynStreamFrame {
    pub stream_id: StreamId,
    pub associated_stream_id: StreamId,
    /// 3-bit priority, 0 highest.
    pub priority: u8,
    pub slot: u8,
    pub last: bool,
    pub unidirectional: bool,
    /// The compressed name/value header block, opaque at this layer.
    pub headers: Vec<u8>,
}

const FRAME_TYPE: u16 = 1;

impl SynStreamFrame {
    pub fn new(stream_id: StreamId, headers: Vec<u8>) -> SynStreamFrame {
        SynStreamFrame {
            stream_id,
            associated_stream_id: 0,
            priority: 0,
            slot: 0,
            last: false,
            unidirectional: false,
            headers,
        }
    }

    fn payload_len(&self) -> u32 {
        10 + self.headers.len() as u32
    }

    fn flags(&self) -> u8 {
        let mut flags = 0;
        if self.last {
            flags |= SynStreamFlag::Fin.bitmask();
        }
        if self.unidirectional {
            flags |= SynStreamFlag::Unidirectional.bitmask();
        }
        flags
    }
}

impl Frame for SynStreamFrame {
    type FlagType = SynStreamFlag;

    fn from_raw(raw: &RawFrame) -> Option<SynStreamFrame> {
        if !raw.header.control || raw.header.frame_type != FRAME_TYPE {
            return None;
        }
        if raw.payload.len() < 10 {
            return None;
        }
        let p = &raw.payload;
        let stream_id = u32::from_be_bytes([p[0] & 0x7F, p[1], p[2], p[3]]);
        let associated_stream_id = u32::from_be_bytes([p[4] & 0x7F, p[5], p[6], p[7]]);
        let priority = (p[8] >> 5) & 0x07;
        let slot = p[9];
        let flags = raw.header.flags;
        Some(SynStreamFrame {
            stream_id,
            associated_stream_id,
            priority,
            slot,
            last: (flags & SynStreamFlag::Fin.bitmask()) != 0,
            unidirectional: (flags & SynStreamFlag::Unidirectional.bitmask()) != 0,
            headers: p[10..].to_vec(),
        })
    }

    fn is_set(&self, flag: SynStreamFlag) -> bool {
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
        buf.extend_from_slice(&(self.associated_stream_id & 0x7FFF_FFFF).to_be_bytes());
        buf.push((self.priority & 0x07) << 5);
        buf.push(self.slot);
        buf.extend_from_slice(&self.headers);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_serialize_and_from_raw() {
        let mut frame = SynStreamFrame::new(1, b"hdrs".to_vec());
        frame.priority = 3;
        frame.last = true;
        let bytes = frame.serialize();
        let raw = RawFrame::from_buf(&bytes).unwrap();
        let parsed = SynStreamFrame::from_raw(&raw).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn rejects_short_payload() {
        let header = FrameHeader {
            control: true,
            version_or_stream_id: 3,
            frame_type: FRAME_TYPE,
            flags: 0,
            length: 2,
        };
        let raw = RawFrame::with_payload(header, vec![0, 0]);
        assert!(SynStreamFrame::from_raw(&raw).is_none());
    }
}
