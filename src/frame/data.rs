use super::{Flag, Frame, FrameHeader, RawFrame, StreamId};

/// DATA flags (SPDY/3.1 §2.6.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFlag {
    Fin = 0x01,
}

impl Flag for DataFlag {
    fn bitmask(&self) -> u8 {
        *self as u8
    }
}

/// A chunk of stream payload. The only frame kind carried over a
/// non-control (data) wire header rather than a control frame header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame {
    pub stream_id: StreamId,
    pub last: bool,
    pub payload: Vec<u8>,
}

impl DataFrame {
    pub fn new(stream_id: StreamId, payload: Vec<u8>) -> DataFrame {
        DataFrame {
            stream_id,
            last: false,
            payload,
        }
    }

    fn flags(&self) -> u8 {
        if self.last {
            DataFlag::Fin.bitmask()
        } else {
            0
        }
    }

    /// Splits the frame's payload at `at` bytes, returning a new
    /// (prefix, suffix) pair of frames. The prefix carries `last` only if
    /// the original frame was `last` *and* the split consumed the entire
    /// payload; the suffix always inherits the original `last` flag,
    /// remains on the mutated original, matching how a partially-credited
    /// write is drained: the head frame is mutated so its remaining
    /// payload is the suffix.
    pub fn split_at(mut self, at: usize) -> (DataFrame, DataFrame) {
        assert!(at <= self.payload.len());
        let suffix_payload = self.payload.split_off(at);
        let suffix_last = self.last;
        self.last = self.last && suffix_payload.is_empty();
        let suffix = DataFrame {
            stream_id: self.stream_id,
            last: suffix_last && !self.last,
            payload: suffix_payload,
        };
        (self, suffix)
    }
}

impl Frame for DataFrame {
    type FlagType = DataFlag;

    fn from_raw(raw: &RawFrame) -> Option<DataFrame> {
        if raw.header.control {
            return None;
        }
        Some(DataFrame {
            stream_id: raw.header.version_or_stream_id,
            last: (raw.header.flags & DataFlag::Fin.bitmask()) != 0,
            payload: raw.payload.clone(),
        })
    }

    fn is_set(&self, flag: DataFlag) -> bool {
        (self.flags() & flag.bitmask()) != 0
    }

    fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    fn serialize(&self) -> Vec<u8> {
        let header = FrameHeader {
            control: false,
            version_or_stream_id: self.stream_id & 0x7FFF_FFFF,
            frame_type: 0,
            flags: self.flags(),
            length: self.payload.len() as u32,
        };
        let mut buf = super::pack_header(&header).to_vec();
        buf.extend_from_slice(&self.payload);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_serialize_and_from_raw() {
        let frame = DataFrame {
            stream_id: 1,
            last: true,
            payload: b"hello".to_vec(),
        };
        let bytes = frame.serialize();
        let raw = RawFrame::from_buf(&bytes).unwrap();
        let parsed = DataFrame::from_raw(&raw).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn split_preserves_total_bytes_and_moves_last_flag_to_suffix() {
        let frame = DataFrame {
            stream_id: 3,
            last: true,
            payload: b"abcdef".to_vec(),
        };
        let (prefix, suffix) = frame.split_at(4);
        assert_eq!(prefix.payload, b"abcd");
        assert_eq!(suffix.payload, b"ef");
        assert!(!prefix.last);
        assert!(suffix.last);
    }

    #[test]
    fn split_at_full_length_keeps_last_on_prefix() {
        let frame = DataFrame {
            stream_id: 3,
            last: true,
            payload: b"abcd".to_vec(),
        };
        let (prefix, suffix) = frame.split_at(4);
        assert_eq!(prefix.payload, b"abcd");
        assert!(suffix.payload.is_empty());
        assert!(prefix.last);
        assert!(!suffix.last);
    }
}
