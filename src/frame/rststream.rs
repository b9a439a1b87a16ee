use super::{Flag, Frame, FrameHeader, RawFrame, StreamId, StreamStatus};

/// RST_STREAM carries no frame-level flags; the empty enum still satisfies
/// the shared `Frame::FlagType` bound for frame kinds with no flags of
/// their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RstStreamFlag {}

impl Flag for RstStreamFlag {
    fn bitmask(&self) -> u8 {
        match *self {}
    }
}

/// Abruptly terminates a single stream with a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RstStreamFrame {
    pub stream_id: StreamId,
    pub status: StreamStatus,
}

const FRAME_TYPE: u16 = 3;

impl RstStreamFrame {
    pub fn new(stream_id: StreamId, status: StreamStatus) -> RstStreamFrame {
        RstStreamFrame { stream_id, status }
    }

    fn status_code(&self) -> u32 {
        self.status as u32
    }
}

fn status_from_code(code: u32) -> Option<StreamStatus> {
    Some(match code {
        1 => StreamStatus::ProtocolError,
        2 => StreamStatus::InvalidStream,
        3 => StreamStatus::RefusedStream,
        4 => StreamStatus::UnsupportedVersion,
        5 => StreamStatus::Cancel,
        6 => StreamStatus::InternalError,
        7 => StreamStatus::FlowControlError,
        8 => StreamStatus::StreamInUse,
        9 => StreamStatus::StreamAlreadyClosed,
        10 => StreamStatus::InvalidCredentials,
        11 => StreamStatus::FrameTooLarge,
        _ => return None,
    })
}

impl Frame for RstStreamFrame {
    type FlagType = RstStreamFlag;

    fn from_raw(raw: &RawFrame) -> Option<RstStreamFrame> {
        if !raw.header.control || raw.header.frame_type != FRAME_TYPE {
            return None;
        }
        if raw.payload.len() != 8 {
            return None;
        }
        let p = &raw.payload;
        let stream_id = u32::from_be_bytes([p[0] & 0x7F, p[1], p[2], p[3]]);
        let code = u32::from_be_bytes([p[4], p[5], p[6], p[7]]);
        Some(RstStreamFrame {
            stream_id,
            status: status_from_code(code)?,
        })
    }

    fn is_set(&self, flag: RstStreamFlag) -> bool {
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
        buf.extend_from_slice(&self.status_code().to_be_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_serialize_and_from_raw() {
        let frame = RstStreamFrame::new(7, StreamStatus::StreamAlreadyClosed);
        let bytes = frame.serialize();
        let raw = RawFrame::from_buf(&bytes).unwrap();
        let parsed = RstStreamFrame::from_raw(&raw).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn rejects_unknown_status_code() {
        let header = FrameHeader {
            control: true,
            version_or_stream_id: 3,
            frame_type: FRAME_TYPE,
            flags: 0,
            length: 8,
        };
        let mut payload = 7u32.to_be_bytes().to_vec();
        payload.extend_from_slice(&999u32.to_be_bytes());
        let raw = RawFrame::with_payload(header, payload);
        assert!(RstStreamFrame::from_raw(&raw).is_none());
    }
}
