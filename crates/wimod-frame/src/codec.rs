use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};
use crate::fcs;
use crate::slip::{escape_into, END};

/// Frame header: destination id (1) + message id (1).
pub const HEADER_SIZE: usize = 2;

/// Frame check sequence size.
pub const FCS_SIZE: usize = 2;

/// Largest HCI payload.
pub const MAX_PAYLOAD: usize = 300;

/// Largest unescaped frame: header + payload + FCS.
pub const MAX_FRAME_SIZE: usize = HEADER_SIZE + MAX_PAYLOAD + FCS_SIZE;

/// Smallest frame worth checking: header + FCS.
pub const MIN_FRAME_SIZE: usize = HEADER_SIZE + FCS_SIZE;

/// An HCI message addressed by endpoint and message id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Destination endpoint (service access point) id.
    pub dst_id: u8,
    /// Message id within the endpoint.
    pub msg_id: u8,
    /// The message payload, without header or FCS.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(dst_id: u8, msg_id: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            dst_id,
            msg_id,
            payload: payload.into(),
        }
    }

    /// The `(dst_id, msg_id)` pair used for dispatch.
    pub fn key(&self) -> (u8, u8) {
        (self.dst_id, self.msg_id)
    }

    /// Unescaped size of this frame (header + payload + FCS).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + FCS_SIZE
    }

    /// Frame check sequence over header and payload.
    pub fn fcs(&self) -> u16 {
        let crc = fcs::crc_update(fcs::INIT, &[self.dst_id, self.msg_id]);
        !fcs::crc_update(crc, &self.payload)
    }

    /// Parse an unescaped frame (header + payload + FCS) and verify its FCS.
    pub fn from_raw(raw: &[u8]) -> Result<Self> {
        if raw.len() < MIN_FRAME_SIZE {
            return Err(FrameError::TooShort { len: raw.len() });
        }

        let residual = fcs::compute(raw);
        if residual != fcs::GOOD_RESIDUAL {
            return Err(FrameError::ChecksumMismatch { residual });
        }

        Ok(Self {
            dst_id: raw[0],
            msg_id: raw[1],
            payload: Bytes::copy_from_slice(&raw[HEADER_SIZE..raw.len() - FCS_SIZE]),
        })
    }
}

/// Encode a frame into its SLIP wire form.
///
/// Wire format (before escaping, between `END` delimiters):
/// ```text
/// ┌─────────┬─────────┬──────────────────┬──────────┐
/// │ Dst ID  │ Msg ID  │ Payload          │ FCS      │
/// │ (1B)    │ (1B)    │ (0..=300B)       │ (2B LE)  │
/// └─────────┴─────────┴──────────────────┴──────────┘
/// ```
pub fn encode_frame(dst_id: u8, msg_id: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let header = [dst_id, msg_id];
    let crc = fcs::crc_update(fcs::INIT, &header);
    let check = !fcs::crc_update(crc, payload);

    // Worst case every byte is escaped.
    dst.reserve(2 + 2 * (HEADER_SIZE + payload.len() + FCS_SIZE));
    dst.put_u8(END);
    escape_into(&header, dst);
    escape_into(payload, dst);
    escape_into(&check.to_le_bytes(), dst);
    dst.put_u8(END);
    Ok(())
}

/// Configuration for frame readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum outgoing payload size in bytes. Default and ceiling: 300.
    pub max_payload_size: usize,
    /// Read timeout applied to link streams.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout applied to link streams.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slip::{SlipDecoder, ESC, ESC_END, ESC_ESC};

    fn decode_one(wire: &[u8]) -> Result<Frame> {
        let mut decoder = SlipDecoder::new(MAX_FRAME_SIZE);
        let mut raw = None;
        let consumed = decoder.decode(wire, |f| raw = Some(f.to_vec()));
        assert_eq!(consumed, wire.len());
        Frame::from_raw(&raw.expect("one frame expected"))
    }

    #[test]
    fn ping_request_wire_bytes() {
        let mut buf = BytesMut::new();
        encode_frame(0x01, 0x01, &[], &mut buf).unwrap();
        assert_eq!(buf.as_ref(), &[0xC0, 0x01, 0x01, 0x16, 0x07, 0xC0]);
    }

    #[test]
    fn end_byte_in_payload_is_escaped() {
        let mut buf = BytesMut::new();
        encode_frame(0x01, 0x02, &[0xC0], &mut buf).unwrap();

        assert_eq!(&buf[3..5], &[ESC, ESC_END]);
        let frame = decode_one(&buf).unwrap();
        assert_eq!(frame.payload.as_ref(), &[0xC0]);
    }

    #[test]
    fn roundtrip_with_reserved_bytes() {
        let payload = [0xC0, 0xDB, 0xDC, 0xDD, 0x00, 0xFF, 0xDB, 0xC0];
        let mut buf = BytesMut::new();
        encode_frame(0xC0, 0xDB, &payload, &mut buf).unwrap();

        let frame = decode_one(&buf).unwrap();
        assert_eq!(frame, Frame::new(0xC0, 0xDB, payload.to_vec()));
    }

    #[test]
    fn escaped_fcs_roundtrips() {
        // Search for a header whose FCS contains a reserved byte.
        let (dst_id, msg_id) = (0..=255u8)
            .flat_map(|d| (0..=255u8).map(move |m| (d, m)))
            .find(|&(d, m)| {
                Frame::new(d, m, Bytes::new())
                    .fcs()
                    .to_le_bytes()
                    .iter()
                    .any(|b| *b == END || *b == ESC)
            })
            .expect("some header must produce a reserved FCS byte");

        let mut buf = BytesMut::new();
        encode_frame(dst_id, msg_id, &[], &mut buf).unwrap();
        assert!(buf.len() > 6);
        assert!(buf[1..buf.len() - 1].iter().all(|b| *b != END));

        let frame = decode_one(&buf).unwrap();
        assert_eq!(frame.key(), (dst_id, msg_id));
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn max_payload_accepted_and_oversize_rejected() {
        let mut buf = BytesMut::new();
        encode_frame(1, 1, &[0xDB; MAX_PAYLOAD], &mut buf).unwrap();
        let frame = decode_one(&buf).unwrap();
        assert_eq!(frame.payload.len(), MAX_PAYLOAD);
        assert_eq!(frame.wire_size(), MAX_FRAME_SIZE);

        let err = encode_frame(1, 1, &[0u8; MAX_PAYLOAD + 1], &mut BytesMut::new()).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 301, max: 300 }));
    }

    #[test]
    fn from_raw_rejects_short_frames() {
        let err = Frame::from_raw(&[0x01, 0x01, 0x16]).unwrap_err();
        assert!(matches!(err, FrameError::TooShort { len: 3 }));
    }

    #[test]
    fn from_raw_rejects_corruption() {
        let err = Frame::from_raw(&[0x01, 0x01, 0x16, 0x08]).unwrap_err();
        assert!(matches!(err, FrameError::ChecksumMismatch { .. }));
    }

    #[test]
    fn frame_fcs_matches_wire() {
        let frame = Frame::new(0x01, 0x02, vec![0x00]);
        let mut raw = vec![0x01, 0x02, 0x00];
        raw.extend_from_slice(&frame.fcs().to_le_bytes());
        assert_eq!(Frame::from_raw(&raw).unwrap(), frame);
        assert_eq!(raw, vec![0x01, 0x02, 0x00, 0xA0, 0xAF]);
    }

    #[test]
    fn reserved_escape_codes_pass_through_unescaped() {
        let mut buf = BytesMut::new();
        encode_frame(0x01, 0x02, &[ESC_END, ESC_ESC], &mut buf).unwrap();
        assert_eq!(&buf[3..5], &[ESC_END, ESC_ESC]);
    }
}
