//! SLIP byte stuffing (RFC 1055 delimiters).

use bytes::{BufMut, BytesMut};
use tracing::{debug, warn};

/// Frame delimiter.
pub const END: u8 = 0xC0;
/// Escape introducer.
pub const ESC: u8 = 0xDB;
/// Escaped form of [`END`].
pub const ESC_END: u8 = 0xDC;
/// Escaped form of [`ESC`].
pub const ESC_ESC: u8 = 0xDD;

/// Append `bytes` to `dst`, escaping `END` and `ESC`.
///
/// Delimiters are not written; callers wrap the frame in [`END`] bytes.
pub fn escape_into(bytes: &[u8], dst: &mut BytesMut) {
    for &byte in bytes {
        match byte {
            END => dst.put_slice(&[ESC, ESC_END]),
            ESC => dst.put_slice(&[ESC, ESC_ESC]),
            other => dst.put_u8(other),
        }
    }
}

/// Streaming SLIP decoder holding one link's receive state.
///
/// The accumulation buffer never grows past `capacity`. When it is full and
/// another byte must be appended, [`SlipDecoder::decode`] stops and reports
/// the bytes consumed so far. If the next call still cannot make room, the
/// partial frame is dropped and input is skipped up to the next [`END`].
#[derive(Debug)]
pub struct SlipDecoder {
    buf: Vec<u8>,
    capacity: usize,
    escaped: bool,
    resync: bool,
    unknown_escapes: u64,
    overflows: u64,
}

impl SlipDecoder {
    /// Create a decoder whose frames are at most `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
            escaped: false,
            resync: false,
            unknown_escapes: 0,
            overflows: 0,
        }
    }

    /// Decode a chunk, calling `on_frame` with each completed, unescaped frame.
    ///
    /// Returns the number of input bytes consumed. Unconsumed bytes must be
    /// presented again on the next call.
    pub fn decode<F: FnMut(&[u8])>(&mut self, data: &[u8], mut on_frame: F) -> usize {
        let mut consumed = 0;

        for &byte in data {
            if self.resync {
                consumed += 1;
                if byte == END {
                    self.resync = false;
                    debug!("resynchronized on frame delimiter");
                }
                continue;
            }

            let value = if self.escaped {
                match byte {
                    ESC_END => END,
                    ESC_ESC => ESC,
                    other => {
                        warn!(byte = other, "ignoring unknown escape sequence");
                        self.unknown_escapes += 1;
                        self.escaped = false;
                        consumed += 1;
                        continue;
                    }
                }
            } else {
                match byte {
                    END => {
                        consumed += 1;
                        if !self.buf.is_empty() {
                            on_frame(&self.buf);
                            self.buf.clear();
                        }
                        continue;
                    }
                    ESC => {
                        self.escaped = true;
                        consumed += 1;
                        continue;
                    }
                    other => other,
                }
            };

            if self.buf.len() >= self.capacity {
                if consumed > 0 {
                    break;
                }
                warn!(
                    capacity = self.capacity,
                    "receive buffer full without delimiter; dropping partial frame"
                );
                self.overflows += 1;
                self.buf.clear();
                self.escaped = false;
                self.resync = true;
                consumed += 1;
                continue;
            }

            self.escaped = false;
            self.buf.push(value);
            consumed += 1;
        }

        consumed
    }

    /// Drop any partial frame and pending escape.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.escaped = false;
        self.resync = false;
    }

    /// Bytes of the current partial frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Maximum frame size this decoder accumulates.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether an escape byte is waiting for its partner.
    pub fn is_escape_pending(&self) -> bool {
        self.escaped
    }

    /// Escape sequences dropped as unknown.
    pub fn unknown_escapes(&self) -> u64 {
        self.unknown_escapes
    }

    /// Partial frames dropped because the buffer filled up.
    pub fn overflows(&self) -> u64 {
        self.overflows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(decoder: &mut SlipDecoder, data: &[u8]) -> Vec<Vec<u8>> {
        let mut frames = Vec::new();
        let mut offset = 0;
        while offset < data.len() {
            offset += decoder.decode(&data[offset..], |f| frames.push(f.to_vec()));
        }
        frames
    }

    fn escaped(bytes: &[u8]) -> Vec<u8> {
        let mut dst = BytesMut::new();
        escape_into(bytes, &mut dst);
        dst.to_vec()
    }

    #[test]
    fn escapes_end_and_esc() {
        assert_eq!(escaped(&[0x01, END, 0x02]), vec![0x01, ESC, ESC_END, 0x02]);
        assert_eq!(escaped(&[ESC]), vec![ESC, ESC_ESC]);
        assert_eq!(escaped(&[ESC_END, ESC_ESC]), vec![ESC_END, ESC_ESC]);
    }

    #[test]
    fn decodes_escaped_bytes() {
        let mut decoder = SlipDecoder::new(16);
        let frames = decode_all(&mut decoder, &[END, 0x01, ESC, ESC_END, ESC, ESC_ESC, END]);
        assert_eq!(frames, vec![vec![0x01, END, ESC]]);
    }

    #[test]
    fn idle_delimiters_emit_nothing() {
        let mut decoder = SlipDecoder::new(16);
        let frames = decode_all(&mut decoder, &[END, END, END, 0x05, END, END]);
        assert_eq!(frames, vec![vec![0x05]]);
    }

    #[test]
    fn escape_pending_across_chunks() {
        let mut decoder = SlipDecoder::new(16);
        let mut frames = Vec::new();

        assert_eq!(decoder.decode(&[END, 0x07, ESC], |f| frames.push(f.to_vec())), 3);
        assert!(decoder.is_escape_pending());
        assert_eq!(decoder.decode(&[ESC_END, END], |f| frames.push(f.to_vec())), 2);

        assert!(!decoder.is_escape_pending());
        assert_eq!(frames, vec![vec![0x07, END]]);
    }

    #[test]
    fn unknown_escape_is_dropped_and_stream_continues() {
        let mut decoder = SlipDecoder::new(16);
        let frames = decode_all(&mut decoder, &[END, 0x01, ESC, 0x42, 0x02, END]);
        assert_eq!(frames, vec![vec![0x01, 0x02]]);
        assert_eq!(decoder.unknown_escapes(), 1);
    }

    #[test]
    fn full_buffer_stops_consuming() {
        let mut decoder = SlipDecoder::new(4);
        let consumed = decoder.decode(&[0x01, 0x02, 0x03, 0x04, 0x05, 0x06], |_| {
            panic!("no frame expected")
        });
        assert_eq!(consumed, 4);
        assert_eq!(decoder.buffered(), 4);
        assert_eq!(decoder.overflows(), 0);
    }

    #[test]
    fn frame_of_exact_capacity_completes() {
        let mut decoder = SlipDecoder::new(4);
        let frames = decode_all(&mut decoder, &[END, 0x01, 0x02, 0x03, 0x04, END]);
        assert_eq!(frames, vec![vec![0x01, 0x02, 0x03, 0x04]]);
        assert_eq!(decoder.overflows(), 0);
    }

    #[test]
    fn overflow_resyncs_on_next_delimiter() {
        let mut decoder = SlipDecoder::new(4);
        let mut stream = vec![END];
        stream.extend_from_slice(&[0xAA; 10]);
        stream.extend_from_slice(&[END, 0x01, 0x02, END]);

        let frames = decode_all(&mut decoder, &stream);
        assert_eq!(frames, vec![vec![0x01, 0x02]]);
        assert_eq!(decoder.overflows(), 1);
    }

    #[test]
    fn reset_drops_partial_state() {
        let mut decoder = SlipDecoder::new(8);
        decoder.decode(&[0x01, 0x02, ESC], |_| {});
        decoder.reset();
        assert_eq!(decoder.buffered(), 0);
        assert!(!decoder.is_escape_pending());
    }
}
