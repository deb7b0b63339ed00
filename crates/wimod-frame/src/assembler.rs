use tracing::{debug, trace};

use crate::codec::{Frame, MAX_FRAME_SIZE};
use crate::error::FrameError;
use crate::slip::SlipDecoder;

/// Counters describing what a link's receive path has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// Frames that passed the FCS check.
    pub frames: u64,
    /// Frames dropped for a bad FCS.
    pub crc_errors: u64,
    /// Frames dropped for being shorter than header + FCS.
    pub runts: u64,
    /// Unknown escape sequences skipped.
    pub unknown_escapes: u64,
    /// Partial frames dropped because the buffer filled up.
    pub overflows: u64,
}

/// Reassembles verified frames from arbitrarily chunked link input.
///
/// One assembler per link. Calls must be sequential; the state carries over
/// between chunks so a boundary may fall anywhere, including between an
/// escape byte and its partner or inside the FCS.
#[derive(Debug)]
pub struct ReceiveAssembler {
    decoder: SlipDecoder,
    frames: u64,
    crc_errors: u64,
    runts: u64,
}

impl ReceiveAssembler {
    /// Create an assembler sized for the largest HCI frame.
    pub fn new() -> Self {
        Self::with_capacity(MAX_FRAME_SIZE)
    }

    /// Create an assembler with an explicit frame buffer size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            decoder: SlipDecoder::new(capacity),
            frames: 0,
            crc_errors: 0,
            runts: 0,
        }
    }

    /// Feed a chunk of link bytes; `on_frame` receives each verified frame.
    ///
    /// Returns how many bytes were consumed. Anything past that must be fed
    /// again once the caller is ready; short frames and FCS failures are
    /// dropped here and never reach `on_frame`.
    pub fn receive<F: FnMut(Frame)>(&mut self, data: &[u8], mut on_frame: F) -> usize {
        let frames = &mut self.frames;
        let crc_errors = &mut self.crc_errors;
        let runts = &mut self.runts;

        let consumed = self.decoder.decode(data, |raw| match Frame::from_raw(raw) {
            Ok(frame) => {
                *frames += 1;
                trace!(
                    dst_id = frame.dst_id,
                    msg_id = frame.msg_id,
                    len = frame.payload.len(),
                    "frame received"
                );
                on_frame(frame);
            }
            Err(FrameError::TooShort { len }) => {
                *runts += 1;
                debug!(len, "discarding frame shorter than header and FCS");
            }
            Err(err) => {
                *crc_errors += 1;
                debug!(len = raw.len(), error = %err, "discarding frame with wrong checksum");
            }
        });

        trace!(received = data.len(), consumed, "processed link chunk");
        consumed
    }

    /// Snapshot of the receive counters.
    pub fn stats(&self) -> ReceiveStats {
        ReceiveStats {
            frames: self.frames,
            crc_errors: self.crc_errors,
            runts: self.runts,
            unknown_escapes: self.decoder.unknown_escapes(),
            overflows: self.decoder.overflows(),
        }
    }

    /// Drop any partially received frame.
    pub fn reset(&mut self) {
        self.decoder.reset();
    }

    /// Bytes of the partial frame currently held.
    pub fn buffered(&self) -> usize {
        self.decoder.buffered()
    }
}

impl Default for ReceiveAssembler {
    fn default() -> Self {
        Self::new()
    }
}
