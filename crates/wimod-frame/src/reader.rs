use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use wimod_transport::LinkStream;

use crate::assembler::{ReceiveAssembler, ReceiveStats};
use crate::codec::{Frame, FrameConfig};
use crate::error::{FrameError, Result};

const READ_CHUNK_SIZE: usize = 512;

/// Reads verified frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
/// Link noise (bad FCS, runts, unknown escapes) is skipped, not reported.
pub struct FrameReader<T> {
    inner: T,
    assembler: ReceiveAssembler,
    ready: VecDeque<Frame>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            assembler: ReceiveAssembler::new(),
            ready: VecDeque::new(),
            config,
        }
    }

    /// Read the next verified frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached. A read
    /// timeout on the underlying stream surfaces as `FrameError::Io`; the
    /// partial frame is kept, so calling again simply resumes.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.feed(&chunk[..read]);
        }
    }

    fn feed(&mut self, mut chunk: &[u8]) {
        while !chunk.is_empty() {
            let ready = &mut self.ready;
            let consumed = self.assembler.receive(chunk, |frame| ready.push_back(frame));
            if consumed == 0 {
                break;
            }
            chunk = &chunk[consumed..];
        }
    }

    /// Receive counters for this link.
    pub fn stats(&self) -> ReceiveStats {
        self.assembler.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl FrameReader<LinkStream> {
    /// Create a frame reader for a `LinkStream` and apply the read timeout from config.
    pub fn with_config_link(mut inner: LinkStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: wimod_transport::TransportError) -> FrameError {
    match err {
        wimod_transport::TransportError::Io(io)
        | wimod_transport::TransportError::Accept(io) => FrameError::Io(io),
        wimod_transport::TransportError::Bind { source, .. }
        | wimod_transport::TransportError::Connect { source, .. } => FrameError::Io(source),
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
