//! Minimal module emulator answering device management requests.
//!
//! Used for loopback testing of hosts without hardware attached.

#[cfg(unix)]
use std::path::Path;

use tracing::debug;
use wimod_frame::devmgmt::{
    GET_DEVICE_INFO_REQ, GET_DEVICE_INFO_RSP, PING_REQ, PING_RSP, STATUS_OK,
};
use wimod_frame::{Frame, FrameError, FrameReader, FrameWriter, DEVMGMT_ID};
#[cfg(unix)]
use wimod_transport::UnixLinkListener;
use wimod_transport::LinkStream;

use crate::devmgmt::DeviceInfo;
use crate::error::Result;

/// What the emulated module reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatorConfig {
    pub info: DeviceInfo,
    /// Status byte put in every response.
    pub status: u8,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            info: DeviceInfo::new(0x90, 0x0000_0001, 0x0000_0001),
            status: STATUS_OK,
        }
    }
}

/// Answers `PING_REQ` and `GET_DEVICE_INFO_REQ`; everything else is ignored.
#[derive(Debug, Clone, Default)]
pub struct Emulator {
    config: EmulatorConfig,
}

impl Emulator {
    pub fn new(config: EmulatorConfig) -> Self {
        Self { config }
    }

    /// Build the response for `request`, if the module would send one.
    pub fn respond(&self, request: &Frame) -> Option<Frame> {
        let status = self.config.status;
        match request.key() {
            (DEVMGMT_ID, PING_REQ) => Some(Frame::new(DEVMGMT_ID, PING_RSP, vec![status])),
            (DEVMGMT_ID, GET_DEVICE_INFO_REQ) => {
                let mut payload = vec![status];
                if status == STATUS_OK {
                    payload.extend_from_slice(self.config.info.as_bytes());
                }
                Some(Frame::new(DEVMGMT_ID, GET_DEVICE_INFO_RSP, payload))
            }
            (dst_id, msg_id) => {
                debug!(dst_id, msg_id, "emulator ignoring unsupported request");
                None
            }
        }
    }

    /// Serve one link until the host disconnects. Returns requests answered.
    pub fn serve(&self, stream: LinkStream) -> Result<u64> {
        let mut reader = FrameReader::new(stream.try_clone()?);
        let mut writer = FrameWriter::new(stream);
        let mut answered = 0u64;

        loop {
            let request = match reader.read_frame() {
                Ok(frame) => frame,
                Err(FrameError::ConnectionClosed) => break,
                Err(err) => return Err(err.into()),
            };

            if let Some(response) = self.respond(&request) {
                writer.write_frame(&response)?;
                answered += 1;
            }
        }

        debug!(answered, stats = ?reader.stats(), "emulator link closed");
        Ok(answered)
    }

    /// Accept and serve connections on a Unix socket.
    ///
    /// Connections are served one at a time. Stops after `max_connections`
    /// when given.
    #[cfg(unix)]
    pub fn serve_socket(&self, path: impl AsRef<Path>, max_connections: Option<usize>) -> Result<()> {
        let listener = UnixLinkListener::bind(path)?;
        tracing::info!(path = %listener.path().display(), "emulator listening");

        let mut served = 0usize;
        while max_connections.is_none_or(|max| served < max) {
            let stream = listener.accept()?;
            if let Err(err) = self.serve(stream) {
                tracing::warn!(error = %err, "emulator connection failed");
            }
            served += 1;
        }
        Ok(())
    }
}
