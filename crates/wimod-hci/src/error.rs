use wimod_frame::devmgmt::status_name;

/// Errors that can occur in HCI session operations.
#[derive(Debug, thiserror::Error)]
pub enum HciError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] wimod_transport::TransportError),

    /// Frame-level error, including failed request writes.
    #[error("frame error: {0}")]
    Frame(#[from] wimod_frame::FrameError),

    /// No matching response arrived before the deadline.
    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A response payload had the wrong length for its command.
    #[error("{command}: response payload too short ({actual} bytes, expected at least {expected})")]
    PayloadLength {
        command: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The module answered with a non-ok status byte.
    #[error("{command}: module returned status {status:#04x} ({})", describe(.status))]
    Status { command: &'static str, status: u8 },
}

impl HciError {
    /// True when the module answered but the answer was unusable.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Self::PayloadLength { .. } | Self::Status { .. })
    }
}

fn describe(status: &u8) -> &'static str {
    status_name(*status)
}

pub type Result<T> = std::result::Result<T, HciError>;
