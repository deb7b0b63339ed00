/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds the HCI payload limit.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// A decoded frame is shorter than address bytes plus check sequence.
    #[error("frame too short ({len} bytes, min 4)")]
    TooShort { len: usize },

    /// The frame check sequence did not reduce to the good residual.
    #[error("frame check sequence mismatch (residual {residual:#06x})")]
    ChecksumMismatch { residual: u16 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The link was closed.
    #[error("link closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
