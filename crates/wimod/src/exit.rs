use std::fmt;
use std::io;

use wimod_frame::FrameError;
use wimod_hci::HciError;
use wimod_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::BrokenPipe
        | io::ErrorKind::ConnectionReset => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        TransportError::PathTooLong { .. } => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(TRANSPORT_ERROR, format!("{context}: {err}")),
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}

pub fn hci_error(context: &str, err: HciError) -> CliError {
    match err {
        HciError::Transport(err) => transport_error(context, err),
        HciError::Frame(err) => frame_error(context, err),
        HciError::Timeout(_) => CliError::new(TIMEOUT, format!("{context}: {err}")),
        other if other.is_protocol() => CliError::new(DATA_INVALID, format!("{context}: {other}")),
        other => CliError::new(FAILURE, format!("{context}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn maps_hci_errors_to_exit_codes() {
        let timeout = hci_error("ping", HciError::Timeout(Duration::from_secs(1)));
        assert_eq!(timeout.code, TIMEOUT);

        let status = hci_error(
            "ping",
            HciError::Status {
                command: "ping",
                status: 0x01,
            },
        );
        assert_eq!(status.code, DATA_INVALID);
        assert!(status.message.starts_with("ping: "));

        let missing = hci_error(
            "connect",
            HciError::Transport(TransportError::Connect {
                path: "/nonexistent.sock".into(),
                source: io::Error::from(io::ErrorKind::NotFound),
            }),
        );
        assert_eq!(missing.code, TRANSPORT_ERROR);

        let closed = hci_error("ping", HciError::Frame(FrameError::ConnectionClosed));
        assert_eq!(closed.code, TRANSPORT_ERROR);
    }
}
