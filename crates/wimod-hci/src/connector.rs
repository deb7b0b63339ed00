use std::path::Path;

use wimod_transport::LinkStream;
#[cfg(unix)]
use wimod_transport::UnixLinkListener;

use crate::error::Result;
use crate::session::{ReceiverHandle, Session, SessionConfig};

/// Connect to a module bridged onto a Unix socket.
pub fn connect(path: impl AsRef<Path>) -> Result<(Session<LinkStream>, ReceiverHandle)> {
    connect_with_config(path, SessionConfig::default())
}

/// Connect with explicit session configuration.
pub fn connect_with_config(
    path: impl AsRef<Path>,
    config: SessionConfig,
) -> Result<(Session<LinkStream>, ReceiverHandle)> {
    #[cfg(not(unix))]
    {
        let _ = config;
        let path = path.as_ref().to_path_buf();
        return Err(wimod_transport::TransportError::Connect {
            path,
            source: std::io::Error::new(
                std::io::ErrorKind::Unsupported,
                "unix socket links require a unix platform",
            ),
        }
        .into());
    }

    #[cfg(unix)]
    {
        let stream = UnixLinkListener::connect(path)?;
        Session::open(stream, config)
    }
}

/// Open a module attached to a serial port.
#[cfg(feature = "serial")]
pub fn open_serial(
    path: &str,
    serial: &wimod_transport::SerialConfig,
    config: SessionConfig,
) -> Result<(Session<LinkStream>, ReceiverHandle)> {
    let stream = wimod_transport::open_serial(path, serial)?;
    Session::open(stream, config)
}
