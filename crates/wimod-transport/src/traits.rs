use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;

/// A connected byte link to a radio module. Implements Read + Write.
///
/// This is the fundamental I/O type returned by transport operations.
/// A link is usually split into a read half (owned by the receive path) and a
/// write half (owned by the request path) with [`LinkStream::try_clone`].
pub struct LinkStream {
    inner: LinkStreamInner,
}

enum LinkStreamInner {
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
    #[cfg(feature = "serial")]
    Serial(Box<dyn serialport::SerialPort>),
}

impl Read for LinkStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.read(buf),
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => port.read(buf),
        }
    }
}

impl Write for LinkStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.write(buf),
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.flush(),
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => port.flush(),
        }
    }
}

impl LinkStream {
    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: LinkStreamInner::Unix(stream),
        }
    }

    #[cfg(feature = "serial")]
    pub(crate) fn from_serial(port: Box<dyn serialport::SerialPort>) -> Self {
        Self {
            inner: LinkStreamInner::Serial(port),
        }
    }

    /// Create a connected in-memory link pair (host side, module side).
    #[cfg(unix)]
    pub fn pair() -> Result<(Self, Self)> {
        let (host, module) = std::os::unix::net::UnixStream::pair()?;
        Ok((Self::from_unix(host), Self::from_unix(module)))
    }

    /// Set the read timeout of this handle.
    ///
    /// Serial ports have no "block forever" mode; `None` leaves the port's
    /// current timeout in place.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => set_serial_timeout(port.as_mut(), timeout),
        }
    }

    /// Set the write timeout of this handle.
    ///
    /// Serial handles share one timeout for both directions, so a split link
    /// should set it on the write half only after cloning.
    pub fn set_write_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => set_serial_timeout(port.as_mut(), timeout),
        }
    }

    /// Try to clone this link (creates a new OS handle).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(stream) => {
                let cloned = stream.try_clone()?;
                Ok(Self::from_unix(cloned))
            }
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => {
                let cloned = port.try_clone().map_err(std::io::Error::from)?;
                Ok(Self::from_serial(cloned))
            }
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => "unix-socket",
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(_) => "serial",
        }
    }
}

#[cfg(feature = "serial")]
fn set_serial_timeout(
    port: &mut dyn serialport::SerialPort,
    timeout: Option<Duration>,
) -> Result<()> {
    match timeout {
        Some(timeout) => port
            .set_timeout(timeout)
            .map_err(|err| std::io::Error::from(err).into()),
        None => Ok(()),
    }
}

impl std::fmt::Debug for LinkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            #[cfg(unix)]
            LinkStreamInner::Unix(_) => f.debug_struct("LinkStream").field("type", &"unix").finish(),
            #[cfg(feature = "serial")]
            LinkStreamInner::Serial(port) => f
                .debug_struct("LinkStream")
                .field("type", &"serial")
                .field("name", &port.name())
                .finish(),
        }
    }
}
