//! Byte-link transports for talking to a WiMOD radio module.
//!
//! The module speaks HCI over a plain byte stream. This crate only moves bytes:
//! - Serial ports (behind the `serial` feature)
//! - Unix domain sockets (bridged ptys, emulators, tests)
//!
//! This is the lowest layer of wimod. Everything else builds on top of
//! the [`LinkStream`] type provided here.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod uds;

#[cfg(feature = "serial")]
pub mod serial;

pub use error::{Result, TransportError};
pub use traits::LinkStream;

#[cfg(unix)]
pub use uds::UnixLinkListener;

#[cfg(feature = "serial")]
pub use serial::{open_serial, SerialConfig, DEFAULT_BAUD_RATE};
