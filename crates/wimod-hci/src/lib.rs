//! Request/response sessions over a WiMOD HCI link.
//!
//! A [`Session`] sends request frames and blocks the caller until the
//! matching response arrives or a deadline passes. Incoming bytes are
//! reassembled on a dedicated receive thread and handed to the
//! [`DispatchRegistry`], which wakes the one caller waiting for that
//! `(dst_id, msg_id)` pair.

pub mod connector;
pub mod devmgmt;
pub mod dispatch;
pub mod emulator;
pub mod error;
pub mod session;
pub mod waiter;

#[cfg(feature = "serial")]
pub use connector::open_serial;
pub use connector::{connect, connect_with_config};
pub use devmgmt::{get_device_info, ping, ping_latency, DeviceInfo, DEVICE_INFO_LEN};
pub use dispatch::{DispatchRegistry, EntryId, Handler};
pub use emulator::{Emulator, EmulatorConfig};
pub use error::{HciError, Result};
pub use session::{
    spawn_receiver, Receiver, ReceiverHandle, Session, SessionConfig, DEFAULT_READ_TIMEOUT,
    DEFAULT_WRITE_TIMEOUT,
};
pub use waiter::PendingWaiter;
