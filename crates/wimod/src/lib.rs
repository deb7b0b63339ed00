//! Host-side engine for WiMOD radio modules speaking HCI over a serial link.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte links (serial ports, Unix sockets)
//! - [`frame`]: SLIP framing, CRC-CCITT check sequence, frame reassembly
//! - [`hci`]: Request/response sessions and device management (behind `hci` feature)

/// Re-export transport types.
pub mod transport {
    pub use wimod_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use wimod_frame::*;
}

/// Re-export session types (requires `hci` feature).
#[cfg(feature = "hci")]
pub mod hci {
    pub use wimod_hci::*;
}
