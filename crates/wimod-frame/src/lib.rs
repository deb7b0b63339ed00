//! SLIP framing with CRC-CCITT check sequence for WiMOD HCI links.
//!
//! Every HCI message travels as:
//! - A 1-byte destination endpoint id and a 1-byte message id
//! - Up to 300 payload bytes
//! - A 2-byte little-endian frame check sequence (CRC-CCITT, X.25)
//!
//! wrapped in SLIP delimiters and escapes. Incoming bytes may arrive in any
//! chunking; [`ReceiveAssembler`] turns them back into verified frames.

pub mod assembler;
#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod error;
pub mod fcs;
pub mod msg;
pub mod reader;
pub mod slip;
pub mod writer;

pub use assembler::{ReceiveAssembler, ReceiveStats};
#[cfg(feature = "async")]
pub use async_codec::HciCodec;
pub use codec::{
    encode_frame, Frame, FrameConfig, FCS_SIZE, HEADER_SIZE, MAX_FRAME_SIZE, MAX_PAYLOAD,
    MIN_FRAME_SIZE,
};
pub use error::{FrameError, Result};
pub use msg::{devmgmt, endpoint_name, message_name, DEVMGMT_ID};
pub use reader::FrameReader;
pub use slip::SlipDecoder;
pub use writer::FrameWriter;
