//! Device management commands.

use std::io::Write;
use std::time::{Duration, Instant};

use bytes::Bytes;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use wimod_frame::devmgmt::{
    GET_DEVICE_INFO_REQ, GET_DEVICE_INFO_RSP, PING_REQ, PING_RSP, STATUS_OK,
};
use wimod_frame::{Frame, DEVMGMT_ID};

use crate::error::{HciError, Result};
use crate::session::Session;

/// Length of the device info block following the status byte.
pub const DEVICE_INFO_LEN: usize = 9;

/// Identity block reported by `GET_DEVICE_INFO`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceInfo {
    bytes: [u8; DEVICE_INFO_LEN],
}

impl DeviceInfo {
    pub fn from_bytes(bytes: [u8; DEVICE_INFO_LEN]) -> Self {
        Self { bytes }
    }

    pub fn new(module_type: u8, device_address: u32, device_id: u32) -> Self {
        let mut bytes = [0u8; DEVICE_INFO_LEN];
        bytes[0] = module_type;
        bytes[1..5].copy_from_slice(&device_address.to_le_bytes());
        bytes[5..9].copy_from_slice(&device_id.to_le_bytes());
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; DEVICE_INFO_LEN] {
        &self.bytes
    }

    pub fn module_type(&self) -> u8 {
        self.bytes[0]
    }

    pub fn device_address(&self) -> u32 {
        u32::from_le_bytes([self.bytes[1], self.bytes[2], self.bytes[3], self.bytes[4]])
    }

    pub fn device_id(&self) -> u32 {
        u32::from_le_bytes([self.bytes[5], self.bytes[6], self.bytes[7], self.bytes[8]])
    }
}

impl Serialize for DeviceInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DeviceInfo", 4)?;
        state.serialize_field("module_type", &self.module_type())?;
        state.serialize_field("device_address", &self.device_address())?;
        state.serialize_field("device_id", &self.device_id())?;
        state.serialize_field("raw", &self.bytes)?;
        state.end()
    }
}

/// Check that the module answered `PING_REQ` with status ok.
pub fn ping<W: Write>(session: &Session<W>, timeout: Duration) -> Result<()> {
    let payload = session.request(
        &Frame::new(DEVMGMT_ID, PING_REQ, Bytes::new()),
        (DEVMGMT_ID, PING_RSP),
        timeout,
    )?;
    check_status("ping", &payload)
}

/// Ping and measure the round trip.
pub fn ping_latency<W: Write>(session: &Session<W>, timeout: Duration) -> Result<Duration> {
    let start = Instant::now();
    ping(session, timeout)?;
    Ok(start.elapsed())
}

/// Query the module's identity block.
pub fn get_device_info<W: Write>(session: &Session<W>, timeout: Duration) -> Result<DeviceInfo> {
    let payload = session.request(
        &Frame::new(DEVMGMT_ID, GET_DEVICE_INFO_REQ, Bytes::new()),
        (DEVMGMT_ID, GET_DEVICE_INFO_RSP),
        timeout,
    )?;
    check_status("get-device-info", &payload)?;

    let expected = 1 + DEVICE_INFO_LEN;
    let Some(info) = payload.get(1..expected) else {
        return Err(HciError::PayloadLength {
            command: "get-device-info",
            expected,
            actual: payload.len(),
        });
    };

    let mut bytes = [0u8; DEVICE_INFO_LEN];
    bytes.copy_from_slice(info);
    Ok(DeviceInfo::from_bytes(bytes))
}

fn check_status(command: &'static str, payload: &[u8]) -> Result<()> {
    match payload.first() {
        None => Err(HciError::PayloadLength {
            command,
            expected: 1,
            actual: 0,
        }),
        Some(&STATUS_OK) => Ok(()),
        Some(&status) => Err(HciError::Status { command, status }),
    }
}
