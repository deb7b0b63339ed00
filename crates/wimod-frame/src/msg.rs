//! Known HCI endpoint and message ids.
//!
//! Only the device management endpoint is catalogued here; other endpoints
//! are carried opaquely.

/// Device management endpoint.
pub const DEVMGMT_ID: u8 = 0x01;

/// Device management message ids and status codes.
pub mod devmgmt {
    pub const PING_REQ: u8 = 0x01;
    pub const PING_RSP: u8 = 0x02;
    pub const GET_DEVICE_INFO_REQ: u8 = 0x03;
    pub const GET_DEVICE_INFO_RSP: u8 = 0x04;

    pub const STATUS_OK: u8 = 0x00;
    pub const STATUS_ERROR: u8 = 0x01;
    pub const STATUS_CMD_NOT_SUPPORTED: u8 = 0x02;
    pub const STATUS_WRONG_PARAMETER: u8 = 0x03;
    pub const STATUS_WRONG_DEVICE_MODE: u8 = 0x04;

    /// Human-readable name for a device management status byte.
    pub fn status_name(status: u8) -> &'static str {
        match status {
            STATUS_OK => "ok",
            STATUS_ERROR => "error",
            STATUS_CMD_NOT_SUPPORTED => "command not supported",
            STATUS_WRONG_PARAMETER => "wrong parameter",
            STATUS_WRONG_DEVICE_MODE => "wrong device mode",
            _ => "unknown",
        }
    }
}

/// Returns a human-readable name for an endpoint id.
pub fn endpoint_name(dst_id: u8) -> &'static str {
    match dst_id {
        DEVMGMT_ID => "DEVMGMT",
        _ => "UNKNOWN",
    }
}

/// Returns the name of a known message, if any.
pub fn message_name(dst_id: u8, msg_id: u8) -> Option<&'static str> {
    match (dst_id, msg_id) {
        (DEVMGMT_ID, devmgmt::PING_REQ) => Some("PING_REQ"),
        (DEVMGMT_ID, devmgmt::PING_RSP) => Some("PING_RSP"),
        (DEVMGMT_ID, devmgmt::GET_DEVICE_INFO_REQ) => Some("GET_DEVICE_INFO_REQ"),
        (DEVMGMT_ID, devmgmt::GET_DEVICE_INFO_RSP) => Some("GET_DEVICE_INFO_RSP"),
        _ => None,
    }
}
