use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, StopBits};
use tracing::info;

use crate::error::{Result, TransportError};
use crate::traits::LinkStream;

/// Line speed WiMOD modules use out of the box.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial line settings for a module link.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Baud rate. Default: 115200.
    pub baud_rate: u32,
    /// Initial read/write timeout of the opened handle.
    pub timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: Duration::from_millis(100),
        }
    }
}

/// Open a serial port as a link: 8N1, no flow control.
pub fn open_serial(path: &str, config: &SerialConfig) -> Result<LinkStream> {
    let port = serialport::new(path, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.timeout)
        .open()
        .map_err(|source| TransportError::Serial {
            path: path.to_string(),
            source,
        })?;

    info!(path, baud = config.baud_rate, "opened serial link");
    Ok(LinkStream::from_serial(port))
}
