use std::time::Duration;

use clap::{Args, Subcommand};
use std::path::PathBuf;
use wimod_hci::{ReceiverHandle, Session, SessionConfig};
use wimod_transport::LinkStream;

use crate::exit::{hci_error, transport_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod emulate;
pub mod encode;
pub mod info;
pub mod monitor;
pub mod ping;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that a module answers.
    Ping(PingArgs),
    /// Query device info and ping latency.
    Info(InfoArgs),
    /// Print every verified frame received from a module.
    Monitor(MonitorArgs),
    /// Print the wire encoding of a frame.
    Encode(EncodeArgs),
    /// Emulate a module on a Unix socket.
    Emulate(EmulateArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ping(args) => ping::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Emulate(args) => emulate::run(args),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DeviceArgs {
    /// Serial port path, or Unix socket path with --socket.
    #[arg(env = "WIMOD_DEVICE")]
    pub device: PathBuf,
    /// Treat DEVICE as a Unix socket bridged to a module.
    #[arg(long)]
    pub socket: bool,
    /// Serial baud rate.
    #[arg(long, default_value_t = 115_200)]
    pub baud: u32,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Response timeout (e.g. 3s, 500ms).
    #[arg(long, default_value = "3s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Response timeout (e.g. 3s, 500ms).
    #[arg(long, default_value = "3s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub device: DeviceArgs,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Destination endpoint id (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_u8)]
    pub dst_id: u8,
    /// Message id (decimal or 0x-prefixed hex).
    #[arg(value_parser = parse_u8)]
    pub msg_id: u8,
    /// Payload as hex digits, spaces allowed (e.g. "00 c0 db").
    #[arg(long, default_value = "")]
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct EmulateArgs {
    /// Socket path to bind.
    pub path: PathBuf,
    /// Module type reported by device info.
    #[arg(long, default_value = "0x90", value_parser = parse_u8)]
    pub module_type: u8,
    /// Device address reported by device info.
    #[arg(long, default_value = "1", value_parser = parse_u32)]
    pub address: u32,
    /// Device id reported by device info.
    #[arg(long, default_value = "1", value_parser = parse_u32)]
    pub device_id: u32,
    /// Status byte put in every response.
    #[arg(long, default_value = "0", value_parser = parse_u8)]
    pub status: u8,
    /// Exit after serving N connections.
    #[arg(long)]
    pub max_connections: Option<usize>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn open_link(args: &DeviceArgs) -> CliResult<LinkStream> {
    if args.socket {
        #[cfg(unix)]
        {
            return wimod_transport::UnixLinkListener::connect(&args.device)
                .map_err(|err| transport_error("connect failed", err));
        }
        #[cfg(not(unix))]
        {
            return Err(CliError::new(USAGE, "--socket requires a unix platform"));
        }
    }

    #[cfg(feature = "serial")]
    {
        let config = wimod_transport::SerialConfig {
            baud_rate: args.baud,
            ..wimod_transport::SerialConfig::default()
        };
        let path = args.device.to_string_lossy();
        wimod_transport::open_serial(&path, &config)
            .map_err(|err| transport_error("open serial port failed", err))
    }

    #[cfg(not(feature = "serial"))]
    {
        Err(CliError::new(
            USAGE,
            format!(
                "serial support not compiled in; use --socket for {} (baud {})",
                args.device.display(),
                args.baud
            ),
        ))
    }
}

pub(crate) fn open_session(args: &DeviceArgs) -> CliResult<(Session<LinkStream>, ReceiverHandle)> {
    let link = open_link(args)?;
    Session::open(link, SessionConfig::default()).map_err(|err| hci_error("session setup failed", err))
}

/// Upper bound for `--timeout`.
const MAX_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);

pub(crate) fn parse_timeout(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "timeout must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid timeout value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "timeout must be greater than zero"));
    }

    let timeout = if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    };
    if timeout > MAX_TIMEOUT {
        return Err(CliError::new(
            USAGE,
            format!("timeout must not exceed {}s", MAX_TIMEOUT.as_secs()),
        ));
    }
    Ok(timeout)
}

fn parse_u8(input: &str) -> Result<u8, String> {
    let value = parse_u32(input)?;
    u8::try_from(value).map_err(|_| format!("{input} does not fit in one byte"))
}

fn parse_u32(input: &str) -> Result<u32, String> {
    let input = input.trim();
    let parsed = match input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        Some(digits) => u32::from_str_radix(digits, 16),
        None => input.parse(),
    };
    parsed.map_err(|_| format!("invalid number: {input}"))
}

pub(crate) fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let digits: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        return Err(CliError::new(USAGE, "hex payload has an odd number of digits"));
    }

    if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CliError::new(USAGE, format!("invalid hex digit: {bad:?}")));
    }

    digits
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair)
                .map_err(|_| CliError::new(USAGE, "hex payload is not ASCII"))?;
            u8::from_str_radix(pair, 16)
                .map_err(|_| CliError::new(USAGE, format!("invalid hex byte: {pair}")))
        })
        .collect()
}
