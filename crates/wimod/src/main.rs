mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "wimod", version, about = "WiMOD HCI host tool")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ping_over_socket() {
        let cli = Cli::try_parse_from([
            "wimod",
            "ping",
            "/tmp/module.sock",
            "--socket",
            "--timeout",
            "500ms",
        ])
        .expect("ping args should parse");

        match cli.command {
            Command::Ping(args) => {
                assert!(args.device.socket);
                assert_eq!(args.timeout, "500ms");
                assert_eq!(args.device.baud, 115_200);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_encode_with_hex_ids() {
        let cli = Cli::try_parse_from(["wimod", "encode", "0x01", "3", "--hex", "c0 db"])
            .expect("encode args should parse");
        match cli.command {
            Command::Encode(args) => {
                assert_eq!((args.dst_id, args.msg_id), (0x01, 0x03));
                assert_eq!(args.hex, "c0 db");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_out_of_range_endpoint() {
        let err = Cli::try_parse_from(["wimod", "encode", "256", "1"])
            .expect_err("256 should not parse as a byte");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_emulate_defaults() {
        let cli = Cli::try_parse_from(["wimod", "emulate", "/tmp/module.sock"])
            .expect("emulate args should parse");
        match cli.command {
            Command::Emulate(args) => {
                assert_eq!(args.module_type, 0x90);
                assert_eq!(args.status, 0);
                assert!(args.max_connections.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
