use serde::Serialize;
use wimod_hci::devmgmt;

use crate::cmd::{open_session, parse_timeout, PingArgs};
use crate::exit::{hci_error, CliResult, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct PingOutput {
    device: String,
    alive: bool,
    latency_ms: f64,
}

pub fn run(args: PingArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_timeout(&args.timeout)?;
    let (session, receiver) = open_session(&args.device)?;

    let latency =
        devmgmt::ping_latency(&session, timeout).map_err(|err| hci_error("ping failed", err))?;
    drop(session);
    let stats = receiver.shutdown();
    tracing::debug!(?stats, "link receive counters");

    let out = PingOutput {
        device: args.device.device.display().to_string(),
        alive: true,
        latency_ms: (latency.as_secs_f64() * 1000.0 * 100.0).round() / 100.0,
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{}: alive ({:.2}ms)", out.device, out.latency_ms);
        }
        OutputFormat::Raw => println!("{:.2}", out.latency_ms),
    }
    Ok(SUCCESS)
}
