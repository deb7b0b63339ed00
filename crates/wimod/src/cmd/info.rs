use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wimod_hci::{devmgmt, DeviceInfo};

use crate::cmd::{open_session, parse_timeout, InfoArgs};
use crate::exit::{hci_error, CliResult, SUCCESS};
use crate::output::{hex, print_json, OutputFormat};

#[derive(Serialize)]
struct InfoOutput {
    device: String,
    transport: &'static str,
    device_info: DeviceInfo,
    ping_latency_ms: Option<f64>,
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_timeout(&args.timeout)?;
    let (session, receiver) = open_session(&args.device)?;
    let transport = if args.device.socket { "unix-socket" } else { "serial" };

    let device_info = devmgmt::get_device_info(&session, timeout)
        .map_err(|err| hci_error("get device info failed", err))?;

    let ping_latency_ms = devmgmt::ping_latency(&session, timeout)
        .ok()
        .map(|d| (d.as_secs_f64() * 1000.0 * 100.0).round() / 100.0);

    drop(session);
    receiver.shutdown();

    let out = InfoOutput {
        device: args.device.device.display().to_string(),
        transport,
        device_info,
        ping_latency_ms,
    };

    print_info(&out, format);
    Ok(SUCCESS)
}

fn print_info(out: &InfoOutput, format: OutputFormat) {
    let info = &out.device_info;
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["Device".to_string(), out.device.clone()])
                .add_row(vec!["Module type".to_string(), format!("{:#04x}", info.module_type())])
                .add_row(vec![
                    "Device address".to_string(),
                    format!("{:#010x}", info.device_address()),
                ])
                .add_row(vec!["Device id".to_string(), format!("{:#010x}", info.device_id())])
                .add_row(vec!["Ping".to_string(), latency_label(out.ping_latency_ms)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Device Info:");
            println!("  Device:           {} ({})", out.device, out.transport);
            println!("  Module type:      {:#04x}", info.module_type());
            println!("  Device address:   {:#010x}", info.device_address());
            println!("  Device id:        {:#010x}", info.device_id());
            println!("  Ping:             {}", latency_label(out.ping_latency_ms));
        }
        OutputFormat::Raw => println!("{}", hex(info.as_bytes())),
    }
}

fn latency_label(latency_ms: Option<f64>) -> String {
    match latency_ms {
        Some(ms) => format!("{ms:.2}ms"),
        None => "unavailable".to_string(),
    }
}
