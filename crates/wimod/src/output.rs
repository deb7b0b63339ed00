use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use wimod_frame::{endpoint_name, message_name, Frame};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    dst_id: u8,
    endpoint: &'a str,
    msg_id: u8,
    message: Option<&'a str>,
    payload_size: usize,
    payload: String,
    timestamp: String,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    let message = message_name(frame.dst_id, frame.msg_id);
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                dst_id: frame.dst_id,
                endpoint: endpoint_name(frame.dst_id),
                msg_id: frame.msg_id,
                message,
                payload_size: frame.payload.len(),
                payload: hex(frame.payload.as_ref()),
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ENDPOINT", "MESSAGE", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("{} ({:#04x})", endpoint_name(frame.dst_id), frame.dst_id),
                    message_label(message, frame.msg_id),
                    frame.payload.len().to_string(),
                    hex(frame.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "dst={:#04x} ({}) msg={} size={} payload={}",
                frame.dst_id,
                endpoint_name(frame.dst_id),
                message_label(message, frame.msg_id),
                frame.payload.len(),
                hex(frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

/// Space-separated lowercase hex.
pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn message_label(name: Option<&str>, msg_id: u8) -> String {
    match name {
        Some(name) => format!("{name} ({msg_id:#04x})"),
        None => format!("{msg_id:#04x}"),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_formatting() {
        assert_eq!(hex(&[0xC0, 0x01, 0x0A]), "c0 01 0a");
        assert_eq!(hex(&[]), "");
    }

    #[test]
    fn message_labels() {
        assert_eq!(message_label(Some("PING_RSP"), 0x02), "PING_RSP (0x02)");
        assert_eq!(message_label(None, 0x7F), "0x7f");
    }
}
