use bytes::BytesMut;
use serde::Serialize;
use wimod_frame::{encode_frame, message_name, Frame};

use crate::cmd::{parse_hex, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{hex, print_json, print_raw, OutputFormat};

#[derive(Serialize)]
struct EncodeOutput {
    dst_id: u8,
    msg_id: u8,
    message: Option<&'static str>,
    payload_size: usize,
    fcs: String,
    wire_size: usize,
    wire: String,
}

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = parse_hex(&args.hex)?;

    let mut wire = BytesMut::new();
    encode_frame(args.dst_id, args.msg_id, &payload, &mut wire)
        .map_err(|err| frame_error("encode failed", err))?;

    let fcs = Frame::new(args.dst_id, args.msg_id, payload.clone()).fcs();
    let out = EncodeOutput {
        dst_id: args.dst_id,
        msg_id: args.msg_id,
        message: message_name(args.dst_id, args.msg_id),
        payload_size: payload.len(),
        fcs: format!("{fcs:#06x}"),
        wire_size: wire.len(),
        wire: hex(&wire),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("{}", out.wire);
            println!("fcs={} wire_size={}", out.fcs, out.wire_size);
        }
        OutputFormat::Raw => print_raw(&wire),
    }
    Ok(SUCCESS)
}
