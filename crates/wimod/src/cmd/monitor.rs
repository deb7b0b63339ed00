use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wimod_frame::{FrameConfig, FrameError, FrameReader};

use crate::cmd::{open_link, MonitorArgs};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let link = open_link(&args.device)?;
    let config = FrameConfig {
        read_timeout: Some(POLL_INTERVAL),
        ..FrameConfig::default()
    };
    let mut reader =
        FrameReader::with_config_link(link, config).map_err(|err| frame_error("link setup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::Io(err))
                if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
            {
                continue
            }
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => return Err(frame_error("receive failed", err)),
        };

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = reader.stats();
    tracing::info!(
        frames = stats.frames,
        crc_errors = stats.crc_errors,
        runts = stats.runts,
        unknown_escapes = stats.unknown_escapes,
        overflows = stats.overflows,
        "monitor stopped"
    );
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
