use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use xbeeprims_radio::RadioError;

use crate::cmd::{open_radio, parse_number, MonitorArgs};
use crate::exit::{radio_error, CliError, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const RECEIVE_SLICE: Duration = Duration::from_millis(250);

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let kinds = parse_kinds(args.kinds.as_deref())?;
    let mut radio = open_radio(&args.serial)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    tracing::info!(device = %args.serial.device.display(), "monitoring frames");
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match radio.wait_for_frame(RECEIVE_SLICE) {
            Ok(frame) => frame,
            Err(RadioError::Timeout(_)) => continue,
            Err(err) => return Err(radio_error("receive failed", err)),
        };

        if let Some(kinds) = &kinds {
            if !kinds.contains(&frame.api_id_byte()) {
                continue;
            }
        }

        print_frame(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = radio.reader_stats();
    tracing::info!(
        frames = stats.frames,
        checksum_failures = stats.checksum_failures,
        resyncs = stats.resyncs,
        "monitor stopped"
    );
    Ok(SUCCESS)
}

fn parse_kinds(kinds: Option<&[String]>) -> CliResult<Option<Vec<u8>>> {
    kinds
        .map(|kinds| {
            kinds
                .iter()
                .map(|kind| parse_number::<u8>("kinds", kind))
                .collect::<CliResult<Vec<u8>>>()
        })
        .transpose()
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
