use std::fs;
use std::io::Read;

use xbeeprims_frame::{Frame, FrameReader, ReaderStats};
use xbeeprims_transport::BufferTransport;

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_frame, print_stats, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = read_input(&args)?;
    let (frames, stats) = decode_all(&bytes)?;

    for frame in &frames {
        print_frame(frame, format);
    }
    if args.stats {
        print_stats(&stats, format);
    }

    tracing::debug!(
        frames = stats.frames,
        checksum_failures = stats.checksum_failures,
        resyncs = stats.resyncs,
        "decode finished"
    );
    if frames.is_empty() {
        return Err(CliError::new(DATA_INVALID, "no valid frames found in input"));
    }
    Ok(SUCCESS)
}

pub(crate) fn decode_all(bytes: &[u8]) -> CliResult<(Vec<Frame>, ReaderStats)> {
    let mut transport = BufferTransport::with_incoming(bytes);
    let mut reader = FrameReader::new();
    let mut frames = Vec::new();

    while let Some(frame) = reader
        .poll(&mut transport)
        .map_err(|err| frame_error("decode failed", err))?
    {
        frames.push(frame);
    }
    if !reader.is_idle() {
        tracing::warn!(
            received = reader.received(),
            declared = reader.declared_length(),
            "input ends inside a frame"
        );
    }
    Ok((frames, reader.stats()))
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    let raw = if let Some(input) = &args.input {
        input.as_bytes().to_vec()
    } else if let Some(path) = &args.file {
        fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?
    } else {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|err| io_error("failed reading stdin", err))?;
        buf
    };

    if args.binary {
        return Ok(raw);
    }
    let text = String::from_utf8(raw)
        .map_err(|_| CliError::new(USAGE, "hex input is not valid UTF-8 (use --binary)"))?;
    crate::hex::decode(&text).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}
