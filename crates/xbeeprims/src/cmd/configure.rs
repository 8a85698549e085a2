use std::time::Duration;

use xbeeprims_frame::{at_status_name, ApiId, Frame};
use xbeeprims_radio::{IoMode, Radio, IO_PINS};
use xbeeprims_transport::ByteTransport;

use crate::cmd::{open_radio, parse_duration, parse_number, ConfigureArgs};
use crate::exit::{radio_error, CliError, CliResult, FAILURE, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

/// One configuration change, in the order it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Step {
    PanId(u16),
    Channel(u8),
    Address(u16),
    SampleRate(u16),
    Ios([IoMode; IO_PINS]),
    Write,
}

impl Step {
    fn command(&self) -> &'static str {
        match self {
            Step::PanId(_) => "ID",
            Step::Channel(_) => "CH",
            Step::Address(_) => "MY",
            Step::SampleRate(_) => "IR",
            Step::Ios(_) => "D0..D8",
            Step::Write => "WR",
        }
    }
}

pub fn run(args: ConfigureArgs, format: OutputFormat) -> CliResult<i32> {
    let steps = plan(&args)?;
    if steps.is_empty() {
        return Err(CliError::new(USAGE, "nothing to configure"));
    }
    let wait = if args.wait {
        Some(parse_duration(&args.wait_timeout)?)
    } else {
        None
    };

    let mut radio = open_radio(&args.serial)?;
    apply(&mut radio, &steps, wait, format)?;
    Ok(SUCCESS)
}

fn plan(args: &ConfigureArgs) -> CliResult<Vec<Step>> {
    let mut steps = Vec::new();
    if let Some(pan_id) = &args.pan_id {
        steps.push(Step::PanId(parse_number("pan-id", pan_id)?));
    }
    if let Some(channel) = &args.channel {
        steps.push(Step::Channel(parse_number("channel", channel)?));
    }
    if let Some(address) = &args.address {
        steps.push(Step::Address(parse_number("address", address)?));
    }
    if let Some(rate) = args.sample_rate {
        steps.push(Step::SampleRate(rate));
    }
    if let Some(ios) = &args.ios {
        steps.push(Step::Ios(parse_ios(ios)?));
    }
    if args.write {
        steps.push(Step::Write);
    }
    Ok(steps)
}

fn parse_ios(values: &[String]) -> CliResult<[IoMode; IO_PINS]> {
    if values.len() > IO_PINS {
        return Err(CliError::new(
            USAGE,
            format!("--ios takes at most {IO_PINS} modes, got {}", values.len()),
        ));
    }
    let mut modes = [IoMode::Disabled; IO_PINS];
    for (slot, value) in modes.iter_mut().zip(values) {
        *slot = value
            .parse()
            .map_err(|err: String| CliError::new(USAGE, format!("--ios: {err}")))?;
    }
    Ok(modes)
}

fn apply<T: ByteTransport>(
    radio: &mut Radio<T>,
    steps: &[Step],
    wait: Option<Duration>,
    format: OutputFormat,
) -> CliResult<usize> {
    let mut replies = 0usize;
    for step in steps {
        let context = format!("{} failed", step.command());
        let frame_ids = match step {
            Step::PanId(pan_id) => radio.set_pan_id(*pan_id).map(|id| vec![id]),
            Step::Channel(channel) => radio.set_channel(*channel).map(|id| vec![id]),
            Step::Address(address) => radio.set_address(*address).map(|id| vec![id]),
            Step::SampleRate(rate) => radio.set_sample_rate(*rate).map(|id| vec![id]),
            Step::Write => radio.write_state_to_memory().map(|id| vec![id]),
            Step::Ios(modes) => radio.configure_ios(modes).map(|ids| ids.to_vec()),
        }
        .map_err(|err| radio_error(&context, err))?;
        tracing::info!(command = step.command(), ?frame_ids, "sent configuration");

        let Some(timeout) = wait else {
            continue;
        };
        let mut pending = frame_ids;
        while !pending.is_empty() {
            let frame = radio
                .wait_for(timeout, |frame| {
                    response_id(frame).is_some_and(|id| pending.contains(&id))
                })
                .map_err(|err| radio_error(&context, err))?;
            report(&frame, format)?;
            if let Some(id) = response_id(&frame) {
                pending.retain(|pending_id| *pending_id != id);
            }
            replies += 1;
        }
    }
    Ok(replies)
}

/// Frame id of an AT command response, if `frame` is one.
fn response_id(frame: &Frame) -> Option<u8> {
    if frame.api_id() != Some(ApiId::AtCommandResponse) {
        return None;
    }
    frame.read_at_response().ok().map(|view| view.frame_id)
}

fn report(frame: &Frame, format: OutputFormat) -> CliResult<()> {
    print_frame(frame, format);
    let view = frame
        .read_at_response()
        .map_err(|err| crate::exit::frame_error("bad response", err))?;
    if view.is_ok() {
        return Ok(());
    }
    Err(CliError::new(
        FAILURE,
        format!(
            "module rejected {}: {}",
            view.command,
            at_status_name(view.status)
        ),
    ))
}

#[cfg(test)]
mod tests {
    use xbeeprims_frame::{FrameReader, Packet};
    use xbeeprims_transport::BufferTransport;

    use super::*;
    use crate::cmd::SerialArgs;
    use crate::cmd::encode::encode_wire;

    fn args() -> ConfigureArgs {
        ConfigureArgs {
            serial: SerialArgs {
                device: "/dev/null".into(),
                baud: 9600,
                api_mode: false,
                guard_time: "1025ms".to_string(),
            },
            pan_id: None,
            channel: None,
            address: None,
            sample_rate: None,
            ios: None,
            write: false,
            wait: false,
            wait_timeout: "2s".to_string(),
        }
    }

    fn sent(radio: &mut Radio<BufferTransport>) -> Vec<Packet> {
        let wire = radio.transport_mut().take_written();
        let mut incoming = BufferTransport::with_incoming(&wire);
        let mut reader = FrameReader::new();
        let mut packets = Vec::new();
        while let Some(frame) = reader.poll(&mut incoming).unwrap() {
            packets.push(Packet::from_frame(&frame).unwrap());
        }
        packets
    }

    #[test]
    fn plan_follows_flag_order() {
        let mut a = args();
        a.write = true;
        a.channel = Some("0x0C".to_string());
        a.pan_id = Some("0x3332".to_string());

        assert_eq!(
            plan(&a).unwrap(),
            vec![Step::PanId(0x3332), Step::Channel(0x0C), Step::Write]
        );
    }

    #[test]
    fn ios_pad_with_disabled() {
        let modes = parse_ios(&["adc".to_string(), "high".to_string()]).unwrap();
        assert_eq!(modes[0], IoMode::AnalogIn);
        assert_eq!(modes[1], IoMode::DigitalOutHigh);
        assert_eq!(modes[8], IoMode::Disabled);

        let too_many = vec!["off".to_string(); IO_PINS + 1];
        assert_eq!(parse_ios(&too_many).unwrap_err().code, USAGE);
        assert_eq!(parse_ios(&["pwm".to_string()]).unwrap_err().code, USAGE);
    }

    #[test]
    fn apply_without_wait_sends_commands() {
        let mut radio = Radio::new(BufferTransport::new());
        let steps = [Step::Address(0x1234), Step::Write];

        let replies = apply(&mut radio, &steps, None, OutputFormat::Json).unwrap();

        assert_eq!(replies, 0);
        assert_eq!(
            sent(&mut radio),
            vec![
                Packet::at_command(1, "MY", vec![0x12, 0x34]).unwrap(),
                Packet::at_command(2, "WR", Vec::<u8>::new()).unwrap(),
            ]
        );
    }

    #[test]
    fn apply_checks_response_status() {
        let reply = Packet::at_response(1, "CH", 0x03, Vec::<u8>::new()).unwrap();
        let incoming = encode_wire(&reply).unwrap();
        let mut radio = Radio::new(BufferTransport::with_incoming(incoming));

        let err = apply(
            &mut radio,
            &[Step::Channel(0x0C)],
            Some(Duration::from_millis(20)),
            OutputFormat::Json,
        )
        .unwrap_err();

        assert_eq!(err.code, FAILURE);
        assert!(err.message.contains("INVALID_PARAMETER"));
    }

    #[test]
    fn io_replies_are_matched_by_frame_id() {
        let stale = Packet::at_response(42, "D3", 0x01, Vec::<u8>::new()).unwrap();
        let mut incoming = encode_wire(&stale).unwrap();
        for id in [2u8, 1, 3, 4, 5, 6, 7, 8, 9] {
            let command = format!("D{}", id - 1);
            let reply = Packet::at_response(id, &command, 0x00, Vec::<u8>::new()).unwrap();
            incoming.extend(encode_wire(&reply).unwrap());
        }
        let mut radio = Radio::new(BufferTransport::with_incoming(incoming));

        let replies = apply(
            &mut radio,
            &[Step::Ios([IoMode::Disabled; IO_PINS])],
            Some(Duration::from_millis(20)),
            OutputFormat::Json,
        )
        .unwrap();

        assert_eq!(replies, IO_PINS);
        assert_eq!(radio.transport().pending(), 0);
    }

    #[test]
    fn apply_rejects_bad_channel_before_sending() {
        let mut radio = Radio::new(BufferTransport::new());
        let err = apply(&mut radio, &[Step::Channel(0x30)], None, OutputFormat::Json).unwrap_err();

        assert_eq!(err.code, USAGE);
        assert!(radio.transport().written().is_empty());
    }
}
