use xbeeprims_frame::{write_packet, Packet};
use xbeeprims_transport::BufferTransport;

use crate::cmd::{parse_number, EncodeArgs, EncodeKind};
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let packet = build_packet(&args)?;
    let wire = encode_wire(&packet)?;
    print_encoded(&packet, &wire, format);
    Ok(SUCCESS)
}

pub(crate) fn encode_wire(packet: &Packet) -> CliResult<Vec<u8>> {
    let mut transport = BufferTransport::new();
    write_packet(&mut transport, packet).map_err(|err| frame_error("encode failed", err))?;
    Ok(transport.take_written())
}

fn build_packet(args: &EncodeArgs) -> CliResult<Packet> {
    let data = resolve_data(args)?;
    match args.kind {
        EncodeKind::Tx16 => {
            let dest = parse_number::<u16>("dest", require(&args.dest, "dest")?)?;
            Ok(Packet::tx16(args.frame_id, dest, args.options, data))
        }
        EncodeKind::Tx64 => {
            let dest = parse_number::<u64>("dest", require(&args.dest, "dest")?)?;
            Ok(Packet::tx64(args.frame_id, dest, args.options, data))
        }
        EncodeKind::At => Packet::at_command(args.frame_id, require(&args.command, "command")?, data)
            .map_err(|err| frame_error("encode failed", err)),
        EncodeKind::AtQueue => {
            Packet::at_command_queue(args.frame_id, require(&args.command, "command")?, data)
                .map_err(|err| frame_error("encode failed", err))
        }
    }
}

fn require<'a>(value: &'a Option<String>, flag: &str) -> CliResult<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| CliError::new(USAGE, format!("--{flag} is required for this kind")))
}

fn resolve_data(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(text) = &args.data {
        return Ok(text.as_bytes().to_vec());
    }
    if let Some(hex) = &args.hex {
        return crate::hex::decode(hex).map_err(|err| CliError::new(USAGE, format!("--hex: {err}")));
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(kind: EncodeKind) -> EncodeArgs {
        EncodeArgs {
            kind,
            frame_id: 0x52,
            dest: None,
            options: 0,
            command: None,
            data: None,
            hex: None,
        }
    }

    #[test]
    fn at_command_bytes() {
        let mut at = args(EncodeKind::At);
        at.command = Some("DL".to_string());

        let wire = encode_wire(&build_packet(&at).unwrap()).unwrap();
        assert_eq!(wire, vec![0x7E, 0x00, 0x04, 0x08, 0x52, b'D', b'L', 0x15]);
    }

    #[test]
    fn tx_requires_destination() {
        let err = build_packet(&args(EncodeKind::Tx16)).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(err.message.contains("--dest"));
    }

    #[test]
    fn tx64_takes_hex_destination_and_data() {
        let mut tx = args(EncodeKind::Tx64);
        tx.dest = Some("0x0013A20040528A9C".to_string());
        tx.hex = Some("01 02".to_string());

        let packet = build_packet(&tx).unwrap();
        assert_eq!(
            packet,
            Packet::tx64(0x52, 0x0013_A200_4052_8A9C, 0, vec![0x01, 0x02])
        );
    }

    #[test]
    fn bad_command_is_usage_error() {
        let mut at = args(EncodeKind::AtQueue);
        at.command = Some("TOOLONG".to_string());
        assert_eq!(build_packet(&at).unwrap_err().code, USAGE);
    }

    #[test]
    fn oversized_tx16_is_rejected() {
        let mut tx = args(EncodeKind::Tx16);
        tx.dest = Some("1".to_string());
        tx.data = Some("x".repeat(200));

        let packet = build_packet(&tx).unwrap();
        assert_eq!(encode_wire(&packet).unwrap_err().code, USAGE);
    }
}
