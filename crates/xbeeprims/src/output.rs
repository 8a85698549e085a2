use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::{json, Value};
use xbeeprims_frame::{at_status_name, tx_status_name, Frame, IoReport, Packet, ReaderStats};

use crate::hex;

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
struct FrameOutput {
    kind: String,
    api_id: u8,
    length: usize,
    fields: serde_json::Map<String, Value>,
    payload: String,
    timestamp: String,
}

#[derive(Serialize)]
struct EncodedOutput {
    kind: String,
    length: usize,
    wire_size: usize,
    frame: String,
}

#[derive(Serialize)]
struct StatsOutput {
    frames: u64,
    checksum_failures: u64,
    resyncs: u64,
    discarded: u64,
    clamped: u64,
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                kind: kind_name(frame),
                api_id: frame.api_id_byte(),
                length: frame.len(),
                fields: frame_fields(frame),
                payload: hex::encode(frame.payload()),
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["kind".to_string(), kind_name(frame)])
                .add_row(vec!["length".to_string(), frame.len().to_string()]);
            for (name, value) in frame_fields(frame) {
                table.add_row(vec![name, display_value(&value)]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let fields: Vec<String> = frame_fields(frame)
                .into_iter()
                .map(|(name, value)| format!("{name}={}", display_value(&value)))
                .collect();
            println!(
                "{} len={} {}",
                kind_name(frame),
                frame.len(),
                fields.join(" ")
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload());
        }
    }
}

pub fn print_encoded(packet: &Packet, wire: &[u8], format: OutputFormat) {
    let length = wire.len().saturating_sub(4);
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                kind: packet.api_id().to_string(),
                length,
                wire_size: wire.len(),
                frame: hex::encode(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["KIND", "LENGTH", "FRAME"])
                .add_row(vec![
                    packet.api_id().to_string(),
                    length.to_string(),
                    hex::encode_spaced(wire),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", hex::encode_spaced(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

pub fn print_stats(stats: &ReaderStats, format: OutputFormat) {
    let out = StatsOutput {
        frames: stats.frames,
        checksum_failures: stats.checksum_failures,
        resyncs: stats.resyncs,
        discarded: stats.discarded,
        clamped: stats.clamped,
    };
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Raw => {}
        OutputFormat::Table | OutputFormat::Pretty => println!(
            "frames={} checksum_failures={} resyncs={} discarded={} clamped={}",
            out.frames, out.checksum_failures, out.resyncs, out.discarded, out.clamped
        ),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn kind_name(frame: &Frame) -> String {
    match frame.api_id() {
        Some(kind) => kind.to_string(),
        None => format!("UNKNOWN(0x{:02X})", frame.api_id_byte()),
    }
}

fn frame_fields(frame: &Frame) -> serde_json::Map<String, Value> {
    let fields = match Packet::from_frame(frame) {
        Ok(packet) => packet_fields(&packet),
        Err(err) => json!({ "error": err.to_string() }),
    };
    match fields {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn packet_fields(packet: &Packet) -> Value {
    match packet {
        Packet::Tx64 {
            frame_id,
            destination,
            options,
            data,
        } => json!({
            "frame_id": frame_id,
            "destination": format!("0x{destination:016X}"),
            "options": options,
            "data": payload_preview(data),
        }),
        Packet::Tx16 {
            frame_id,
            destination,
            options,
            data,
        } => json!({
            "frame_id": frame_id,
            "destination": format!("0x{destination:04X}"),
            "options": options,
            "data": payload_preview(data),
        }),
        Packet::AtCommand {
            frame_id,
            command,
            parameters,
        }
        | Packet::AtCommandQueue {
            frame_id,
            command,
            parameters,
        } => json!({
            "frame_id": frame_id,
            "command": command.to_string(),
            "parameters": hex::encode(parameters),
        }),
        Packet::Rx64 {
            source,
            rssi,
            options,
            data,
        } => json!({
            "source": format!("0x{source:016X}"),
            "rssi_dbm": -i16::from(*rssi),
            "options": options,
            "data": payload_preview(data),
        }),
        Packet::Rx16 {
            source,
            rssi,
            options,
            data,
        } => json!({
            "source": format!("0x{source:04X}"),
            "rssi_dbm": -i16::from(*rssi),
            "options": options,
            "data": payload_preview(data),
        }),
        Packet::Io64 { source, rssi, .. } => io_fields(
            format!("0x{source:016X}"),
            *rssi,
            packet.io_report(),
        ),
        Packet::Io16 { source, rssi, .. } => {
            io_fields(format!("0x{source:04X}"), *rssi, packet.io_report())
        }
        Packet::AtCommandResponse {
            frame_id,
            command,
            status,
            value,
        } => json!({
            "frame_id": frame_id,
            "command": command.to_string(),
            "status": at_status_name(*status),
            "value": hex::encode(value),
        }),
        Packet::TxStatus { frame_id, status } => json!({
            "frame_id": frame_id,
            "status": tx_status_name(*status),
        }),
    }
}

fn io_fields(source: String, rssi: u8, report: xbeeprims_frame::Result<IoReport>) -> Value {
    match report {
        Ok(report) => {
            let samples: Vec<Value> = report
                .samples
                .iter()
                .map(|sample| json!({ "digital": sample.digital, "analog": sample.analog }))
                .collect();
            json!({
                "source": source,
                "rssi_dbm": -i16::from(rssi),
                "sample_count": report.sample_count,
                "channel_indicators": format!("0x{:04X}", report.channel_indicators),
                "samples": samples,
            })
        }
        Err(err) => json!({
            "source": source,
            "rssi_dbm": -i16::from(rssi),
            "error": err.to_string(),
        }),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) if text.chars().all(|c| !c.is_control()) => text.to_string(),
        _ => hex::encode_spaced(payload),
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
    fn rx16_fields_are_named() {
        let frame = Frame::from_payload(vec![0x81, 0x12, 0x34, 0x28, 0x00, b'h', b'i']).unwrap();
        let fields = frame_fields(&frame);

        assert_eq!(fields["source"], "0x1234");
        assert_eq!(fields["rssi_dbm"], -40);
        assert_eq!(fields["data"], "hi");
        assert_eq!(kind_name(&frame), "RX16");
    }

    #[test]
    fn io16_samples_are_expanded() {
        let frame = Frame::from_payload(vec![
            0x83, 0x00, 0x07, 0x2A, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01,
        ])
        .unwrap();
        let fields = frame_fields(&frame);

        assert_eq!(fields["channel_indicators"], "0x0001");
        assert_eq!(fields["samples"][0]["digital"][0], 1023);
    }

    #[test]
    fn unknown_kind_reports_error_field() {
        let frame = Frame::from_payload(vec![0x42, 0x00]).unwrap();
        let fields = frame_fields(&frame);

        assert!(fields.contains_key("error"));
        assert_eq!(kind_name(&frame), "UNKNOWN(0x42)");
    }

    #[test]
    fn binary_payload_preview_is_hex() {
        assert_eq!(payload_preview(b"ok"), "ok");
        assert_eq!(payload_preview(&[0x00, 0xFF]), "00 FF");
    }
}
