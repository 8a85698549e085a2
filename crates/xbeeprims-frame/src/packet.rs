use std::fmt;

use bytes::Bytes;

use crate::accessors::{be_u16, be_u64, require_len};
use crate::api_id::ApiId;
use crate::codec::Frame;
use crate::error::{FrameError, Result};
use crate::io_sample::{decode_report, IoReport};

/// Largest fixed header of any kind (Io64), API id included.
const MAX_HEADER_LEN: usize = 14;

/// A two-character AT command name such as `"ID"` or `"D0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommand([u8; 2]);

impl AtCommand {
    /// Validate and wrap a command name.
    pub fn new(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(u8::is_ascii_graphic) {
            return Err(FrameError::InvalidCommand(name.to_string()));
        }
        Ok(Self([bytes[0], bytes[1]]))
    }

    /// Wrap the two raw bytes as they appear on the wire.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> [u8; 2] {
        self.0
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.0[0] as char, self.0[1] as char)
    }
}

impl std::str::FromStr for AtCommand {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Every message kind with its typed fields.
///
/// Addresses are host integers; they are written big-endian on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Packet {
    Tx64 {
        frame_id: u8,
        destination: u64,
        options: u8,
        data: Bytes,
    },
    Tx16 {
        frame_id: u8,
        destination: u16,
        options: u8,
        data: Bytes,
    },
    AtCommand {
        frame_id: u8,
        command: AtCommand,
        parameters: Bytes,
    },
    AtCommandQueue {
        frame_id: u8,
        command: AtCommand,
        parameters: Bytes,
    },
    Rx64 {
        source: u64,
        rssi: u8,
        options: u8,
        data: Bytes,
    },
    Rx16 {
        source: u16,
        rssi: u8,
        options: u8,
        data: Bytes,
    },
    Io64 {
        source: u64,
        rssi: u8,
        options: u8,
        sample_count: u8,
        channel_indicators: u16,
        samples: Bytes,
    },
    Io16 {
        source: u16,
        rssi: u8,
        options: u8,
        sample_count: u8,
        channel_indicators: u16,
        samples: Bytes,
    },
    AtCommandResponse {
        frame_id: u8,
        command: AtCommand,
        status: u8,
        value: Bytes,
    },
    TxStatus {
        frame_id: u8,
        status: u8,
    },
}

impl Packet {
    /// Transmit `data` to a 16-bit address (`0xFFFF` broadcasts).
    pub fn tx16(frame_id: u8, destination: u16, options: u8, data: impl Into<Bytes>) -> Self {
        Packet::Tx16 {
            frame_id,
            destination,
            options,
            data: data.into(),
        }
    }

    /// Transmit `data` to a 64-bit address.
    pub fn tx64(frame_id: u8, destination: u64, options: u8, data: impl Into<Bytes>) -> Self {
        Packet::Tx64 {
            frame_id,
            destination,
            options,
            data: data.into(),
        }
    }

    /// AT command applied immediately by the module.
    pub fn at_command(frame_id: u8, command: &str, parameters: impl Into<Bytes>) -> Result<Self> {
        Ok(Packet::AtCommand {
            frame_id,
            command: AtCommand::new(command)?,
            parameters: parameters.into(),
        })
    }

    /// AT command whose parameter is queued until changes are applied.
    pub fn at_command_queue(
        frame_id: u8,
        command: &str,
        parameters: impl Into<Bytes>,
    ) -> Result<Self> {
        Ok(Packet::AtCommandQueue {
            frame_id,
            command: AtCommand::new(command)?,
            parameters: parameters.into(),
        })
    }

    pub fn rx16(source: u16, rssi: u8, options: u8, data: impl Into<Bytes>) -> Self {
        Packet::Rx16 {
            source,
            rssi,
            options,
            data: data.into(),
        }
    }

    pub fn rx64(source: u64, rssi: u8, options: u8, data: impl Into<Bytes>) -> Self {
        Packet::Rx64 {
            source,
            rssi,
            options,
            data: data.into(),
        }
    }

    pub fn at_response(
        frame_id: u8,
        command: &str,
        status: u8,
        value: impl Into<Bytes>,
    ) -> Result<Self> {
        Ok(Packet::AtCommandResponse {
            frame_id,
            command: AtCommand::new(command)?,
            status,
            value: value.into(),
        })
    }

    pub fn tx_status(frame_id: u8, status: u8) -> Self {
        Packet::TxStatus { frame_id, status }
    }

    /// The message kind.
    pub fn api_id(&self) -> ApiId {
        match self {
            Packet::Tx64 { .. } => ApiId::Tx64,
            Packet::Tx16 { .. } => ApiId::Tx16,
            Packet::AtCommand { .. } => ApiId::AtCommand,
            Packet::AtCommandQueue { .. } => ApiId::AtCommandQueue,
            Packet::Rx64 { .. } => ApiId::Rx64,
            Packet::Rx16 { .. } => ApiId::Rx16,
            Packet::Io64 { .. } => ApiId::Io64,
            Packet::Io16 { .. } => ApiId::Io16,
            Packet::AtCommandResponse { .. } => ApiId::AtCommandResponse,
            Packet::TxStatus { .. } => ApiId::TxStatus,
        }
    }

    /// The variable region that follows the fixed header.
    pub fn data(&self) -> &[u8] {
        match self {
            Packet::Tx64 { data, .. }
            | Packet::Tx16 { data, .. }
            | Packet::Rx64 { data, .. }
            | Packet::Rx16 { data, .. } => &data[..],
            Packet::AtCommand { parameters, .. } | Packet::AtCommandQueue { parameters, .. } => {
                &parameters[..]
            }
            Packet::Io64 { samples, .. } | Packet::Io16 { samples, .. } => &samples[..],
            Packet::AtCommandResponse { value, .. } => &value[..],
            Packet::TxStatus { .. } => &[],
        }
    }

    /// Frame id for kinds that carry one.
    pub fn frame_id(&self) -> Option<u8> {
        match self {
            Packet::Tx64 { frame_id, .. }
            | Packet::Tx16 { frame_id, .. }
            | Packet::AtCommand { frame_id, .. }
            | Packet::AtCommandQueue { frame_id, .. }
            | Packet::AtCommandResponse { frame_id, .. }
            | Packet::TxStatus { frame_id, .. } => Some(*frame_id),
            _ => None,
        }
    }

    /// Payload bytes in wire order: API id, header, data.
    pub fn payload_bytes(&self) -> impl Iterator<Item = u8> + '_ {
        let header = self.header();
        header
            .buf
            .into_iter()
            .take(header.len)
            .chain(self.data().iter().copied())
    }

    /// Decode the sample report of an I/O sample packet.
    pub fn io_report(&self) -> Result<IoReport> {
        match self {
            Packet::Io64 {
                sample_count,
                channel_indicators,
                samples,
                ..
            }
            | Packet::Io16 {
                sample_count,
                channel_indicators,
                samples,
                ..
            } => decode_report(*sample_count, *channel_indicators, samples),
            other => Err(FrameError::KindMismatch {
                expected: "IO16 or IO64",
                actual: other.api_id().as_byte(),
            }),
        }
    }

    /// Decode any known kind from a validated frame.
    pub fn from_frame(frame: &Frame) -> Result<Self> {
        let kind = ApiId::try_from(frame.api_id_byte())?;
        let p = frame.payload();

        let packet = match kind {
            ApiId::Tx64 => {
                require_len(p, kind.header_len())?;
                Packet::Tx64 {
                    frame_id: p[1],
                    destination: be_u64(&p[2..10]),
                    options: p[10],
                    data: frame.tail(11),
                }
            }
            ApiId::Tx16 => {
                require_len(p, kind.header_len())?;
                Packet::Tx16 {
                    frame_id: p[1],
                    destination: be_u16(&p[2..4]),
                    options: p[4],
                    data: frame.tail(5),
                }
            }
            ApiId::AtCommand | ApiId::AtCommandQueue => {
                require_len(p, kind.header_len())?;
                let frame_id = p[1];
                let command = AtCommand::from_bytes([p[2], p[3]]);
                let parameters = frame.tail(4);
                if kind == ApiId::AtCommand {
                    Packet::AtCommand {
                        frame_id,
                        command,
                        parameters,
                    }
                } else {
                    Packet::AtCommandQueue {
                        frame_id,
                        command,
                        parameters,
                    }
                }
            }
            ApiId::Rx64 => {
                let view = frame.read_rx64()?;
                Packet::Rx64 {
                    source: view.source,
                    rssi: view.rssi,
                    options: view.options,
                    data: frame.tail(kind.header_len()),
                }
            }
            ApiId::Rx16 => {
                let view = frame.read_rx16()?;
                Packet::Rx16 {
                    source: view.source,
                    rssi: view.rssi,
                    options: view.options,
                    data: frame.tail(kind.header_len()),
                }
            }
            ApiId::Io64 => {
                require_len(p, kind.header_len())?;
                Packet::Io64 {
                    source: be_u64(&p[1..9]),
                    rssi: p[9],
                    options: p[10],
                    sample_count: p[11],
                    channel_indicators: be_u16(&p[12..14]),
                    samples: frame.tail(14),
                }
            }
            ApiId::Io16 => {
                require_len(p, kind.header_len())?;
                Packet::Io16 {
                    source: be_u16(&p[1..3]),
                    rssi: p[3],
                    options: p[4],
                    sample_count: p[5],
                    channel_indicators: be_u16(&p[6..8]),
                    samples: frame.tail(8),
                }
            }
            ApiId::AtCommandResponse => {
                let view = frame.read_at_response()?;
                Packet::AtCommandResponse {
                    frame_id: view.frame_id,
                    command: view.command,
                    status: view.status,
                    value: frame.tail(kind.header_len()),
                }
            }
            ApiId::TxStatus => {
                let view = frame.read_tx_status()?;
                Packet::TxStatus {
                    frame_id: view.frame_id,
                    status: view.status,
                }
            }
        };
        Ok(packet)
    }

    fn header(&self) -> Header {
        let header = Header::new(self.api_id());
        match self {
            Packet::Tx64 {
                frame_id,
                destination,
                options,
                ..
            } => header
                .put(&[*frame_id])
                .put(&destination.to_be_bytes())
                .put(&[*options]),
            Packet::Tx16 {
                frame_id,
                destination,
                options,
                ..
            } => header
                .put(&[*frame_id])
                .put(&destination.to_be_bytes())
                .put(&[*options]),
            Packet::AtCommand {
                frame_id, command, ..
            }
            | Packet::AtCommandQueue {
                frame_id, command, ..
            } => header.put(&[*frame_id]).put(&command.as_bytes()),
            Packet::Rx64 {
                source,
                rssi,
                options,
                ..
            } => header.put(&source.to_be_bytes()).put(&[*rssi, *options]),
            Packet::Rx16 {
                source,
                rssi,
                options,
                ..
            } => header.put(&source.to_be_bytes()).put(&[*rssi, *options]),
            Packet::Io64 {
                source,
                rssi,
                options,
                sample_count,
                channel_indicators,
                ..
            } => header
                .put(&source.to_be_bytes())
                .put(&[*rssi, *options, *sample_count])
                .put(&channel_indicators.to_be_bytes()),
            Packet::Io16 {
                source,
                rssi,
                options,
                sample_count,
                channel_indicators,
                ..
            } => header
                .put(&source.to_be_bytes())
                .put(&[*rssi, *options, *sample_count])
                .put(&channel_indicators.to_be_bytes()),
            Packet::AtCommandResponse {
                frame_id,
                command,
                status,
                ..
            } => header
                .put(&[*frame_id])
                .put(&command.as_bytes())
                .put(&[*status]),
            Packet::TxStatus { frame_id, status } => header.put(&[*frame_id, *status]),
        }
    }
}

impl TryFrom<&Frame> for Packet {
    type Error = FrameError;

    fn try_from(frame: &Frame) -> Result<Self> {
        Packet::from_frame(frame)
    }
}

struct Header {
    buf: [u8; MAX_HEADER_LEN],
    len: usize,
}

impl Header {
    fn new(kind: ApiId) -> Self {
        let mut buf = [0u8; MAX_HEADER_LEN];
        buf[0] = kind.as_byte();
        Self { buf, len: 1 }
    }

    fn put(mut self, bytes: &[u8]) -> Self {
        self.buf[self.len..self.len + bytes.len()].copy_from_slice(bytes);
        self.len += bytes.len();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_of(packet: &Packet) -> Frame {
        Frame::from_payload(packet.payload_bytes().collect::<Vec<u8>>()).unwrap()
    }

    #[test]
    fn at_command_names_are_validated() {
        assert!(AtCommand::new("ID").is_ok());
        assert!(AtCommand::new("D0").is_ok());
        assert!(matches!(
            AtCommand::new("I"),
            Err(FrameError::InvalidCommand(_))
        ));
        assert!(matches!(
            AtCommand::new("IDX"),
            Err(FrameError::InvalidCommand(_))
        ));
        assert!(matches!(
            AtCommand::new("é"),
            Err(FrameError::InvalidCommand(_))
        ));
        assert!(Packet::at_command(0, " D", Bytes::new()).is_err());
    }

    #[test]
    fn at_command_display() {
        let cmd: AtCommand = "CH".parse().unwrap();
        assert_eq!(cmd.to_string(), "CH");
        assert_eq!(cmd.as_bytes(), *b"CH");
    }

    #[test]
    fn header_lengths_match_kind_table() {
        let packets = [
            Packet::tx64(1, 2, 3, Bytes::new()),
            Packet::tx16(1, 2, 3, Bytes::new()),
            Packet::at_command(1, "ID", Bytes::new()).unwrap(),
            Packet::at_command_queue(1, "ID", Bytes::new()).unwrap(),
            Packet::rx64(1, 2, 3, Bytes::new()),
            Packet::rx16(1, 2, 3, Bytes::new()),
            Packet::at_response(1, "ID", 0, Bytes::new()).unwrap(),
            Packet::tx_status(1, 0),
        ];

        for packet in packets {
            let header = packet.header();
            assert_eq!(header.len, packet.api_id().header_len(), "{}", packet.api_id());
            assert_eq!(header.buf[0], packet.api_id().as_byte());
        }
    }

    #[test]
    fn tx64_destination_is_big_endian() {
        let packet = Packet::tx64(0x01, 0x0013_A200_4052_8A9C, 0x00, Bytes::from_static(b"x"));
        let bytes: Vec<u8> = packet.payload_bytes().collect();
        assert_eq!(
            bytes,
            vec![0x00, 0x01, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x52, 0x8A, 0x9C, 0x00, b'x']
        );
    }

    #[test]
    fn every_kind_converts_back_from_its_frame() {
        let packets = [
            Packet::tx64(9, 0x0013_A200_4052_8A9C, 4, Bytes::from_static(b"hello")),
            Packet::tx16(9, 0xFFFF, 0, Bytes::from_static(b"ABC")),
            Packet::at_command(1, "IR", vec![0x14]).unwrap(),
            Packet::at_command_queue(2, "WR", Bytes::new()).unwrap(),
            Packet::rx64(0x0102_0304_0506_0708, 0x28, 0, Bytes::from_static(b"rf")),
            Packet::rx16(0x5678, 0x28, 2, Bytes::from_static(b"rf")),
            Packet::at_response(3, "MY", 0, vec![0x12, 0x34]).unwrap(),
            Packet::tx_status(4, 1),
            Packet::Io16 {
                source: 0x1234,
                rssi: 0x30,
                options: 0,
                sample_count: 1,
                channel_indicators: 0x0201,
                samples: Bytes::from_static(&[0x00, 0x01, 0x03, 0xFF]),
            },
            Packet::Io64 {
                source: 0xAABB_CCDD_EEFF_0011,
                rssi: 0x30,
                options: 0,
                sample_count: 1,
                channel_indicators: 0x0200,
                samples: Bytes::from_static(&[0x01, 0x00]),
            },
        ];

        for packet in packets {
            let frame = frame_of(&packet);
            assert_eq!(Packet::from_frame(&frame).unwrap(), packet);
            assert_eq!(Packet::try_from(&frame).unwrap(), packet);
        }
    }

    #[test]
    fn unknown_api_id_is_reported() {
        let frame = Frame::from_payload(vec![0x42, 0x00]).unwrap();
        assert!(matches!(
            Packet::from_frame(&frame),
            Err(FrameError::UnknownApiId(0x42))
        ));
    }

    #[test]
    fn truncated_header_is_reported() {
        let frame = Frame::from_payload(vec![0x01, 0x01, 0xFF]).unwrap();
        assert!(matches!(
            Packet::from_frame(&frame),
            Err(FrameError::Truncated { needed: 5, actual: 3 })
        ));
    }

    #[test]
    fn io_report_only_for_sample_packets() {
        let err = Packet::tx_status(1, 0).io_report().unwrap_err();
        assert!(matches!(
            err,
            FrameError::KindMismatch { actual: 0x89, .. }
        ));
    }

    #[test]
    fn frame_ids() {
        assert_eq!(Packet::tx_status(7, 0).frame_id(), Some(7));
        assert_eq!(Packet::rx16(1, 0, 0, Bytes::new()).frame_id(), None);
    }
}
