//! Typed, read-only views over validated inbound frames.
//!
//! Each `read_*` method checks the API id first and fails with
//! [`FrameError::KindMismatch`] without touching anything else, so a
//! caller can try a frame with several accessors in turn.

use crate::api_id::ApiId;
use crate::codec::Frame;
use crate::error::{FrameError, Result};
use crate::io_sample::{decode_report, IoReport};
use crate::packet::AtCommand;

/// Data received from a 16-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rx16View<'a> {
    pub source: u16,
    pub rssi: u8,
    pub options: u8,
    pub data: &'a [u8],
}

/// Data received from a 64-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rx64View<'a> {
    pub source: u64,
    pub rssi: u8,
    pub options: u8,
    pub data: &'a [u8],
}

/// I/O sample report from a 16-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Io16View {
    pub source: u16,
    pub rssi: u8,
    pub options: u8,
    pub report: IoReport,
}

/// I/O sample report from a 64-bit address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Io64View {
    pub source: u64,
    pub rssi: u8,
    pub options: u8,
    pub report: IoReport,
}

/// Module reply to an AT command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtResponseView<'a> {
    pub frame_id: u8,
    pub command: AtCommand,
    pub status: u8,
    pub value: &'a [u8],
}

impl AtResponseView<'_> {
    /// Status 0 means the command was accepted.
    pub fn is_ok(&self) -> bool {
        self.status == 0
    }
}

/// Outcome of a previous transmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxStatusView {
    pub frame_id: u8,
    pub status: u8,
}

impl TxStatusView {
    /// Status 0 means the transmit was acknowledged.
    pub fn is_success(&self) -> bool {
        self.status == 0
    }
}

impl Frame {
    pub fn read_rx16(&self) -> Result<Rx16View<'_>> {
        let p = self.fields(ApiId::Rx16)?;
        Ok(Rx16View {
            source: be_u16(&p[1..3]),
            rssi: p[3],
            options: p[4],
            data: &p[5..],
        })
    }

    pub fn read_rx64(&self) -> Result<Rx64View<'_>> {
        let p = self.fields(ApiId::Rx64)?;
        Ok(Rx64View {
            source: be_u64(&p[1..9]),
            rssi: p[9],
            options: p[10],
            data: &p[11..],
        })
    }

    pub fn read_io16(&self) -> Result<Io16View> {
        let p = self.fields(ApiId::Io16)?;
        Ok(Io16View {
            source: be_u16(&p[1..3]),
            rssi: p[3],
            options: p[4],
            report: decode_report(p[5], be_u16(&p[6..8]), &p[8..])?,
        })
    }

    pub fn read_io64(&self) -> Result<Io64View> {
        let p = self.fields(ApiId::Io64)?;
        Ok(Io64View {
            source: be_u64(&p[1..9]),
            rssi: p[9],
            options: p[10],
            report: decode_report(p[11], be_u16(&p[12..14]), &p[14..])?,
        })
    }

    pub fn read_at_response(&self) -> Result<AtResponseView<'_>> {
        let p = self.fields(ApiId::AtCommandResponse)?;
        Ok(AtResponseView {
            frame_id: p[1],
            command: AtCommand::from_bytes([p[2], p[3]]),
            status: p[4],
            value: &p[5..],
        })
    }

    pub fn read_tx_status(&self) -> Result<TxStatusView> {
        let p = self.fields(ApiId::TxStatus)?;
        Ok(TxStatusView {
            frame_id: p[1],
            status: p[2],
        })
    }

    /// Decode the samples of either I/O sample kind.
    pub fn read_io_samples(&self) -> Result<IoReport> {
        match self.api_id() {
            Some(ApiId::Io16) => self.read_io16().map(|view| view.report),
            Some(ApiId::Io64) => self.read_io64().map(|view| view.report),
            _ => Err(FrameError::KindMismatch {
                expected: "IO16 or IO64",
                actual: self.api_id_byte(),
            }),
        }
    }

    /// Length of the variable region: declared length minus the kind's
    /// overhead.
    pub fn data_len(&self) -> Option<usize> {
        let kind = self.api_id()?;
        self.len().checked_sub(kind.header_len())
    }

    fn fields(&self, expected: ApiId) -> Result<&[u8]> {
        let actual = self.api_id_byte();
        if actual != expected.as_byte() {
            return Err(FrameError::KindMismatch {
                expected: expected.name(),
                actual,
            });
        }
        let payload = self.payload();
        require_len(payload, expected.header_len())?;
        Ok(payload)
    }
}

pub(crate) fn require_len(payload: &[u8], needed: usize) -> Result<()> {
    if payload.len() < needed {
        return Err(FrameError::Truncated {
            needed,
            actual: payload.len(),
        });
    }
    Ok(())
}

pub(crate) fn be_u16(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

pub(crate) fn be_u64(bytes: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(bytes: &[u8]) -> Frame {
        Frame::from_payload(bytes.to_vec()).unwrap()
    }

    #[test]
    fn rx16_fields() {
        let f = frame(&[0x81, 0x12, 0x34, 0x28, 0x02, b'h', b'i']);
        let view = f.read_rx16().unwrap();

        assert_eq!(view.source, 0x1234);
        assert_eq!(view.rssi, 0x28);
        assert_eq!(view.options, 0x02);
        assert_eq!(view.data, b"hi");
        assert_eq!(f.data_len(), Some(2));
    }

    #[test]
    fn rx64_source_is_big_endian() {
        let f = frame(&[
            0x80, 0x00, 0x13, 0xA2, 0x00, 0x40, 0x52, 0x8A, 0x9C, 0x30, 0x00, 0x55,
        ]);
        let view = f.read_rx64().unwrap();

        assert_eq!(view.source, 0x0013_A200_4052_8A9C);
        assert_eq!(view.rssi, 0x30);
        assert_eq!(view.data, &[0x55]);
    }

    #[test]
    fn at_response_fields() {
        let f = frame(&[0x88, 0x01, b'M', b'Y', 0x00, 0xAB, 0xCD]);
        let view = f.read_at_response().unwrap();

        assert_eq!(view.frame_id, 0x01);
        assert_eq!(view.command.to_string(), "MY");
        assert!(view.is_ok());
        assert_eq!(view.value, &[0xAB, 0xCD]);
    }

    #[test]
    fn tx_status_fields() {
        let f = frame(&[0x89, 0x05, 0x01]);
        let view = f.read_tx_status().unwrap();
        assert_eq!(view.frame_id, 5);
        assert!(!view.is_success());
    }

    #[test]
    fn io16_report_is_decoded() {
        let f = frame(&[0x83, 0x00, 0x07, 0x2A, 0x00, 0x01, 0x00, 0x01, 0x00, 0x01]);
        let view = f.read_io16().unwrap();

        assert_eq!(view.source, 0x0007);
        assert_eq!(view.rssi, 0x2A);
        assert_eq!(view.report.samples[0].digital[0], 1023);
    }

    #[test]
    fn every_accessor_rejects_other_kinds() {
        let tx_status = frame(&[0x89, 0x05, 0x00]);
        let rx16 = frame(&[0x81, 0x12, 0x34, 0x28, 0x02]);

        assert!(matches!(
            tx_status.read_rx16(),
            Err(FrameError::KindMismatch { expected: "RX16", actual: 0x89 })
        ));
        assert!(matches!(
            tx_status.read_rx64(),
            Err(FrameError::KindMismatch { .. })
        ));
        assert!(matches!(
            tx_status.read_io16(),
            Err(FrameError::KindMismatch { .. })
        ));
        assert!(matches!(
            tx_status.read_io64(),
            Err(FrameError::KindMismatch { .. })
        ));
        assert!(matches!(
            tx_status.read_at_response(),
            Err(FrameError::KindMismatch { .. })
        ));
        assert!(matches!(
            tx_status.read_io_samples(),
            Err(FrameError::KindMismatch { .. })
        ));
        assert!(matches!(
            rx16.read_tx_status(),
            Err(FrameError::KindMismatch { expected: "TX_STATUS", actual: 0x81 })
        ));
    }

    #[test]
    fn mismatch_leaves_caller_state_untouched() {
        let f = frame(&[0x89, 0x05, 0x00]);
        let mut source = 0xBEEFu16;
        if let Ok(view) = f.read_rx16() {
            source = view.source;
        }
        assert_eq!(source, 0xBEEF);
    }

    #[test]
    fn short_header_is_truncated() {
        let f = frame(&[0x80, 0x00, 0x13]);
        assert!(matches!(
            f.read_rx64(),
            Err(FrameError::Truncated { needed: 11, actual: 3 })
        ));
        assert_eq!(f.data_len(), None);
    }
}
