//! API ids (message kinds) and their fixed layouts.

use std::fmt;

use crate::error::FrameError;

/// Message kind, carried as the first payload byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ApiId {
    /// Transmit to a 64-bit address.
    Tx64 = 0x00,
    /// Transmit to a 16-bit address.
    Tx16 = 0x01,
    /// Run an AT command and apply it immediately.
    AtCommand = 0x08,
    /// Queue an AT command parameter (applied on `AC` or the next command).
    AtCommandQueue = 0x09,
    /// Data received from a 64-bit address.
    Rx64 = 0x80,
    /// Data received from a 16-bit address.
    Rx16 = 0x81,
    /// I/O sample report from a 64-bit address.
    Io64 = 0x82,
    /// I/O sample report from a 16-bit address.
    Io16 = 0x83,
    /// Module reply to an AT command.
    AtCommandResponse = 0x88,
    /// Outcome of a previous transmit.
    TxStatus = 0x89,
}

impl ApiId {
    /// Every kind, in API id order.
    pub const ALL: [ApiId; 10] = [
        ApiId::Tx64,
        ApiId::Tx16,
        ApiId::AtCommand,
        ApiId::AtCommandQueue,
        ApiId::Rx64,
        ApiId::Rx16,
        ApiId::Io64,
        ApiId::Io16,
        ApiId::AtCommandResponse,
        ApiId::TxStatus,
    ];

    /// Look up the kind for an API id byte.
    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_byte() == byte)
    }

    /// The API id byte.
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    /// Bytes before the variable region, including the API id itself.
    pub fn header_len(self) -> usize {
        match self {
            ApiId::Tx64 | ApiId::Rx64 => 11,
            ApiId::Tx16 | ApiId::Rx16 | ApiId::AtCommandResponse => 5,
            ApiId::AtCommand | ApiId::AtCommandQueue => 4,
            ApiId::TxStatus => 3,
            ApiId::Io16 => 8,
            ApiId::Io64 => 14,
        }
    }

    /// Overhead added to the data length when this kind is sent, or `None`
    /// for kinds the writer refuses to emit.
    pub fn send_overhead(self) -> Option<usize> {
        match self {
            ApiId::Io16 | ApiId::Io64 => None,
            other => Some(other.header_len()),
        }
    }

    /// True for kinds whose frame length never depends on data.
    pub fn is_fixed_size(self) -> bool {
        self == ApiId::TxStatus
    }

    /// True for the two I/O sample report kinds.
    pub fn is_io_sample(self) -> bool {
        matches!(self, ApiId::Io16 | ApiId::Io64)
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            ApiId::Tx64 => "TX64",
            ApiId::Tx16 => "TX16",
            ApiId::AtCommand => "AT_COMMAND",
            ApiId::AtCommandQueue => "AT_COMMAND_QUEUE",
            ApiId::Rx64 => "RX64",
            ApiId::Rx16 => "RX16",
            ApiId::Io64 => "IO64",
            ApiId::Io16 => "IO16",
            ApiId::AtCommandResponse => "AT_RESPONSE",
            ApiId::TxStatus => "TX_STATUS",
        }
    }
}

impl TryFrom<u8> for ApiId {
    type Error = FrameError;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Self::from_byte(byte).ok_or(FrameError::UnknownApiId(byte))
    }
}

impl From<ApiId> for u8 {
    fn from(kind: ApiId) -> Self {
        kind.as_byte()
    }
}

impl fmt::Display for ApiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name of a transmit status code.
pub fn tx_status_name(status: u8) -> &'static str {
    match status {
        0 => "SUCCESS",
        1 => "NO_ACK",
        2 => "CCA_FAILURE",
        3 => "PURGED",
        _ => "UNKNOWN",
    }
}

/// Name of an AT command response status code.
pub fn at_status_name(status: u8) -> &'static str {
    match status {
        0 => "OK",
        1 => "ERROR",
        2 => "INVALID_COMMAND",
        3 => "INVALID_PARAMETER",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_round_trip_through_kinds() {
        for kind in ApiId::ALL {
            assert_eq!(ApiId::from_byte(kind.as_byte()), Some(kind));
        }
        assert_eq!(ApiId::from_byte(0x42), None);
    }

    #[test]
    fn unknown_byte_is_an_error() {
        let err = ApiId::try_from(0x90).unwrap_err();
        assert!(matches!(err, FrameError::UnknownApiId(0x90)));
    }

    #[test]
    fn send_overheads_match_wire_table() {
        assert_eq!(ApiId::Tx64.send_overhead(), Some(11));
        assert_eq!(ApiId::Rx64.send_overhead(), Some(11));
        assert_eq!(ApiId::Tx16.send_overhead(), Some(5));
        assert_eq!(ApiId::Rx16.send_overhead(), Some(5));
        assert_eq!(ApiId::AtCommandResponse.send_overhead(), Some(5));
        assert_eq!(ApiId::TxStatus.send_overhead(), Some(3));
        assert_eq!(ApiId::AtCommand.send_overhead(), Some(4));
        assert_eq!(ApiId::AtCommandQueue.send_overhead(), Some(4));
        assert_eq!(ApiId::Io16.send_overhead(), None);
        assert_eq!(ApiId::Io64.send_overhead(), None);
    }

    #[test]
    fn status_names() {
        assert_eq!(tx_status_name(0), "SUCCESS");
        assert_eq!(tx_status_name(1), "NO_ACK");
        assert_eq!(at_status_name(2), "INVALID_COMMAND");
        assert_eq!(at_status_name(9), "UNKNOWN");
    }
}
