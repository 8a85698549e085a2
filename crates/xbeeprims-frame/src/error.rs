use crate::api_id::ApiId;

/// Errors that can occur while encoding frames or reading their fields.
///
/// Checksum failures and resynchronisation are not errors: the reader
/// absorbs them and simply reports no frame.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The transport failed while reading or writing frame bytes.
    #[error("frame transport error: {0}")]
    Transport(#[from] xbeeprims_transport::TransportError),

    /// The API id byte does not name a known message kind.
    #[error("unknown API id 0x{0:02X}")]
    UnknownApiId(u8),

    /// A typed accessor was used on a frame of another kind.
    #[error("expected {expected} frame, got API id 0x{actual:02X}")]
    KindMismatch { expected: &'static str, actual: u8 },

    /// The payload is shorter than the fixed layout of its kind requires.
    #[error("frame payload truncated ({actual} bytes, need {needed})")]
    Truncated { needed: usize, actual: usize },

    /// The encoded payload would exceed the maximum packet size.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// The kind has no outbound encoding.
    #[error("{0} frames cannot be sent")]
    UnsupportedKind(ApiId),

    /// AT command names are exactly two printable ASCII characters.
    #[error("invalid AT command {0:?} (expected two ASCII characters)")]
    InvalidCommand(String),

    /// A frame must carry at least its API id.
    #[error("empty frame payload")]
    EmptyFrame,
}

pub type Result<T> = std::result::Result<T, FrameError>;
