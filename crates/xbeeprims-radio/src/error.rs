use std::time::Duration;

/// Errors that can occur in radio operations.
#[derive(Debug, thiserror::Error)]
pub enum RadioError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] xbeeprims_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] xbeeprims_frame::FrameError),

    /// The radio has been deactivated.
    #[error("radio is not active")]
    Inactive,

    /// Channel outside the 802.15.4 range the module supports.
    #[error("channel 0x{0:02X} out of range (0x0B..=0x1A)")]
    InvalidChannel(u8),

    /// The pin cannot take the requested mode.
    #[error("pin D{pin} does not support {mode}")]
    InvalidIoMode { pin: usize, mode: crate::config::IoMode },

    /// No frame arrived in time.
    #[error("no frame received within {0:?}")]
    Timeout(Duration),
}

pub type Result<T> = std::result::Result<T, RadioError>;
