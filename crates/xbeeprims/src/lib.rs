//! API-mode framing and radio control for XBee modules.
//!
//! xbeeprims parses and builds the binary frames XBee radios exchange in
//! API mode, over any byte transport, and wraps a module in an owned
//! radio context.
//!
//! # Crate Structure
//!
//! - [`transport`]: Byte transport trait, stream adapter, serial port, in-memory buffer
//! - [`frame`]: Incremental frame reader, writer, packet model and I/O sample decoding
//! - [`radio`]: Owned radio context with API-mode switch and AT helpers (behind `radio` feature)

/// Re-export transport types.
pub mod transport {
    pub use xbeeprims_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use xbeeprims_frame::*;
}

/// Re-export radio types (requires `radio` feature).
#[cfg(feature = "radio")]
pub mod radio {
    pub use xbeeprims_radio::*;
}
