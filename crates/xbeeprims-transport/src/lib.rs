//! Byte-stream transport abstraction for XBee API-mode radios.
//!
//! The frame layer only needs three primitives from the link to the radio
//! module: a non-blocking "next available byte", a blocking "write byte",
//! and a millisecond sleep. [`ByteTransport`] captures exactly that.
//!
//! Provided implementations:
//! - [`StreamTransport`] over any non-blocking `Read + Write` stream
//! - [`SerialPort`] for tty devices (Unix)
//! - [`BufferTransport`] for tests and offline decoding

pub mod buffer;
pub mod error;
pub mod stream;
pub mod traits;

#[cfg(unix)]
pub mod serial;

pub use buffer::BufferTransport;
pub use error::{Result, TransportError};
pub use stream::StreamTransport;
pub use traits::ByteTransport;

#[cfg(unix)]
pub use serial::{SerialConfig, SerialPort, DEFAULT_BAUD};
