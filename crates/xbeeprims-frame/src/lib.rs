//! API-mode frame parsing and encoding for XBee radio modules.
//!
//! Every frame on the wire is:
//! - A start marker (`0x7E`)
//! - A 2-byte big-endian length counting the API id, header and data
//! - The API id byte and its kind-specific header and data
//! - A checksum byte making the payload sum `0xFF`
//!
//! [`FrameReader`] rebuilds frames one byte at a time without blocking;
//! [`FrameWriter`] emits them. [`Packet`] is the typed model of every kind.

pub mod accessors;
pub mod api_id;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod io_sample;
pub mod packet;
pub mod reader;
pub mod writer;

pub use accessors::{AtResponseView, Io16View, Io64View, Rx16View, Rx64View, TxStatusView};
pub use api_id::{at_status_name, tx_status_name, ApiId};
pub use checksum::Checksum;
pub use codec::{encode_packet, wire_length, Frame, LENGTH_FIELD_SIZE, MAX_PACKET_SIZE, START_MARKER};
pub use error::{FrameError, Result};
pub use io_sample::{
    IoReport, IoSample, ANALOG_CHANNELS, DIGITAL_CHANNELS, DIGITAL_HIGH, IO_CHANNELS,
};
pub use packet::{AtCommand, Packet};
pub use reader::{FrameReader, ReaderStats, RxState};
pub use writer::{write_packet, FrameWriter};
