//! High-level radio management for XBee modules in API mode.
//!
//! [`Radio`] owns the transport, the frame reader and the frame-id
//! counter. Switch the module into API mode, send packets, poll for
//! inbound frames and push configuration with the AT helpers.

pub mod config;
pub mod error;
pub mod radio;

pub use config::{
    IoMode, RadioConfig, ANALOG_CAPABLE_PINS, CHANNEL_RANGE, DEFAULT_API_MODE, DEFAULT_GUARD_TIME,
    DEFAULT_POLL_INTERVAL, IO_PINS,
};
pub use error::{RadioError, Result};
pub use radio::Radio;
