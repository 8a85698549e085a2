use xbeeprims_transport::ByteTransport;

use crate::checksum::Checksum;
use crate::codec::{wire_length, START_MARKER};
use crate::error::Result;
use crate::packet::Packet;

/// Write one packet straight to `transport`, a byte at a time.
///
/// Each payload byte is folded into the checksum as it goes out; nothing
/// is buffered here. Returns the total number of bytes written. Kinds
/// with no outbound encoding fail before any byte is written.
pub fn write_packet<T: ByteTransport + ?Sized>(transport: &mut T, packet: &Packet) -> Result<usize> {
    let length = wire_length(packet)?;

    transport.write_byte(START_MARKER)?;
    transport.write_byte((length >> 8) as u8)?;
    transport.write_byte(length as u8)?;

    let mut checksum = Checksum::new();
    for byte in packet.payload_bytes().take(length) {
        checksum.push(byte);
        transport.write_byte(byte)?;
    }
    transport.write_byte(checksum.finalize())?;
    transport.flush()?;

    tracing::trace!(api_id = %packet.api_id(), length, "frame sent");
    Ok(length + 4)
}

/// Writes complete frames to a [`ByteTransport`].
#[derive(Debug)]
pub struct FrameWriter<T> {
    inner: T,
}

impl<T: ByteTransport> FrameWriter<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    /// Encode and send a packet (blocking).
    pub fn send(&mut self, packet: &Packet) -> Result<usize> {
        write_packet(&mut self.inner, packet)
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner transport.
    pub fn into_inner(self) -> T {
        self.inner
    }
}
