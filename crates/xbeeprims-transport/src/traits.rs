use std::time::Duration;

use crate::error::Result;

/// The byte-level link to a radio module.
///
/// Reads never block: `read_byte` returns `Ok(None)` when nothing is
/// buffered. Writes block until the byte is handed to the link.
pub trait ByteTransport {
    /// Read the next immediately available byte, if any.
    fn read_byte(&mut self) -> Result<Option<u8>>;

    /// Write a single byte (blocking).
    fn write_byte(&mut self, byte: u8) -> Result<()>;

    /// Write every byte of `bytes` (blocking).
    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    /// Flush anything the link buffers internally.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Sleep for `ms` milliseconds (guard time, receive poll interval).
    fn sleep_ms(&mut self, ms: u64) {
        std::thread::sleep(Duration::from_millis(ms));
    }
}

impl<T: ByteTransport + ?Sized> ByteTransport for &mut T {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        (**self).read_byte()
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        (**self).write_byte(byte)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_all(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn sleep_ms(&mut self, ms: u64) {
        (**self).sleep_ms(ms)
    }
}
