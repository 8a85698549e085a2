use std::collections::VecDeque;

use crate::error::Result;
use crate::traits::ByteTransport;

/// In-memory transport: a receive queue, a transmit log and a record of
/// requested sleeps. Sleeping is recorded, never performed.
#[derive(Debug, Default, Clone)]
pub struct BufferTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    sleeps: Vec<u64>,
}

impl BufferTransport {
    /// Create an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose receive queue holds `bytes`.
    pub fn with_incoming(bytes: impl AsRef<[u8]>) -> Self {
        let mut transport = Self::new();
        transport.feed(bytes);
        transport
    }

    /// Append bytes to the receive queue.
    pub fn feed(&mut self, bytes: impl AsRef<[u8]>) {
        self.rx.extend(bytes.as_ref().iter().copied());
    }

    /// Bytes still waiting to be read.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Take the transmit log, leaving it empty.
    pub fn take_written(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    /// Sleep durations requested so far, in milliseconds.
    pub fn sleeps(&self) -> &[u64] {
        &self.sleeps
    }
}

impl ByteTransport for BufferTransport {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        Ok(self.rx.pop_front())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.tx.push(byte);
        Ok(())
    }

    fn sleep_ms(&mut self, ms: u64) {
        self.sleeps.push(ms);
    }
}
