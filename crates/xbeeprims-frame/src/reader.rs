use bytes::Bytes;
use xbeeprims_transport::ByteTransport;

use crate::checksum::Checksum;
use crate::codec::{Frame, MAX_PACKET_SIZE, START_MARKER};
use crate::error::Result;

/// Position of the reader within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxState {
    AwaitStart,
    LengthHigh,
    LengthLow,
    Payload,
    Checksum,
}

/// Counters for frames seen by a [`FrameReader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Frames that passed the checksum and were handed out.
    pub frames: u64,
    /// Frames dropped because the checksum did not sum to `0xFF`.
    pub checksum_failures: u64,
    /// Frames abandoned because a start marker arrived mid-frame.
    pub resyncs: u64,
    /// Frames that validated but declared no payload.
    pub discarded: u64,
    /// Declared lengths that had to be clamped.
    pub clamped: u64,
}

/// Rebuilds frames from a byte stream, one byte at a time.
///
/// The reader never blocks: [`FrameReader::poll`] consumes whatever the
/// transport has ready and stops at the first complete frame. Bytes that
/// do not belong to a valid frame are dropped silently, so the reader
/// recovers from any amount of line noise.
#[derive(Debug, Clone)]
pub struct FrameReader {
    state: RxState,
    length: usize,
    index: usize,
    checksum: Checksum,
    buf: [u8; MAX_PACKET_SIZE],
    stats: ReaderStats,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    pub fn new() -> Self {
        Self {
            state: RxState::AwaitStart,
            length: 0,
            index: 0,
            checksum: Checksum::new(),
            buf: [0; MAX_PACKET_SIZE],
            stats: ReaderStats::default(),
        }
    }

    pub fn state(&self) -> RxState {
        self.state
    }

    /// True between frames.
    pub fn is_idle(&self) -> bool {
        self.state == RxState::AwaitStart
    }

    /// Length field of the frame in progress, after clamping.
    pub fn declared_length(&self) -> usize {
        self.length
    }

    /// Payload bytes received so far for the frame in progress.
    pub fn received(&self) -> usize {
        self.index
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    /// Drop any partial frame and wait for the next start marker.
    pub fn reset(&mut self) {
        self.state = RxState::AwaitStart;
        self.length = 0;
        self.index = 0;
        self.checksum.reset();
    }

    /// Feed one byte. Returns a frame when this byte completes one.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        if byte == START_MARKER {
            if !self.is_idle() {
                self.stats.resyncs += 1;
                tracing::debug!(
                    state = ?self.state,
                    received = self.index,
                    "start marker mid-frame, resynchronising"
                );
            }
            self.reset();
            self.state = RxState::LengthHigh;
            return None;
        }

        match self.state {
            RxState::AwaitStart => {}
            RxState::LengthHigh => {
                self.length = usize::from(byte) << 8;
                self.state = RxState::LengthLow;
            }
            RxState::LengthLow => {
                self.length |= usize::from(byte);
                if self.length > MAX_PACKET_SIZE {
                    self.stats.clamped += 1;
                    tracing::warn!(
                        declared = self.length,
                        max = MAX_PACKET_SIZE,
                        "frame length clamped"
                    );
                    self.length = MAX_PACKET_SIZE;
                }
                self.state = if self.length == 0 {
                    RxState::Checksum
                } else {
                    RxState::Payload
                };
            }
            RxState::Payload => {
                self.buf[self.index] = byte;
                self.index += 1;
                self.checksum.push(byte);
                if self.index == self.length {
                    self.state = RxState::Checksum;
                }
            }
            RxState::Checksum => {
                self.checksum.push(byte);
                return self.finish();
            }
        }
        None
    }

    /// Pull bytes from `transport` until a frame completes or no byte is
    /// ready. Partial frames carry over to the next call.
    pub fn poll<T: ByteTransport + ?Sized>(&mut self, transport: &mut T) -> Result<Option<Frame>> {
        while let Some(byte) = transport.read_byte()? {
            if let Some(frame) = self.push(byte) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn finish(&mut self) -> Option<Frame> {
        let valid = self.checksum.is_valid();
        let length = self.length;
        let payload = Bytes::copy_from_slice(&self.buf[..self.index]);
        self.reset();

        if !valid {
            self.stats.checksum_failures += 1;
            tracing::debug!(length, "frame checksum mismatch, dropped");
            return None;
        }
        if payload.is_empty() {
            self.stats.discarded += 1;
            tracing::debug!("zero-length frame dropped");
            return None;
        }

        self.stats.frames += 1;
        tracing::trace!(api_id = payload[0], length, "frame received");
        Some(Frame::from_validated(payload))
    }
}
