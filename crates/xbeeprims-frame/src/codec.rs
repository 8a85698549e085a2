use bytes::{BufMut, Bytes, BytesMut};

use crate::api_id::ApiId;
use crate::checksum::Checksum;
use crate::error::{FrameError, Result};
use crate::packet::Packet;

/// Byte that opens every frame.
pub const START_MARKER: u8 = 0x7E;

/// Size of the big-endian length field.
pub const LENGTH_FIELD_SIZE: usize = 2;

/// Ceiling on the payload (API id + header + data) of a single frame.
pub const MAX_PACKET_SIZE: usize = 100;

/// A complete, checksum-validated frame payload.
///
/// The payload starts with the API id byte; its length is the frame's
/// declared length. Fields are read through the typed accessors in
/// [`crate::accessors`] or by converting to a [`Packet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Bytes,
}

impl Frame {
    /// Wrap a payload that has already been validated.
    pub(crate) fn from_validated(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Build a frame from a raw payload (API id first).
    pub fn from_payload(payload: impl Into<Bytes>) -> Result<Self> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(FrameError::EmptyFrame);
        }
        if payload.len() > MAX_PACKET_SIZE {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PACKET_SIZE,
            });
        }
        Ok(Self { payload })
    }

    /// The raw API id byte.
    pub fn api_id_byte(&self) -> u8 {
        self.payload[0]
    }

    /// The message kind, if the API id is known.
    pub fn api_id(&self) -> Option<ApiId> {
        ApiId::from_byte(self.api_id_byte())
    }

    /// Declared length: API id + header + data.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Always false; a frame holds at least its API id.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The payload, API id first.
    pub fn payload(&self) -> &[u8] {
        self.payload.as_ref()
    }

    /// Zero-copy view of the payload from `offset` on.
    pub(crate) fn tail(&self, offset: usize) -> Bytes {
        self.payload.slice(offset.min(self.payload.len())..)
    }

    /// Total bytes on the wire (marker + length + payload + checksum).
    pub fn wire_size(&self) -> usize {
        1 + LENGTH_FIELD_SIZE + self.payload.len() + 1
    }
}

/// Length field value for `packet`: overhead of its kind plus its data.
pub fn wire_length(packet: &Packet) -> Result<usize> {
    let kind = packet.api_id();
    let overhead = kind
        .send_overhead()
        .ok_or(FrameError::UnsupportedKind(kind))?;
    let length = if kind.is_fixed_size() {
        overhead
    } else {
        overhead + packet.data().len()
    };

    if length > MAX_PACKET_SIZE {
        return Err(FrameError::PayloadTooLarge {
            size: length,
            max: MAX_PACKET_SIZE,
        });
    }
    Ok(length)
}

/// Encode a packet into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬──────────────┬────────┬────────────────┬──────────┐
/// │ 0x7E   │ Length (2B)  │ API id │ Header + data  │ Checksum │
/// │        │ big-endian   │ (1B)   │ (Length-1 B)   │ (1B)     │
/// └────────┴──────────────┴────────┴────────────────┴──────────┘
/// ```
pub fn encode_packet(packet: &Packet, dst: &mut BytesMut) -> Result<()> {
    let length = wire_length(packet)?;
    dst.reserve(length + 4);
    dst.put_u8(START_MARKER);
    dst.put_u16(length as u16);

    let mut checksum = Checksum::new();
    for byte in packet.payload_bytes().take(length) {
        checksum.push(byte);
        dst.put_u8(byte);
    }
    dst.put_u8(checksum.finalize());
    Ok(())
}
