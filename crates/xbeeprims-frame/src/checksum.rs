//! Frame checksum: the payload bytes plus the checksum byte sum to `0xFF`.

/// Value the running total must reach for a frame to be valid.
pub const VALID_TOTAL: u8 = 0xFF;

/// Fold one byte into a running total (mod 256).
pub fn accumulate(total: u8, byte: u8) -> u8 {
    total.wrapping_add(byte)
}

/// Whether a total that includes the checksum byte is valid.
pub fn is_valid(total: u8) -> bool {
    total == VALID_TOTAL
}

/// Checksum byte to append after a payload summing to `total`.
pub fn finalize(total: u8) -> u8 {
    VALID_TOTAL.wrapping_sub(total)
}

/// Running checksum accumulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Checksum {
    total: u8,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, byte: u8) {
        self.total = accumulate(self.total, byte);
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    pub fn total(&self) -> u8 {
        self.total
    }

    pub fn is_valid(&self) -> bool {
        is_valid(self.total)
    }

    pub fn finalize(&self) -> u8 {
        finalize(self.total)
    }

    pub fn reset(&mut self) {
        self.total = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_wraps() {
        assert_eq!(accumulate(0xF0, 0x20), 0x10);
        assert_eq!(accumulate(0x00, 0xFF), 0xFF);
    }

    #[test]
    fn finalize_completes_total() {
        assert_eq!(finalize(0x00), 0xFF);
        assert_eq!(finalize(0xFF), 0x00);
        assert_eq!(finalize(0x10), 0xEF);
    }

    #[test]
    fn appended_checksum_always_validates() {
        let sequences: [&[u8]; 5] = [
            b"",
            &[0x00],
            &[0xFF, 0xFF, 0xFF],
            &[0x08, 0x01, b'I', b'R', 0x14],
            &[0x7E; 64],
        ];

        for seq in sequences {
            let mut sum = Checksum::new();
            sum.extend(seq);
            let check = sum.finalize();
            sum.push(check);
            assert!(sum.is_valid(), "sequence {seq:02X?}");
        }
    }

    #[test]
    fn known_frame_checksum() {
        // AT command "DL" with frame id 0x52 (vendor manual example).
        let mut sum = Checksum::new();
        sum.extend(&[0x08, 0x52, b'D', b'L']);
        assert_eq!(sum.finalize(), 0x15);
    }

    #[test]
    fn corrupted_byte_fails() {
        let mut sum = Checksum::new();
        sum.extend(&[0x08, 0x52, b'D', b'L']);
        let check = sum.finalize();

        let mut corrupt = Checksum::new();
        corrupt.extend(&[0x08, 0x53, b'D', b'L']);
        corrupt.push(check);
        assert!(!corrupt.is_valid());

        corrupt.reset();
        assert_eq!(corrupt.total(), 0);
    }
}
