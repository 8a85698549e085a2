//! I/O sample decoding.
//!
//! The sample region of an I/O frame is shaped by the 16-bit channel
//! indicator. Bits 0-8 flag digital channels and share a single 2-byte
//! state word per sample set; bits 9-14 flag analog channels and each
//! carry their own 2-byte big-endian reading.

use crate::accessors::require_len;
use crate::error::Result;

/// Digital-capable channels (indicator bits 0-8).
pub const DIGITAL_CHANNELS: usize = 9;

/// Analog-capable channels (indicator bits 9-14).
pub const ANALOG_CHANNELS: usize = 6;

/// Total indicator positions.
pub const IO_CHANNELS: usize = DIGITAL_CHANNELS + ANALOG_CHANNELS;

/// Value reported for a digital channel that reads high.
pub const DIGITAL_HIGH: u16 = 1023;

/// One decoded sample set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoSample {
    pub digital: [u16; DIGITAL_CHANNELS],
    pub analog: [u16; ANALOG_CHANNELS],
}

impl IoSample {
    /// Value at an indicator position (0-8 digital, 9-14 analog).
    pub fn channel(&self, position: usize) -> Option<u16> {
        if position < DIGITAL_CHANNELS {
            Some(self.digital[position])
        } else {
            self.analog.get(position - DIGITAL_CHANNELS).copied()
        }
    }

    /// All 15 positions in indicator order.
    pub fn channels(&self) -> [u16; IO_CHANNELS] {
        let mut out = [0u16; IO_CHANNELS];
        out[..DIGITAL_CHANNELS].copy_from_slice(&self.digital);
        out[DIGITAL_CHANNELS..].copy_from_slice(&self.analog);
        out
    }
}

/// Decoded sample region of an I/O frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IoReport {
    pub sample_count: u8,
    pub channel_indicators: u16,
    pub samples: Vec<IoSample>,
}

impl IoReport {
    /// True if indicator bit `position` is set.
    pub fn is_enabled(&self, position: usize) -> bool {
        position < IO_CHANNELS && self.channel_indicators & (1 << position) != 0
    }

    /// The first sample set.
    pub fn first(&self) -> Option<&IoSample> {
        self.samples.first()
    }
}

/// Decode one sample set from the front of `data`.
///
/// Returns the sample and the number of bytes consumed.
pub fn decode_sample(indicators: u16, data: &[u8]) -> Result<(IoSample, usize)> {
    let mut sample = IoSample::default();
    let mut offset = 0;
    let mut digital_word: Option<u16> = None;

    for position in 0..IO_CHANNELS {
        if indicators & (1 << position) == 0 {
            continue;
        }

        if position < DIGITAL_CHANNELS {
            let word = match digital_word {
                Some(word) => word,
                None => {
                    let word = take_u16(data, offset)?;
                    offset += 2;
                    digital_word = Some(word);
                    word
                }
            };
            if word & (1 << position) != 0 {
                sample.digital[position] = DIGITAL_HIGH;
            }
        } else {
            sample.analog[position - DIGITAL_CHANNELS] = take_u16(data, offset)?;
            offset += 2;
        }
    }

    Ok((sample, offset))
}

/// Decode `sample_count` sample sets (at least one).
pub fn decode_report(sample_count: u8, indicators: u16, data: &[u8]) -> Result<IoReport> {
    let sets = usize::from(sample_count.max(1));
    let mut samples = Vec::with_capacity(sets);
    let mut offset = 0;

    for _ in 0..sets {
        let (sample, used) = decode_sample(indicators, &data[offset..])?;
        samples.push(sample);
        offset += used;
    }

    Ok(IoReport {
        sample_count,
        channel_indicators: indicators,
        samples,
    })
}

fn take_u16(data: &[u8], offset: usize) -> Result<u16> {
    require_len(data, offset + 2)?;
    Ok(u16::from_be_bytes([data[offset], data[offset + 1]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FrameError;

    #[test]
    fn single_digital_channel() {
        let (sample, used) = decode_sample(0x0001, &[0x00, 0x01]).unwrap();

        assert_eq!(used, 2);
        assert_eq!(sample.channel(0), Some(DIGITAL_HIGH));
        for position in 1..IO_CHANNELS {
            assert_eq!(sample.channel(position), Some(0), "channel {position}");
        }
    }

    #[test]
    fn digital_word_is_read_once() {
        // DIO0, DIO3 and DIO8 enabled; word has DIO3 and DIO8 high.
        let indicators = 0b1_0000_1001;
        let (sample, used) = decode_sample(indicators, &[0x01, 0x08]).unwrap();

        assert_eq!(used, 2);
        assert_eq!(sample.digital[0], 0);
        assert_eq!(sample.digital[3], DIGITAL_HIGH);
        assert_eq!(sample.digital[8], DIGITAL_HIGH);
    }

    #[test]
    fn zero_digital_word_is_not_reread() {
        let indicators = 0b11 | (1 << 9);
        let (sample, used) = decode_sample(indicators, &[0x00, 0x00, 0x01, 0x23]).unwrap();

        assert_eq!(used, 4);
        assert_eq!(sample.digital, [0; DIGITAL_CHANNELS]);
        assert_eq!(sample.analog[0], 0x0123);
    }

    #[test]
    fn digital_bit_without_indicator_stays_low() {
        // Only DIO1 enabled; word also reports DIO0 high.
        let (sample, _) = decode_sample(0x0002, &[0x00, 0x03]).unwrap();
        assert_eq!(sample.digital[0], 0);
        assert_eq!(sample.digital[1], DIGITAL_HIGH);
    }

    #[test]
    fn analog_channels_remap_to_their_own_slots() {
        // ADC0 and ADC5.
        let indicators = (1 << 9) | (1 << 14);
        let (sample, used) = decode_sample(indicators, &[0x02, 0x00, 0x03, 0xFF]).unwrap();

        assert_eq!(used, 4);
        assert_eq!(sample.analog[0], 0x0200);
        assert_eq!(sample.analog[5], 0x03FF);
        assert_eq!(sample.channel(9), Some(0x0200));
        assert_eq!(sample.channel(14), Some(0x03FF));
        assert_eq!(sample.digital, [0; DIGITAL_CHANNELS]);
        assert_eq!(sample.channel(IO_CHANNELS), None);
    }

    #[test]
    fn mixed_digital_and_analog() {
        let indicators = 0x0001 | (1 << 10);
        let (sample, used) = decode_sample(indicators, &[0x00, 0x01, 0x00, 0x40]).unwrap();

        assert_eq!(used, 4);
        let channels = sample.channels();
        assert_eq!(channels[0], DIGITAL_HIGH);
        assert_eq!(channels[10], 0x0040);
    }

    #[test]
    fn empty_indicator_consumes_nothing() {
        let (sample, used) = decode_sample(0, &[]).unwrap();
        assert_eq!(used, 0);
        assert_eq!(sample, IoSample::default());
    }

    #[test]
    fn truncated_sample_is_an_error() {
        let err = decode_sample(1 << 9, &[0x01]).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { needed: 2, actual: 1 }));
    }

    #[test]
    fn report_decodes_every_set() {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00, 0x01];
        let report = decode_report(3, 0x0001, &data).unwrap();

        assert_eq!(report.samples.len(), 3);
        assert_eq!(report.samples[0].digital[0], DIGITAL_HIGH);
        assert_eq!(report.samples[1].digital[0], 0);
        assert_eq!(report.samples[2].digital[0], DIGITAL_HIGH);
        assert!(report.is_enabled(0));
        assert!(!report.is_enabled(1));
    }

    #[test]
    fn report_with_zero_count_decodes_one_set() {
        let report = decode_report(0, 0x0001, &[0x00, 0x01]).unwrap();
        assert_eq!(report.samples.len(), 1);
        assert_eq!(report.first().map(|s| s.digital[0]), Some(DIGITAL_HIGH));
    }

    #[test]
    fn report_short_on_later_set_fails() {
        let err = decode_report(2, 0x0001, &[0x00, 0x01, 0x00]).unwrap_err();
        assert!(matches!(err, FrameError::Truncated { .. }));
    }
}
