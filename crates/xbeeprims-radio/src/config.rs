use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;

/// Silence required around `+++` before the module enters command mode.
pub const DEFAULT_GUARD_TIME: Duration = Duration::from_millis(1025);

/// `AP` value selecting API mode without escaping.
pub const DEFAULT_API_MODE: u8 = 1;

/// Delay between receive polls while waiting for a frame.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Configurable I/O pins, `D0` through `D8`.
pub const IO_PINS: usize = 9;

/// Pins `D0`..`D5` double as ADC inputs.
pub const ANALOG_CAPABLE_PINS: usize = 6;

/// Channels accepted by `CH`.
pub const CHANNEL_RANGE: RangeInclusive<u8> = 0x0B..=0x1A;

/// Radio context configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioConfig {
    /// Guard time slept after `+++`.
    pub guard_time: Duration,
    /// Value written with `ATAP` when switching to API mode.
    pub api_mode: u8,
    /// Sleep between polls in [`crate::Radio::wait_for_frame`].
    pub poll_interval: Duration,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            guard_time: DEFAULT_GUARD_TIME,
            api_mode: DEFAULT_API_MODE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Function of one I/O pin, as set with `D0`..`D8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IoMode {
    Disabled = 0,
    AnalogIn = 2,
    DigitalIn = 3,
    DigitalOutLow = 4,
    DigitalOutHigh = 5,
}

impl IoMode {
    /// Parameter byte sent with the `Dn` command.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Whether `pin` can be put in this mode.
    pub fn supported_on(self, pin: usize) -> bool {
        match self {
            IoMode::AnalogIn => pin < ANALOG_CAPABLE_PINS,
            _ => pin < IO_PINS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IoMode::Disabled => "disabled",
            IoMode::AnalogIn => "analog-in",
            IoMode::DigitalIn => "digital-in",
            IoMode::DigitalOutLow => "digital-out-low",
            IoMode::DigitalOutHigh => "digital-out-high",
        }
    }
}

impl fmt::Display for IoMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for IoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disabled" | "off" => Ok(IoMode::Disabled),
            "analog-in" | "analog" | "adc" => Ok(IoMode::AnalogIn),
            "digital-in" | "input" | "in" => Ok(IoMode::DigitalIn),
            "digital-out-low" | "low" => Ok(IoMode::DigitalOutLow),
            "digital-out-high" | "high" => Ok(IoMode::DigitalOutHigh),
            other => Err(format!(
                "unknown I/O mode '{other}' (expected disabled, analog-in, digital-in, digital-out-low or digital-out-high)"
            )),
        }
    }
}
