use clap::{Args, Subcommand, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use xbeeprims_radio::{Radio, RadioConfig};
use xbeeprims_transport::StreamTransport;

use crate::exit::{radio_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod configure;
pub mod decode;
pub mod encode;
pub mod monitor;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a frame and print its wire bytes.
    Encode(EncodeArgs),
    /// Parse frames from hex text and print them.
    Decode(DecodeArgs),
    /// Print frames received on a serial device.
    Monitor(MonitorArgs),
    /// Send configuration commands to a module.
    Configure(ConfigureArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Configure(args) => configure::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EncodeKind {
    /// Transmit to a 16-bit address.
    Tx16,
    /// Transmit to a 64-bit address.
    Tx64,
    /// AT command, applied immediately.
    At,
    /// AT command, queued until applied.
    AtQueue,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Frame kind to build.
    pub kind: EncodeKind,
    /// Frame id (0 suppresses the module's reply).
    #[arg(long, default_value = "1")]
    pub frame_id: u8,
    /// Destination address, decimal or 0x-prefixed (tx16/tx64).
    #[arg(long)]
    pub dest: Option<String>,
    /// Transmit options byte (tx16/tx64).
    #[arg(long, default_value = "0")]
    pub options: u8,
    /// Two-character AT command (at/at-queue).
    #[arg(long)]
    pub command: Option<String>,
    /// Text data or AT parameter.
    #[arg(long, conflicts_with = "hex")]
    pub data: Option<String>,
    /// Hex data or AT parameter.
    #[arg(long, conflicts_with = "data")]
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex text holding one or more frames. Read from stdin when omitted.
    #[arg(conflicts_with = "file")]
    pub input: Option<String>,
    /// Read hex text from a file.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Treat the input as raw bytes instead of hex text.
    #[arg(long)]
    pub binary: bool,
    /// Print reader counters after the frames.
    #[arg(long)]
    pub stats: bool,
}

#[derive(Args, Debug)]
pub struct SerialArgs {
    /// Serial device path.
    #[arg(env = "XBEEPRIMS_DEVICE")]
    pub device: PathBuf,
    /// Line speed.
    #[arg(long, default_value = "9600")]
    pub baud: u32,
    /// Switch the module into API mode first (+++, guard time, ATAP).
    #[arg(long)]
    pub api_mode: bool,
    /// Guard time around +++ (e.g. 1025ms, 2s).
    #[arg(long, default_value = "1025ms")]
    pub guard_time: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// Only print frames of these API ids (comma-separated, e.g. 0x81,0x83).
    #[arg(long, value_delimiter = ',')]
    pub kinds: Option<Vec<String>>,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    #[command(flatten)]
    pub serial: SerialArgs,
    /// PAN id (ID).
    #[arg(long)]
    pub pan_id: Option<String>,
    /// RF channel, 0x0B through 0x1A (CH).
    #[arg(long)]
    pub channel: Option<String>,
    /// 16-bit source address (MY).
    #[arg(long)]
    pub address: Option<String>,
    /// Sample rate in milliseconds (IR).
    #[arg(long)]
    pub sample_rate: Option<u16>,
    /// Modes for D0..D8 (comma-separated: off, adc, in, low, high).
    #[arg(long, value_delimiter = ',')]
    pub ios: Option<Vec<String>>,
    /// Persist the configuration (WR).
    #[arg(long)]
    pub write: bool,
    /// Wait for each command's response and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for each response (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) type SerialRadio = Radio<StreamTransport<File>>;

/// Open the device, wrap it in a radio and optionally switch to API mode.
pub(crate) fn open_radio(args: &SerialArgs) -> CliResult<SerialRadio> {
    let config = RadioConfig {
        guard_time: parse_duration(&args.guard_time)?,
        ..RadioConfig::default()
    };
    let transport = open_serial(args)?;
    let mut radio = Radio::with_config(transport, config);
    if args.api_mode {
        radio
            .enter_api_mode()
            .map_err(|err| radio_error("API mode switch failed", err))?;
    }
    Ok(radio)
}

#[cfg(unix)]
fn open_serial(args: &SerialArgs) -> CliResult<StreamTransport<File>> {
    use xbeeprims_transport::{SerialConfig, SerialPort};

    SerialPort::open_with_config(&args.device, SerialConfig { baud: args.baud })
        .map_err(|err| crate::exit::transport_error("open failed", err))
}

#[cfg(not(unix))]
fn open_serial(args: &SerialArgs) -> CliResult<StreamTransport<File>> {
    Err(CliError::new(
        crate::exit::FAILURE,
        format!(
            "serial devices are only supported on unix ({})",
            args.device.display()
        ),
    ))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

pub(crate) fn parse_number<T: TryFrom<u64>>(flag: &str, text: &str) -> CliResult<T> {
    let value = crate::hex::parse_int(text)
        .map_err(|err| CliError::new(USAGE, format!("--{flag}: {err}")))?;
    T::try_from(value).map_err(|_| CliError::new(USAGE, format!("--{flag}: {text} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("1025ms").unwrap(), Duration::from_millis(1025));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }

    #[test]
    fn parse_number_checks_width() {
        assert_eq!(parse_number::<u16>("pan-id", "0x3332").unwrap(), 0x3332);
        assert_eq!(parse_number::<u8>("channel", "12").unwrap(), 12);
        let err = parse_number::<u8>("channel", "0x100").unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
