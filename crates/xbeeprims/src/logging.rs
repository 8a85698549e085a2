use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "XBEEPRIMS_LOG";

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// Flag value first, then `XBEEPRIMS_LOG`, then `warn`.
    pub fn resolve(flag: Option<LogLevel>, env: Option<&str>) -> LogLevel {
        flag.or_else(|| env.and_then(|value| LogLevel::from_str(value.trim(), true).ok()))
            .unwrap_or(LogLevel::Warn)
    }
}

/// Install the stderr subscriber. Stdout is reserved for frame output.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false);

    let installed = match format {
        LogFormat::Text => builder.compact().with_target(false).try_init(),
        LogFormat::Json => builder.json().flatten_event(true).try_init(),
    };
    if installed.is_err() {
        eprintln!("warning: logging already initialised");
    }
}
