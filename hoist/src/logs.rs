//! Logging configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt as log_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::HoistError;

/// Fallback verbosity when `RUST_LOG` is unset.
///
/// Written as its lowercase name in `hoist.json`; `warning` is accepted for `warn`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Trace,
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    fn name(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogLevel {
    type Err = HoistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted == "warning" {
            return Ok(LogLevel::Warn);
        }
        Self::ALL
            .into_iter()
            .find(|level| level.name() == wanted)
            .ok_or_else(|| HoistError::ConfigError(format!("invalid log level {:?}", s)))
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.to_string()
    }
}

impl TryFrom<String> for LogLevel {
    type Error = HoistError;

    fn try_from(s: String) -> Result<Self, HoistError> {
        s.parse()
    }
}

/// Logging options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: LogLevel,

    /// Emit JSON lines instead of human-readable output
    pub json_format: bool,

    /// Write to stderr so stdout stays free for command output
    pub stderr: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            json_format: false,
            stderr: true,
        }
    }
}

/// Initialize logging
pub fn init_logging(options: LogOptions) -> Result<(), HoistError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.log_level.to_string()));

    let subscriber = tracing_subscriber::registry().with(filter);

    match (options.json_format, options.stderr) {
        (true, true) => subscriber
            .with(log_fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        (true, false) => subscriber.with(log_fmt::layer().json()).try_init(),
        (false, true) => subscriber
            .with(log_fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        (false, false) => subscriber.with(log_fmt::layer()).try_init(),
    }
    .map_err(|e| HoistError::ConfigError(e.to_string()))
}
