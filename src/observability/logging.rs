//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from the log configuration
//! - Parse the `log-format` and `log-level` flags
//!
//! # Design Decisions
//! - `console` for development, `logfmt` for plain text collectors,
//!   `json` for machine parsing
//! - `RUST_LOG` overrides the configured level when set

use std::error::Error as StdError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{fmt as layer_fmt, layer::SubscriberExt, EnvFilter};

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown {kind} {value:?}, expected one of {expected}")]
pub struct ParseLogError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Console,
    Logfmt,
    Json,
}

impl FromStr for LogFormat {
    type Err = ParseLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "console" => Ok(Self::Console),
            "logfmt" => Ok(Self::Logfmt),
            "json" => Ok(Self::Json),
            _ => Err(ParseLogError {
                kind: "log format",
                value: s.to_string(),
                expected: "console, logfmt, json",
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Console => "console",
            Self::Logfmt => "logfmt",
            Self::Json => "json",
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ParseLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ParseLogError {
                kind: "log level",
                value: s.to_string(),
                expected: "debug, info, warn, error",
            }),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Log output settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

/// Install the global tracing subscriber.
pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.to_string()));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Console => registry.with(layer_fmt::layer()).try_init(),
        LogFormat::Logfmt => registry
            .with(layer_fmt::layer().compact().with_ansi(false))
            .try_init(),
        LogFormat::Json => registry
            .with(layer_fmt::layer().json().flatten_event(true).with_current_span(true))
            .try_init(),
    }
}

/// Render an error and all of its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}
