//! Configuration resolution.
//!
//! Each setting is taken from the first source that has it:
//! flag or `DVSTORE_*` environment variable, then the config file, then the
//! default. A file key matches the flag name (`http-address`), its
//! snake_case form (`http_address`) or its dotted form (`http.address`,
//! nested tables).

use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use crate::config::flags::Flags;
use crate::config::schema::DvStoreConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::observability::logging::LogConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config file {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {flag}: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: String,
    },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read the config file. A missing file is not an error.
pub fn load_file(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Resolve flags, config file and defaults into a validated configuration.
pub fn resolve(flags: &Flags) -> Result<DvStoreConfig, ConfigError> {
    let file = load_file(&flags.config_file)?;
    let sources = Sources { file: file.as_ref() };
    let defaults = DvStoreConfig::default();

    let config = DvStoreConfig {
        http_address: sources
            .value("http-address", &flags.http_address)
            .unwrap_or(defaults.http_address),
        log: LogConfig {
            format: sources
                .parse("log-format", &flags.log_format)?
                .unwrap_or(defaults.log.format),
            level: sources
                .parse("log-level", &flags.log_level)?
                .unwrap_or(defaults.log.level),
        },
        metrics_address: sources
            .value("metrics-address", &flags.metrics_address)
            .unwrap_or(defaults.metrics_address),
        store_path: sources
            .value("store-path", &flags.store_path)
            .unwrap_or(defaults.store_path),
        request_timeout_secs: sources
            .parse("request-timeout", &flags.request_timeout)?
            .unwrap_or(defaults.request_timeout_secs),
        max_body_size: sources
            .parse("max-body-size", &flags.max_body_size)?
            .unwrap_or(defaults.max_body_size),
    };

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

struct Sources<'a> {
    file: Option<&'a toml::Table>,
}

impl Sources<'_> {
    fn value(&self, flag: &'static str, explicit: &Option<String>) -> Option<String> {
        explicit.clone().or_else(|| self.file.and_then(|table| file_value(table, flag)))
    }

    fn parse<T>(&self, flag: &'static str, explicit: &Option<String>) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.value(flag, explicit)
            .map(|value| {
                value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
                    flag,
                    reason: e.to_string(),
                    value,
                })
            })
            .transpose()
    }
}

fn file_value(table: &toml::Table, flag: &str) -> Option<String> {
    let candidates = [
        flag.to_string(),
        flag.replace('-', "_"),
        flag.replace(['-', '_'], "."),
    ];
    candidates
        .iter()
        .find_map(|key| lookup(table, key))
        .map(|value| match value {
            toml::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}

fn lookup<'a>(table: &'a toml::Table, key: &str) -> Option<&'a toml::Value> {
    let mut segments = key.split('.');
    let mut value = table.get(segments.next()?)?;
    for segment in segments {
        value = value.as_table()?.get(segment)?;
    }
    Some(value)
}
