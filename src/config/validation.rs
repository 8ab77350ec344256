//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Pure function: DvStoreConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::DvStoreConfig;

/// Longest accepted request deadline, one day.
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{flag} must not be empty")]
    Empty { flag: &'static str },

    #[error("{flag} {value:?} is not a host:port address")]
    InvalidAddress { flag: &'static str, value: String },

    #[error("{flag} must be greater than zero")]
    Zero { flag: &'static str },

    #[error("{flag} must be at most {max}")]
    TooLarge { flag: &'static str, max: u64 },
}

pub fn validate_config(config: &DvStoreConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.http_address.is_empty() {
        errors.push(ValidationError::Empty { flag: "http-address" });
    } else if !is_host_port(&config.http_address) {
        errors.push(ValidationError::InvalidAddress {
            flag: "http-address",
            value: config.http_address.clone(),
        });
    }

    if !config.metrics_address.is_empty() && !is_host_port(&config.metrics_address) {
        errors.push(ValidationError::InvalidAddress {
            flag: "metrics-address",
            value: config.metrics_address.clone(),
        });
    }

    if config.request_timeout_secs == 0 {
        errors.push(ValidationError::Zero { flag: "request-timeout" });
    } else if config.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
        errors.push(ValidationError::TooLarge {
            flag: "request-timeout",
            max: MAX_REQUEST_TIMEOUT_SECS,
        });
    }

    if config.max_body_size == 0 {
        errors.push(ValidationError::Zero { flag: "max-body-size" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a numeric port; an empty host means all interfaces.
fn is_host_port(value: &str) -> bool {
    value
        .rsplit_once(':')
        .is_some_and(|(_, port)| port.parse::<u16>().is_ok())
}
