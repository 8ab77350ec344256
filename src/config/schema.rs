//! Configuration schema.
//!
//! The resolved, validated configuration of one `dvstore` process.

use std::time::Duration;

use crate::observability::logging::LogConfig;

/// Rendered value of one setting, as logged at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    Single(String),
    /// A repeatable setting; each value is redacted on its own.
    List(Vec<String>),
}

impl From<String> for FlagValue {
    fn from(value: String) -> Self {
        FlagValue::Single(value)
    }
}

/// Root configuration for the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DvStoreConfig {
    /// HTTP listen address (e.g., "localhost:8080").
    pub http_address: String,

    /// Log format and level.
    pub log: LogConfig,

    /// Prometheus scrape address; empty disables metrics.
    pub metrics_address: String,

    /// JSON snapshot file for definitions; empty keeps them in memory only.
    pub store_path: String,

    /// Per-request deadline in seconds.
    pub request_timeout_secs: u64,

    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
}

impl Default for DvStoreConfig {
    fn default() -> Self {
        Self {
            http_address: "localhost:8080".to_string(),
            log: LogConfig::default(),
            metrics_address: String::new(),
            store_path: String::new(),
            request_timeout_secs: 30,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

impl DvStoreConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Flag name and rendered value of every setting, alphabetically.
    pub fn flag_values(&self) -> Vec<(&'static str, FlagValue)> {
        vec![
            ("http-address", self.http_address.clone().into()),
            ("log-format", self.log.format.to_string().into()),
            ("log-level", self.log.level.to_string().into()),
            ("max-body-size", self.max_body_size.to_string().into()),
            ("metrics-address", self.metrics_address.clone().into()),
            ("request-timeout", self.request_timeout_secs.to_string().into()),
            ("store-path", self.store_path.clone().into()),
        ]
    }
}
