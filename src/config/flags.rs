//! Command line flags.
//!
//! Every flag can also be set through a `DVSTORE_`-prefixed environment
//! variable; an explicit flag wins. Unset flags fall back to the config file
//! and then to defaults, see [`crate::config::loader::resolve`].

use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_CONFIG_FILE: &str = "dvstore.toml";

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "dvstore")]
#[command(version, about = "DVStore - API for storing and retrieving DV cluster data", long_about = None)]
pub struct Flags {
    /// Config file; ignored when it does not exist
    #[arg(long, env = "DVSTORE_CONFIG_FILE", default_value = DEFAULT_CONFIG_FILE)]
    pub config_file: PathBuf,

    /// HTTP server address [default: localhost:8080]
    #[arg(long, env = "DVSTORE_HTTP_ADDRESS")]
    pub http_address: Option<String>,

    /// Log format; console, logfmt or json [default: console]
    #[arg(long, env = "DVSTORE_LOG_FORMAT")]
    pub log_format: Option<String>,

    /// Log level; debug, info, warn or error [default: info]
    #[arg(long, env = "DVSTORE_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Prometheus metrics address; empty disables metrics
    #[arg(long, env = "DVSTORE_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// JSON file persisting stored definitions; empty keeps them in memory
    #[arg(long, env = "DVSTORE_STORE_PATH")]
    pub store_path: Option<String>,

    /// Request deadline in seconds [default: 30]
    #[arg(long, env = "DVSTORE_REQUEST_TIMEOUT")]
    pub request_timeout: Option<String>,

    /// Maximum request body size in bytes [default: 2097152]
    #[arg(long, env = "DVSTORE_MAX_BODY_SIZE")]
    pub max_body_size: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_parse() {
        let flags = Flags::try_parse_from([
            "dvstore",
            "--http-address",
            "0.0.0.0:9000",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(flags.http_address.as_deref(), Some("0.0.0.0:9000"));
        assert_eq!(flags.log_level.as_deref(), Some("debug"));
        assert_eq!(flags.config_file, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Flags::try_parse_from(["dvstore", "--mongo-url", "x"]).is_err());
    }
}
