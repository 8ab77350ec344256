//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line flags / DVSTORE_* env (flags.rs)
//!     → loader.rs (layer over config file and defaults)
//!     → validation.rs (semantic checks)
//!     → DvStoreConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup; there is no reload
//! - All settings have defaults so the service starts without a file
//! - The resolved config is logged with credentials redacted

pub mod flags;
pub mod loader;
pub mod schema;
pub mod validation;

pub use flags::Flags;
pub use loader::{resolve, ConfigError};
pub use schema::{DvStoreConfig, FlagValue};

use crate::observability::redact::{redact, redact_list};

/// Log every resolved setting as `name=value`, sorted by name.
pub fn log_flags(config: &DvStoreConfig) {
    tracing::info!(topic = "cmd", flags = %render_flags(config.flag_values()), "Parsed config");
}

/// Space separated `name=value` pairs with address credentials masked.
fn render_flags(flags: Vec<(&'static str, FlagValue)>) -> String {
    flags
        .into_iter()
        .map(|(name, value)| match value {
            FlagValue::Single(value) => format!("{name}={}", redact(name, &value)),
            FlagValue::List(values) => format!("{name}={}", redact_list(name, &values)),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
