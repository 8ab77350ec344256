//! DVStore: an HTTP API for storing and retrieving distributed validator
//! cluster definitions.

pub mod config;
pub mod context;
pub mod definition;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use config::DvStoreConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;

/// Boxed error used as the cause of wrapped failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
