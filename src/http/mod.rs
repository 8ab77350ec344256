//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum setup, request id, access trace)
//!     → routing (endpoint table)
//!     → instrument.rs (span, deadline, latency)
//!     → adapter.rs (content type, path/query/body parsing)
//!     → handlers.rs (definition operations against the store)
//!     → response.rs (JSON body or classified error)
//! ```

pub mod adapter;
pub mod error;
pub mod handlers;
pub mod instrument;
pub mod request;
pub mod response;
pub mod server;

pub use error::ApiError;
pub use instrument::AdapterLimits;
pub use request::X_REQUEST_ID;
pub use server::{build_app, HttpServer};
