//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Endpoint table (endpoint.rs, built at startup)
//!     → router.rs (group by path, one method router per path)
//!     → instrument::wrap (span, deadline, latency)
//!     → adapter → handler
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Unknown paths and methods use axum's default 404/405
//! - The `config_hash` path segment is only a route matcher; handlers read
//!   the hash from the query string

pub mod endpoint;
pub mod router;

pub use endpoint::{definition_endpoints, Endpoint, HttpMethod};
pub use router::build_router;
