//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Every request produces:
//!     → tracing.rs (span with endpoint, topic and request ID)
//!     → logging.rs (structured log events, console/logfmt/json)
//!     → metrics.rs (latency histogram, error counter)
//!
//! Startup produces:
//!     → redact.rs (resolved flags, credentials masked)
//! ```
//!
//! # Design Decisions
//! - Structured fields, never values interpolated into messages
//! - Request context is passed explicitly, no ambient per-request state
//! - Metrics are recorded through the `metrics` facade and cost nothing
//!   until an exporter is installed

pub mod logging;
pub mod metrics;
pub mod redact;
pub mod tracing;
