//! DVStore binary.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ axum server ──▶ request id ──▶ endpoint table ──▶ wrap
//!                                                                  │
//!                      span, deadline, latency, error metrics ◀────┤
//!                                                                  ▼
//!                                     adapter (content type, path, query, body)
//!                                                                  │
//!                                                                  ▼
//!                                      handler ──▶ DefinitionStore (DashMap
//!                                                  + optional JSON snapshot)
//! ```

use clap::Parser;

use dvstore::config::{self, Flags};
use dvstore::lifecycle;
use dvstore::observability::logging::{error_chain, init_logging};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let flags = Flags::parse();
    let config = config::resolve(&flags)?;

    init_logging(&config.log)?;
    config::log_flags(&config);

    if let Err(e) = lifecycle::run(config).await {
        tracing::error!(topic = "cmd", error = %error_chain(&e), "Fatal error");
        return Err(e.into());
    }
    Ok(())
}
