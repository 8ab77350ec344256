//! Startup orchestration.
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - The listener binds last (traffic only when ready)

use std::sync::Arc;
use thiserror::Error;
use tokio::net::{lookup_host, TcpListener};

use crate::config::DvStoreConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::store::{DefinitionStore, MemoryStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("resolve {flag} {address:?}")]
    Resolve {
        flag: &'static str,
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{flag} {address:?} resolved to no address")]
    NoAddress { flag: &'static str, address: String },

    #[error("start metrics exporter")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("open definition store")]
    Store(#[from] StoreError),

    #[error("bind http listener {address:?}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serve http")]
    Serve(#[source] std::io::Error),
}

/// Run the service until a termination signal.
pub async fn run(config: DvStoreConfig) -> Result<(), StartupError> {
    tracing::info!(topic = "app", version = env!("CARGO_PKG_VERSION"), "Starting dvstore");

    if !config.metrics_address.is_empty() {
        let addr = lookup_host(&config.metrics_address)
            .await
            .map_err(|source| StartupError::Resolve {
                flag: "metrics-address",
                address: config.metrics_address.clone(),
                source,
            })?
            .next()
            .ok_or_else(|| StartupError::NoAddress {
                flag: "metrics-address",
                address: config.metrics_address.clone(),
            })?;
        metrics::init_metrics(addr)?;
    }

    let store: Arc<dyn DefinitionStore> = if config.store_path.is_empty() {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(MemoryStore::open(&config.store_path)?)
    };

    let listener = TcpListener::bind(&config.http_address)
        .await
        .map_err(|source| StartupError::Bind {
            address: config.http_address.clone(),
            source,
        })?;

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, store);
    let receiver = shutdown.subscribe();
    signals::spawn_signal_handler(shutdown);

    server.run(listener, receiver).await.map_err(StartupError::Serve)?;

    tracing::info!(topic = "app", "Good bye");
    Ok(())
}
