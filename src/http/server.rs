//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router from the endpoint table
//! - Wire up middleware (request ID, access trace)
//! - Serve on a bound listener until shutdown
//!
//! # Design Decisions
//! - A client gets one second to send its request headers
//! - Shutdown stops accepting, then waits at most the grace period for
//!   in-flight requests before dropping the remaining connections

use axum::Router;
use hyper_util::{
    rt::{TokioExecutor, TokioIo, TokioTimer},
    server::{conn::auto::Builder, graceful::GracefulShutdown},
    service::TowerToHyperService,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::DvStoreConfig;
use crate::http::instrument::AdapterLimits;
use crate::http::request::RequestUuid;
use crate::routing::{build_router, definition_endpoints};
use crate::store::DefinitionStore;

/// How long in-flight requests may run after shutdown is triggered.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// How long a client may take to send its request headers.
pub const READ_HEADER_TIMEOUT: Duration = Duration::from_secs(1);

const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Build the application router with all middleware layers.
///
/// The request id is set first, so both the access trace and the endpoint
/// span see it.
pub fn build_app(store: Arc<dyn DefinitionStore>, limits: AdapterLimits) -> Router {
    build_router(definition_endpoints(store), limits).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(RequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}

/// HTTP server for the definition API.
pub struct HttpServer {
    router: Router,
    shutdown_grace: Duration,
}

impl HttpServer {
    pub fn new(config: &DvStoreConfig, store: Arc<dyn DefinitionStore>) -> Self {
        let limits = AdapterLimits {
            request_timeout: Some(config.request_timeout()),
            max_body_size: config.max_body_size,
        };
        Self {
            router: build_app(store, limits),
            shutdown_grace: SHUTDOWN_GRACE,
        }
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown signal arrives. In-flight requests are then drained for at
    /// most the shutdown grace period.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(topic = "app", address = %addr, "HTTP server starting");

        let mut builder = Builder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(READ_HEADER_TIMEOUT);

        let graceful = GracefulShutdown::new();
        let mut connections = JoinSet::new();

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = shutdown.recv() => break,
            };

            while connections.try_join_next().is_some() {}

            let (stream, peer) = match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(topic = "app", error = %e, "Failed accepting connection");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                    continue;
                }
            };

            let service = TowerToHyperService::new(self.router.clone());
            let conn = builder.serve_connection(TokioIo::new(stream), service).into_owned();
            let conn = graceful.watch(conn);
            connections.spawn(async move {
                if let Err(e) = conn.await {
                    tracing::debug!(topic = "app", peer = %peer, error = %e, "Connection closed with error");
                }
            });
        }

        tracing::info!(topic = "app", "Shutdown detected");
        drop(listener);

        if tokio::time::timeout(self.shutdown_grace, graceful.shutdown()).await.is_err() {
            tracing::warn!(
                topic = "app",
                grace = ?self.shutdown_grace,
                open = connections.len(),
                "Shutdown grace period elapsed, dropping open connections"
            );
            connections.abort_all();
        }

        tracing::info!(topic = "app", "HTTP server stopped");
        Ok(())
    }
}
