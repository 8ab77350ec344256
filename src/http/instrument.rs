//! Per-request observability wrapper.
//!
//! Opens the request span, creates the request context with its deadline,
//! enforces that deadline around the adapter and records endpoint latency on
//! every outcome.

use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use std::time::Duration;
use tower_http::request_id::RequestId;
use tracing::Instrument;

use crate::context::RequestContext;
use crate::http::adapter::{adapt, HandlerFn};
use crate::http::error::ApiError;
use crate::http::response::write_error;
use crate::observability::{metrics, tracing::endpoint_span};

/// Limits applied by the adapter to every request.
#[derive(Debug, Clone, Copy)]
pub struct AdapterLimits {
    /// Deadline for one request; `None` never expires.
    pub request_timeout: Option<Duration>,
    pub max_body_size: usize,
}

impl Default for AdapterLimits {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            max_body_size: 2 * 1024 * 1024,
        }
    }
}

/// Serve one request for `endpoint` through `handler`.
pub async fn wrap(
    endpoint: &'static str,
    handler: HandlerFn,
    limits: AdapterLimits,
    request: Request<Body>,
) -> Response {
    let _latency = metrics::LatencyTimer::start(endpoint);

    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or_default()
        .to_string();
    let ctx = RequestContext::new(endpoint, request_id, limits.request_timeout);
    let span = endpoint_span(&ctx);

    async move {
        let served = adapt(&ctx, &handler, request, limits.max_body_size);
        match ctx.deadline() {
            None => served.await,
            Some(deadline) => match tokio::time::timeout_at(deadline, served).await {
                Ok(response) => response,
                Err(_) => write_error(&ctx, ApiError::ClientCancelled),
            },
        }
    }
    .instrument(span)
    .await
}
