//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dvstore_api_latency_seconds` (histogram): request latency by endpoint
//! - `dvstore_api_errors_total` (counter): error responses by endpoint, status code
//!
//! # Design Decisions
//! - Latency is recorded on drop, so it is observed for every outcome,
//!   including a request future dropped on client disconnect
//! - Prometheus exporter is optional and installed once at startup

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

pub const API_LATENCY_SECONDS: &str = "dvstore_api_latency_seconds";
pub const API_ERRORS_TOTAL: &str = "dvstore_api_errors_total";

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    describe_histogram!(API_LATENCY_SECONDS, Unit::Seconds, "API request latency by endpoint");
    describe_counter!(API_ERRORS_TOTAL, "API error responses by endpoint and status code");

    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn inc_api_errors(endpoint: &'static str, status_code: u16) {
    counter!(API_ERRORS_TOTAL, "endpoint" => endpoint, "status_code" => status_code.to_string()).increment(1);
}

pub fn observe_api_latency(endpoint: &'static str, elapsed: Duration) {
    histogram!(API_LATENCY_SECONDS, "endpoint" => endpoint).record(elapsed.as_secs_f64());
}

/// Records endpoint latency when dropped.
#[derive(Debug)]
pub struct LatencyTimer {
    endpoint: &'static str,
    started: Instant,
}

impl LatencyTimer {
    pub fn start(endpoint: &'static str) -> Self {
        Self {
            endpoint,
            started: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        observe_api_latency(self.endpoint, self.started.elapsed());
    }
}
