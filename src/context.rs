//! Request-scoped context.
//!
//! Carries the endpoint name, request ID, start time and deadline of one
//! inbound request. It is passed explicitly from the adapter through the
//! handler into the store, so every suspension point can observe the
//! deadline and every log line can report the elapsed duration.

use std::time::{Duration, Instant};

/// Per-request context threaded through every call of one request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    endpoint: &'static str,
    request_id: String,
    started: Instant,
    deadline: Option<tokio::time::Instant>,
}

impl RequestContext {
    /// Start a context now, expiring after `timeout` if one is given.
    ///
    /// A timeout too large to represent as an instant never expires.
    pub fn new(endpoint: &'static str, request_id: impl Into<String>, timeout: Option<Duration>) -> Self {
        let started = Instant::now();
        Self {
            endpoint,
            request_id: request_id.into(),
            started,
            deadline: timeout.and_then(|t| tokio::time::Instant::from_std(started).checked_add(t)),
        }
    }

    /// A context that never expires.
    pub fn background(endpoint: &'static str) -> Self {
        Self::new(endpoint, String::new(), None)
    }

    pub fn endpoint(&self) -> &'static str {
        self.endpoint
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn deadline(&self) -> Option<tokio::time::Instant> {
        self.deadline
    }

    /// Time since the request entered the adapter.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// True once the deadline has passed.
    pub fn is_cancelled(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| tokio::time::Instant::now() >= deadline)
    }
}
