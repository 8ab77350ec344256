//! Request spans.
//!
//! # Design Decisions
//! - One span per request, named by `otel.name` as `<namespace>.<endpoint>`
//! - Topic and endpoint are span fields, so every event inside inherits them

use tracing::Span;

use crate::context::RequestContext;

/// Namespace prefixed to every endpoint span name.
pub const NAMESPACE: &str = "dvstore";

/// Log topic of the definition API.
pub const API_TOPIC: &str = "dvapi";

/// Span for one request to the endpoint named in `ctx`.
pub fn endpoint_span(ctx: &RequestContext) -> Span {
    tracing::info_span!(
        "dvstore.api",
        otel.name = %format!("{NAMESPACE}.{}", ctx.endpoint()),
        topic = API_TOPIC,
        endpoint = ctx.endpoint(),
        request_id = %ctx.request_id(),
    )
}
