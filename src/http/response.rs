//! Response writing.
//!
//! # Responsibilities
//! - Write 200 responses, with a JSON body or empty
//! - Classify errors, log them once and write the JSON error body
//! - Count errors per endpoint and status code
//!
//! # Design Decisions
//! - 4xx outcomes are expected and logged at debug
//! - Everything else is an incident and logged at error with its cause
//! - The body is written by hyper after the handler returns; a broken
//!   connection at that point is reported by the trace layer, never retried

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::context::RequestContext;
use crate::http::error::{classify, ApiError};
use crate::observability::logging::error_chain;
use crate::observability::metrics;

/// Write a 200 response. `None` produces an empty body.
pub fn write_response(body: Option<Bytes>) -> Response {
    match body {
        None => StatusCode::OK.into_response(),
        Some(bytes) => json_response(StatusCode::OK, bytes.into()),
    }
}

/// Classify `err`, log it, count it and write the error response.
pub fn write_error(ctx: &RequestContext, err: ApiError) -> Response {
    let classified = classify(ctx, &err);
    let status = classified.status;

    if status.is_client_error() {
        tracing::debug!(
            endpoint = ctx.endpoint(),
            status_code = status.as_u16(),
            message = %classified.message,
            error = %error_chain(&err),
            duration = ?ctx.elapsed(),
            "DV api 4xx response"
        );
    } else {
        tracing::error!(
            endpoint = ctx.endpoint(),
            status_code = status.as_u16(),
            message = %classified.message,
            error = %error_chain(&err),
            duration = ?ctx.elapsed(),
            "DV api 5xx response"
        );
    }

    metrics::inc_api_errors(ctx.endpoint(), status.as_u16());

    let body = match serde_json::to_vec(&classified.to_response_body()) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(error = %e, "Failed marshalling error response");
            Vec::new()
        }
    };

    json_response(status, body.into())
}

fn json_response(status: StatusCode, body: Body) -> Response {
    (status, [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))], body).into_response()
}
