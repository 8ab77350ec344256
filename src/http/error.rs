//! API error taxonomy and classification.
//!
//! # Responsibilities
//! - Define the errors a handler may return
//! - Map any error to a status code and a message safe for clients
//! - Keep underlying causes for internal logs only
//!
//! # Design Decisions
//! - Closed enum matched exhaustively, so a new kind cannot fall through
//! - An expired request context overrides whatever the handler returned
//! - An empty message is replaced with "Internal server error"

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::RequestContext;
use crate::store::StoreError;
use crate::BoxError;

pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";
pub const CLIENT_CANCELLED_MESSAGE: &str = "client cancelled request";

/// Error returned by handlers and the request adapter.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Client-caused parse or validation failure.
    #[error("bad request: {message}")]
    BadRequest {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    /// Lookup miss.
    #[error("not found: {message}")]
    NotFound {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    #[error("unsupported media type: {message}")]
    UnsupportedMediaType { message: String },

    /// The request context expired before an outcome was produced.
    #[error("client cancelled request")]
    ClientCancelled,

    /// Anything else. `context` is for logs, clients only see the generic message.
    #[error("{context}")]
    Internal {
        context: String,
        #[source]
        cause: Option<BoxError>,
    },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
            cause: None,
        }
    }

    pub fn bad_request_with(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::BadRequest {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            cause: None,
        }
    }

    pub fn internal(context: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self::Internal {
            context: context.into(),
            cause: Some(cause.into()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound {
                message: "definition not found".to_string(),
                cause: Some(err.into()),
            },
            StoreError::AlreadyExists => ApiError::BadRequest {
                message: "definition already exists".to_string(),
                cause: Some(err.into()),
            },
            StoreError::Cancelled => ApiError::ClientCancelled,
            StoreError::Backend { .. } => ApiError::internal("definition store", err),
        }
    }
}

/// Wire shape of every non-2xx response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
}

/// Outcome of classifying an [`ApiError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    pub status: StatusCode,
    pub message: String,
}

impl Classified {
    pub fn to_response_body(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.status.as_u16(),
            message: self.message.clone(),
        }
    }
}

/// Map an error to the status code and message returned to the client.
pub fn classify(ctx: &RequestContext, err: &ApiError) -> Classified {
    if ctx.is_cancelled() {
        return Classified {
            status: StatusCode::REQUEST_TIMEOUT,
            message: CLIENT_CANCELLED_MESSAGE.to_string(),
        };
    }

    let (status, message) = match err {
        ApiError::BadRequest { message, .. } => (StatusCode::BAD_REQUEST, message.as_str()),
        ApiError::NotFound { message, .. } => (StatusCode::NOT_FOUND, message.as_str()),
        ApiError::UnsupportedMediaType { message } => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, message.as_str())
        }
        ApiError::ClientCancelled => (StatusCode::REQUEST_TIMEOUT, CLIENT_CANCELLED_MESSAGE),
        ApiError::Internal { .. } => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR_MESSAGE),
    };

    let message = if message.is_empty() {
        INTERNAL_SERVER_ERROR_MESSAGE
    } else {
        message
    };

    Classified {
        status,
        message: message.to_string(),
    }
}
