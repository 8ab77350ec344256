//! Request adapter.
//!
//! Turns a typed handler into an HTTP endpoint:
//!
//! ```text
//! Content-Type check (415)
//!     → path params, query params, body bytes
//!     → handler(ctx, ParsedRequest)
//!     → 200 + JSON | 200 empty | classified JSON error
//! ```
//!
//! Also holds the parsing helpers handlers use for bodies and `0x`-hex
//! query parameters.

use axum::body::{Body, Bytes};
use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path};
use axum::http::{header, HeaderMap, Request};
use axum::response::Response;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::context::RequestContext;
use crate::definition::decode_hex;
use crate::http::error::ApiError;
use crate::http::response::{write_error, write_response};

/// Raw query parameters; a name may repeat.
pub type QueryParams = HashMap<String, Vec<String>>;

/// Inputs of one handler call.
#[derive(Debug, Clone, Default)]
pub struct ParsedRequest {
    pub path_params: HashMap<String, String>,
    pub query: QueryParams,
    pub body: Bytes,
}

/// Serialized handler outcome. `Ok(None)` is an empty 200.
pub type HandlerResult = Result<Option<Bytes>, ApiError>;

/// Type-erased handler stored in the endpoint table.
pub type HandlerFn = Arc<dyn Fn(RequestContext, ParsedRequest) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Erase a typed handler, serializing its result to JSON.
///
/// A serialization failure becomes an internal error, so the client gets a
/// 500 and never a partial body.
pub fn handler_fn<F, Fut, T>(handler: F) -> HandlerFn
where
    F: Fn(RequestContext, ParsedRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<T>, ApiError>> + Send + 'static,
    T: Serialize + Send + 'static,
{
    Arc::new(move |ctx: RequestContext, request: ParsedRequest| -> BoxFuture<'static, HandlerResult> {
        let fut = handler(ctx, request);
        Box::pin(async move {
            match fut.await? {
                None => Ok(None),
                Some(value) => serde_json::to_vec(&value)
                    .map(|bytes| Some(Bytes::from(bytes)))
                    .map_err(|e| ApiError::internal("marshal response body", e)),
            }
        })
    })
}

/// Run one request through `handler` and write the response.
pub async fn adapt(
    ctx: &RequestContext,
    handler: &HandlerFn,
    request: Request<Body>,
    max_body_size: usize,
) -> Response {
    match dispatch(ctx, handler, request, max_body_size).await {
        Ok(body) => write_response(body),
        Err(err) => write_error(ctx, err),
    }
}

async fn dispatch(
    ctx: &RequestContext,
    handler: &HandlerFn,
    request: Request<Body>,
    max_body_size: usize,
) -> HandlerResult {
    let (mut parts, body) = request.into_parts();

    check_content_type(&parts.headers)?;

    let path_params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, &()).await {
        Ok(Path(params)) => params,
        Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
        Err(rejection) => return Err(ApiError::bad_request(rejection.body_text())),
    };
    let query = parse_query(parts.uri.query());
    let body = axum::body::to_bytes(body, max_body_size)
        .await
        .map_err(|e| ApiError::internal("read request body", e))?;

    handler(
        ctx.clone(),
        ParsedRequest {
            path_params,
            query,
            body,
        },
    )
    .await
}

/// Only JSON bodies are accepted. A missing or empty header is fine.
fn check_content_type(headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        return Ok(());
    };
    let content_type = String::from_utf8_lossy(value.as_bytes());
    if content_type.is_empty() || content_type.contains("application/json") {
        return Ok(());
    }

    Err(ApiError::UnsupportedMediaType {
        message: format!("unsupported media type {content_type} (only application/json supported)"),
    })
}

/// Split a raw query string into repeated name/value pairs.
pub fn parse_query(raw: Option<&str>) -> QueryParams {
    let mut query = QueryParams::new();
    for (name, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
        query.entry(name.into_owned()).or_default().push(value.into_owned());
    }
    query
}

/// Parse a JSON request body.
pub fn unmarshal<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    if body.is_empty() {
        return Err(ApiError::bad_request_with("empty request body", "empty request body"));
    }

    serde_json::from_slice(body).map_err(|e| ApiError::bad_request_with("failed parsing request body", e))
}

/// Decode a `0x`-hex query parameter.
///
/// Returns `Ok(None)` unless the parameter is present exactly once.
pub fn hex_query(query: &QueryParams, name: &str) -> Result<Option<Vec<u8>>, ApiError> {
    let value = match query.get(name).map(Vec::as_slice) {
        Some([value]) => value,
        _ => return Ok(None),
    };

    decode_hex(value)
        .map(Some)
        .map_err(|e| ApiError::bad_request_with(format!("invalid 0x-hex query parameter {name} [{value}]"), e))
}

/// Decode a required `0x`-hex query parameter of exactly `N` bytes.
pub fn hex_query_fixed<const N: usize>(query: &QueryParams, name: &str) -> Result<[u8; N], ApiError> {
    let bytes = hex_query(query, name)?
        .ok_or_else(|| ApiError::bad_request(format!("missing 0x-hex query parameter {name}")))?;
    fixed_length(name, bytes)
}

fn fixed_length<const N: usize>(name: &str, bytes: Vec<u8>) -> Result<[u8; N], ApiError> {
    bytes.try_into().map_err(|_| {
        ApiError::bad_request(format!(
            "invalid length for 0x-hex query parameter {name}, expect {N} bytes"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn query(raw: &str) -> QueryParams {
        parse_query(Some(raw))
    }

    fn message(err: ApiError) -> String {
        match err {
            ApiError::BadRequest { message, .. } => message,
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_query_keeps_repeats() {
        let q = query("a=1&b=2&a=3&c=hello%20world");
        assert_eq!(q["a"], vec!["1", "3"]);
        assert_eq!(q["b"], vec!["2"]);
        assert_eq!(q["c"], vec!["hello world"]);
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_hex_query_present_once() {
        assert_eq!(hex_query(&query("h=0x0102"), "h").unwrap(), Some(vec![1, 2]));
        assert_eq!(hex_query(&query("h=0102"), "h").unwrap(), Some(vec![1, 2]));
        assert_eq!(hex_query(&query("x=0x01"), "h").unwrap(), None);
        assert_eq!(hex_query(&query("h=0x01&h=0x02"), "h").unwrap(), None);
    }

    #[test]
    fn test_hex_query_fixed_messages_are_distinct() {
        let missing = message(hex_query_fixed::<2>(&query(""), "h").unwrap_err());
        let length = message(hex_query_fixed::<2>(&query("h=0x010203"), "h").unwrap_err());
        let invalid = message(hex_query_fixed::<2>(&query("h=0xzz"), "h").unwrap_err());

        assert_eq!(missing, "missing 0x-hex query parameter h");
        assert_eq!(length, "invalid length for 0x-hex query parameter h, expect 2 bytes");
        assert_eq!(invalid, "invalid 0x-hex query parameter h [0xzz]");
        assert_eq!(hex_query_fixed::<2>(&query("h=0xbeef"), "h").unwrap(), [0xbe, 0xef]);
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[allow(dead_code)]
        value: u32,
    }

    #[test]
    fn test_unmarshal_rejections() {
        assert_eq!(message(unmarshal::<Sample>(b"").unwrap_err()), "empty request body");
        assert_eq!(
            message(unmarshal::<Sample>(b"{\"value\":").unwrap_err()),
            "failed parsing request body"
        );
        assert_eq!(unmarshal::<Sample>(b"{\"value\":7}").unwrap().value, 7);
    }

    #[test]
    fn test_content_type_rules() {
        let mut headers = HeaderMap::new();
        assert!(check_content_type(&headers).is_ok());

        headers.insert(header::CONTENT_TYPE, "application/json; charset=utf-8".parse().unwrap());
        assert!(check_content_type(&headers).is_ok());

        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());
        let err = check_content_type(&headers).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMediaType { .. }));
    }

    #[tokio::test]
    async fn test_unsupported_media_type_skips_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = calls.clone();
        let handler = handler_fn(move |_ctx, _request| {
            counted.fetch_add(1, Ordering::SeqCst);
            async { Ok::<Option<()>, ApiError>(None) }
        });

        let request = Request::builder()
            .method("POST")
            .uri("/dv")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();
        let ctx = RequestContext::background("create_definition");
        let response = adapt(&ctx, &handler, request, 1024).await;

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_receives_query_and_body() {
        let handler = handler_fn(|_ctx, request: ParsedRequest| async move {
            let body = String::from_utf8(request.body.to_vec()).unwrap();
            Ok::<_, ApiError>(Some((request.query["k"].clone(), body)))
        });

        let request = Request::builder()
            .uri("/anything?k=v1&k=v2")
            .body(Body::from("payload"))
            .unwrap();
        let ctx = RequestContext::background("echo");
        let response = adapt(&ctx, &handler, request, 1024).await;
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let (values, body): (Vec<String>, String) = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(values, vec!["v1", "v2"]);
        assert_eq!(body, "payload");
    }

    #[tokio::test]
    async fn test_oversized_body_is_internal_error() {
        let handler = handler_fn(|_ctx, _request| async { Ok::<Option<()>, ApiError>(None) });
        let request = Request::builder()
            .method("POST")
            .uri("/dv")
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();
        let ctx = RequestContext::background("create_definition");
        let response = adapt(&ctx, &handler, request, 8).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("value cannot be encoded"))
        }
    }

    #[tokio::test]
    async fn test_unserializable_result_is_internal_error_without_partial_body() {
        let handler = handler_fn(|_ctx, _request| async { Ok::<_, ApiError>(Some(Unserializable)) });
        let request = Request::builder().uri("/dv").body(Body::empty()).unwrap();
        let ctx = RequestContext::background("get_definition");
        let response = adapt(&ctx, &handler, request, 1024).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"code":500,"message":"Internal server error"}"#);
    }
}
