//! Definition endpoint handlers.

use serde::Deserialize;
use std::sync::Arc;

use crate::definition::{decode_hex, encode_hex, ConfigHash, Definition, Hash32, Operator};
use crate::http::adapter::{handler_fn, hex_query_fixed, unmarshal, HandlerFn, QueryParams};
use crate::http::error::ApiError;
use crate::store::DefinitionStore;

/// Query parameter carrying the `0x`-hex config hash.
pub const CONFIG_HASH: &str = "config_hash";

/// Body of an add-operator request: the operator plus the fork version.
#[derive(Debug, Deserialize)]
pub struct AddOperatorRequest {
    #[serde(flatten)]
    pub operator: Operator,
    #[serde(rename = "ForkVersion", alias = "fork_version", default)]
    pub fork_version: String,
}

fn config_hash_query(query: &QueryParams) -> Result<ConfigHash, ApiError> {
    if !query.contains_key(CONFIG_HASH) {
        return Err(ApiError::bad_request("Missing config_hash"));
    }
    hex_query_fixed::<{ Hash32::LEN }>(query, CONFIG_HASH).map(Hash32)
}

pub fn get_definition(store: Arc<dyn DefinitionStore>) -> HandlerFn {
    handler_fn(move |ctx, request| {
        let store = Arc::clone(&store);
        async move {
            let config_hash = config_hash_query(&request.query)?;
            let definition = store.get(&ctx, &config_hash).await?;
            Ok::<_, ApiError>(Some(definition))
        }
    })
}

pub fn delete_definition(store: Arc<dyn DefinitionStore>) -> HandlerFn {
    handler_fn(move |ctx, request| {
        let store = Arc::clone(&store);
        async move {
            let config_hash = config_hash_query(&request.query)?;
            store.delete(&ctx, &config_hash).await?;
            Ok::<Option<()>, ApiError>(None)
        }
    })
}

pub fn create_definition(store: Arc<dyn DefinitionStore>) -> HandlerFn {
    handler_fn(move |ctx, request| {
        let store = Arc::clone(&store);
        async move {
            let definition: Definition = unmarshal(&request.body)?;

            definition
                .verify_hashes()
                .map_err(|e| ApiError::bad_request_with("Invalid definition hash", e))?;
            definition
                .verify_signatures()
                .map_err(|e| ApiError::bad_request_with("Invalid definition signature", e))?;

            store.create(&ctx, definition).await?;
            Ok::<Option<()>, ApiError>(None)
        }
    })
}

/// Adds the operator as given; its signatures are not checked here.
pub fn add_operator(store: Arc<dyn DefinitionStore>) -> HandlerFn {
    handler_fn(move |ctx, request| {
        let store = Arc::clone(&store);
        async move {
            let config_hash = config_hash_query(&request.query)?;
            let body: AddOperatorRequest = unmarshal(&request.body)?;

            let fork_version = decode_hex(&body.fork_version)
                .map_err(|e| ApiError::bad_request_with("Invalid fork version hex", e))?;

            tracing::debug!(
                config_hash = %config_hash,
                fork_version = %encode_hex(&fork_version),
                operator = %body.operator.address,
                "Adding operator"
            );

            store.add_operator(&ctx, &config_hash, body.operator).await?;
            Ok::<Option<()>, ApiError>(None)
        }
    })
}
