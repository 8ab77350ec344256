//! Shared fixtures for the API integration tests.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use ed25519_dalek::{Signer, SigningKey};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use dvstore::definition::{encode_hex, Creator, Definition, Hash32, HexBytes, Operator};
use dvstore::http::{build_app, AdapterLimits};
use dvstore::store::{DefinitionStore, MemoryStore};

pub fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

fn address(key: &SigningKey) -> String {
    encode_hex(key.verifying_key().as_bytes())
}

fn sign(key: &SigningKey, message: &[u8]) -> HexBytes {
    HexBytes(key.sign(message).to_bytes().to_vec())
}

/// A definition with valid hashes, signed by its creator and two operators.
pub fn signed_definition(name: &str) -> Definition {
    let creator = signing_key(1);
    let operators = [signing_key(2), signing_key(3)];

    let mut definition = Definition {
        name: name.to_string(),
        uuid: Uuid::new_v4(),
        version: "v1.2.0".to_string(),
        timestamp: "2022-07-19T18:19:58+02:00".to_string(),
        num_validators: 1,
        threshold: 2,
        fee_recipient_address: "0x000000000000000000000000000000000000dead".to_string(),
        withdrawal_address: "0x000000000000000000000000000000000000beef".to_string(),
        dkg_algorithm: "default".to_string(),
        fork_version: HexBytes(vec![0x00, 0x00, 0x10, 0x20]),
        creator: Creator {
            address: address(&creator),
            config_signature: HexBytes::default(),
        },
        operators: operators
            .iter()
            .enumerate()
            .map(|(i, key)| Operator {
                address: address(key),
                enr: format!("enr:-node-{i}"),
                ..Operator::default()
            })
            .collect(),
        config_hash: Hash32::default(),
        definition_hash: Hash32::default(),
    };

    definition.config_hash = definition.compute_config_hash().unwrap();
    let config_hash = definition.config_hash;
    definition.creator.config_signature = sign(&creator, config_hash.as_bytes());
    for (operator, key) in definition.operators.iter_mut().zip(&operators) {
        operator.config_signature = sign(key, config_hash.as_bytes());
        operator.enr_signature = sign(key, operator.enr.as_bytes());
    }
    definition.definition_hash = definition.compute_definition_hash().unwrap();
    definition
}

/// An extra operator for `config_hash`, as sent to the add-operator endpoint.
pub fn operator_body(seed: u8, config_hash: &Hash32) -> (Operator, serde_json::Value) {
    let key = signing_key(seed);
    let enr = format!("enr:-joiner-{seed}");
    let operator = Operator {
        address: address(&key),
        config_signature: sign(&key, config_hash.as_bytes()),
        enr_signature: sign(&key, enr.as_bytes()),
        enr,
    };

    let mut body = serde_json::to_value(&operator).unwrap();
    body["ForkVersion"] = "0x00001020".into();
    (operator, body)
}

/// `/dv/{hash}?config_hash={hash}`
pub fn dv_uri(config_hash: &Hash32) -> String {
    format!("/dv/{config_hash}?config_hash={config_hash}")
}

pub fn test_limits() -> AdapterLimits {
    AdapterLimits {
        request_timeout: Some(Duration::from_secs(5)),
        max_body_size: 64 * 1024,
    }
}

pub fn app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let router = build_app(store.clone() as Arc<dyn DefinitionStore>, test_limits());
    (router, store)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub request_id: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

/// Send one request through the router.
pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Vec<u8>>) -> TestResponse {
    send_with_type(router, method, uri, body, "application/json").await
}

pub async fn send_with_type(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<Vec<u8>>,
    content_type: &str,
) -> TestResponse {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    let request = builder.body(body.map(Body::from).unwrap_or_else(Body::empty)).unwrap();

    let response = router.clone().oneshot(request).await.unwrap();
    let header_string = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    TestResponse {
        status: response.status(),
        content_type: header_string("content-type"),
        request_id: header_string("x-request-id"),
        body: to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec(),
    }
}
