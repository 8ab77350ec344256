//! Signed definition fixtures for unit tests.

use ed25519_dalek::{Signer, SigningKey};
use uuid::Uuid;

use super::{encode_hex, Creator, Definition, Hash32, HexBytes, Operator};

pub(crate) fn signing_key(seed: u8) -> SigningKey {
    SigningKey::from_bytes(&[seed; 32])
}

pub(crate) fn address(key: &SigningKey) -> String {
    encode_hex(key.verifying_key().as_bytes())
}

/// A fully hashed definition signed by its creator and two operators.
pub(crate) fn signed_definition(name: &str) -> Definition {
    let creator = signing_key(1);
    let operators = [signing_key(2), signing_key(3)];

    let mut definition = Definition {
        name: name.to_string(),
        uuid: Uuid::new_v4(),
        version: "v1.2.0".to_string(),
        timestamp: "2022-07-19T18:19:58+02:00".to_string(),
        num_validators: 2,
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
                enr: format!("enr:-operator-{i}"),
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

/// An operator signed over the given config hash.
pub(crate) fn signed_operator(seed: u8, config_hash: &Hash32) -> Operator {
    let key = signing_key(seed);
    let enr = format!("enr:-late-{seed}");
    Operator {
        address: address(&key),
        config_signature: sign(&key, config_hash.as_bytes()),
        enr_signature: sign(&key, enr.as_bytes()),
        enr,
    }
}

fn sign(key: &SigningKey, message: &[u8]) -> HexBytes {
    HexBytes(key.sign(message).to_bytes().to_vec())
}
