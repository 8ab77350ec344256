//! Distributed validator cluster definitions.
//!
//! # Data Flow
//! ```text
//! cluster parameters + creator address
//!     → config_hash (SHA-256 over canonical JSON)
//!     → creator and operators sign config_hash, operators sign their ENR
//!     → definition_hash (SHA-256 over config_hash + signatures + operators)
//! ```
//!
//! # Design Decisions
//! - Canonical JSON is the field order of the private payload structs
//! - Addresses are `0x`-hex ed25519 public keys
//! - An empty signature means "not signed yet" and is accepted

pub mod encoding;
#[cfg(test)]
pub(crate) mod testing;

use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

pub use encoding::{decode_hex, encode_hex, Hash32, HexBytes};

/// Key under which definitions are stored and looked up.
pub type ConfigHash = Hash32;

/// Errors raised while hashing or verifying a definition.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("config hash mismatch: expected {expected}, computed {computed}")]
    ConfigHashMismatch { expected: Hash32, computed: Hash32 },

    #[error("definition hash mismatch: expected {expected}, computed {computed}")]
    DefinitionHashMismatch { expected: Hash32, computed: Hash32 },

    #[error("invalid {role} address {address:?}")]
    InvalidAddress { role: &'static str, address: String },

    #[error("invalid {role} signature by {address}")]
    InvalidSignature { role: &'static str, address: String },

    #[error("canonical encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// The creator of a cluster definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creator {
    pub address: String,
    #[serde(default)]
    pub config_signature: HexBytes,
}

/// A node operator taking part in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operator {
    pub address: String,
    #[serde(default)]
    pub enr: String,
    #[serde(default)]
    pub config_signature: HexBytes,
    #[serde(default)]
    pub enr_signature: HexBytes,
}

/// A distributed validator cluster definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub uuid: Uuid,
    pub version: String,
    pub timestamp: String,
    pub num_validators: u32,
    pub threshold: u32,
    pub fee_recipient_address: String,
    pub withdrawal_address: String,
    pub dkg_algorithm: String,
    pub fork_version: HexBytes,
    pub creator: Creator,
    #[serde(default)]
    pub operators: Vec<Operator>,
    pub config_hash: ConfigHash,
    pub definition_hash: Hash32,
}

#[derive(Serialize)]
struct ConfigPayload<'a> {
    name: &'a str,
    uuid: &'a Uuid,
    version: &'a str,
    timestamp: &'a str,
    num_validators: u32,
    threshold: u32,
    fee_recipient_address: &'a str,
    withdrawal_address: &'a str,
    dkg_algorithm: &'a str,
    fork_version: &'a HexBytes,
    creator_address: &'a str,
}

#[derive(Serialize)]
struct DefinitionPayload<'a> {
    config_hash: &'a Hash32,
    creator_config_signature: &'a HexBytes,
    operators: &'a [Operator],
}

impl Definition {
    /// Hash of the cluster parameters. Signatures and operators are excluded.
    pub fn compute_config_hash(&self) -> Result<Hash32, DefinitionError> {
        sha256_json(&ConfigPayload {
            name: &self.name,
            uuid: &self.uuid,
            version: &self.version,
            timestamp: &self.timestamp,
            num_validators: self.num_validators,
            threshold: self.threshold,
            fee_recipient_address: &self.fee_recipient_address,
            withdrawal_address: &self.withdrawal_address,
            dkg_algorithm: &self.dkg_algorithm,
            fork_version: &self.fork_version,
            creator_address: &self.creator.address,
        })
    }

    /// Hash of the stored config hash, the creator signature and all operators.
    pub fn compute_definition_hash(&self) -> Result<Hash32, DefinitionError> {
        sha256_json(&DefinitionPayload {
            config_hash: &self.config_hash,
            creator_config_signature: &self.creator.config_signature,
            operators: &self.operators,
        })
    }

    /// Recompute both hashes and compare them with the stored values.
    pub fn verify_hashes(&self) -> Result<(), DefinitionError> {
        let computed = self.compute_config_hash()?;
        if computed != self.config_hash {
            return Err(DefinitionError::ConfigHashMismatch {
                expected: self.config_hash,
                computed,
            });
        }

        let computed = self.compute_definition_hash()?;
        if computed != self.definition_hash {
            return Err(DefinitionError::DefinitionHashMismatch {
                expected: self.definition_hash,
                computed,
            });
        }

        Ok(())
    }

    /// Verify every signature present on the definition.
    pub fn verify_signatures(&self) -> Result<(), DefinitionError> {
        let config_hash = self.config_hash.as_bytes();

        verify_signature(
            "creator config",
            &self.creator.address,
            config_hash,
            &self.creator.config_signature,
        )?;

        for operator in &self.operators {
            verify_signature(
                "operator config",
                &operator.address,
                config_hash,
                &operator.config_signature,
            )?;
            verify_signature(
                "operator enr",
                &operator.address,
                operator.enr.as_bytes(),
                &operator.enr_signature,
            )?;
        }

        Ok(())
    }
}

fn sha256_json<T: Serialize>(payload: &T) -> Result<Hash32, DefinitionError> {
    let bytes = serde_json::to_vec(payload)?;
    let digest = Sha256::digest(&bytes);
    let mut hash = [0u8; Hash32::LEN];
    hash.copy_from_slice(&digest);
    Ok(Hash32(hash))
}

fn verify_signature(
    role: &'static str,
    address: &str,
    message: &[u8],
    signature: &HexBytes,
) -> Result<(), DefinitionError> {
    if signature.is_empty() {
        return Ok(());
    }

    let invalid_address = || DefinitionError::InvalidAddress {
        role,
        address: address.to_string(),
    };
    let key_bytes: [u8; 32] = decode_hex(address)
        .ok()
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(invalid_address)?;
    let key = VerifyingKey::from_bytes(&key_bytes).map_err(|_| invalid_address())?;

    let invalid_signature = || DefinitionError::InvalidSignature {
        role,
        address: address.to_string(),
    };
    let signature = Signature::from_slice(signature.as_slice()).map_err(|_| invalid_signature())?;

    key.verify(message, &signature).map_err(|_| invalid_signature())
}
