//! Definition persistence.
//!
//! # Data Flow
//! ```text
//! handler
//!     → DefinitionStore (capability injected at startup)
//!     → memory.rs (DashMap collection, optional JSON snapshot file)
//! ```
//!
//! # Design Decisions
//! - One capability trait, no runtime type checks on the backend
//! - Not-found is a distinct variant so callers can map it to 404
//! - Every call observes the request context and bails out once it expires

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::context::RequestContext;
use crate::definition::{ConfigHash, Definition, Operator};
use crate::BoxError;

pub use memory::MemoryStore;

/// Errors returned by a definition store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("definition not found")]
    NotFound,

    #[error("definition already exists")]
    AlreadyExists,

    #[error("store call cancelled")]
    Cancelled,

    #[error("{context}")]
    Backend {
        context: &'static str,
        #[source]
        source: BoxError,
    },
}

impl StoreError {
    pub(crate) fn backend(context: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Backend {
            context,
            source: source.into(),
        }
    }
}

/// Collection of definitions keyed by config hash.
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// Find one definition by config hash.
    async fn get(&self, ctx: &RequestContext, config_hash: &ConfigHash) -> Result<Definition, StoreError>;

    /// Delete one definition by config hash.
    async fn delete(&self, ctx: &RequestContext, config_hash: &ConfigHash) -> Result<(), StoreError>;

    /// Insert a new definition under its own config hash.
    async fn create(&self, ctx: &RequestContext, definition: Definition) -> Result<(), StoreError>;

    /// Add an operator to the definition's operator set.
    async fn add_operator(
        &self,
        ctx: &RequestContext,
        config_hash: &ConfigHash,
        operator: Operator,
    ) -> Result<(), StoreError>;
}
