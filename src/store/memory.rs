//! In-memory definition store with optional file persistence.
//!
//! Mutations are serialized by one write lock and contain no suspension
//! point. A change is staged against a copy of the collection, written to
//! the snapshot (when one is configured) and only then applied to the map,
//! so a failed write leaves memory untouched and a request abandoned at its
//! deadline never leaves a half-applied change behind.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::context::RequestContext;
use crate::definition::{ConfigHash, Definition, Operator};
use crate::store::{DefinitionStore, StoreError};

/// A concurrent definition collection.
///
/// Reads go straight to the map shard that owns the key, so a concurrent get
/// and delete on one config hash either sees the whole record or none of it.
#[derive(Debug, Default)]
pub struct MemoryStore {
    definitions: DashMap<ConfigHash, Definition>,
    snapshot: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    /// Create an empty store that lives only in memory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store backed by a JSON snapshot file, loading it if it exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let definitions = DashMap::new();

        if path.exists() {
            let content = std::fs::read(&path).map_err(|e| StoreError::backend("read snapshot", e))?;
            let loaded: Vec<Definition> =
                serde_json::from_slice(&content).map_err(|e| StoreError::backend("decode snapshot", e))?;
            for definition in loaded {
                definitions.insert(definition.config_hash, definition);
            }
        }

        tracing::info!(
            path = %path.display(),
            definitions = definitions.len(),
            "Opened definition store"
        );

        Ok(Self {
            definitions,
            snapshot: Some(path),
            write_lock: Mutex::new(()),
        })
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write the collection as it will look once `stage` is applied.
    ///
    /// Callers hold the write lock, so the map cannot change underneath.
    fn persist_staged(&self, stage: impl FnOnce(&mut Vec<Definition>)) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot else {
            return Ok(());
        };

        let mut definitions: Vec<Definition> = self
            .definitions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        stage(&mut definitions);
        definitions.sort_by_key(|d| d.config_hash);

        let bytes = serde_json::to_vec_pretty(&definitions)
            .map_err(|e| StoreError::backend("encode snapshot", e))?;
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes).map_err(|e| StoreError::backend("write snapshot", e))?;
        std::fs::rename(&tmp, path).map_err(|e| StoreError::backend("replace snapshot", e))?;

        tracing::debug!(definitions = definitions.len(), "Persisted definition snapshot");
        Ok(())
    }
}

fn check_deadline(ctx: &RequestContext) -> Result<(), StoreError> {
    if ctx.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl DefinitionStore for MemoryStore {
    async fn get(&self, ctx: &RequestContext, config_hash: &ConfigHash) -> Result<Definition, StoreError> {
        check_deadline(ctx)?;
        self.definitions
            .get(config_hash)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn delete(&self, ctx: &RequestContext, config_hash: &ConfigHash) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let _guard = self.lock_writes();
        if !self.definitions.contains_key(config_hash) {
            return Err(StoreError::NotFound);
        }

        self.persist_staged(|definitions| definitions.retain(|d| d.config_hash != *config_hash))?;
        self.definitions.remove(config_hash);
        Ok(())
    }

    async fn create(&self, ctx: &RequestContext, definition: Definition) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let _guard = self.lock_writes();
        if self.definitions.contains_key(&definition.config_hash) {
            return Err(StoreError::AlreadyExists);
        }

        self.persist_staged(|definitions| definitions.push(definition.clone()))?;
        self.definitions.insert(definition.config_hash, definition);
        Ok(())
    }

    async fn add_operator(
        &self,
        ctx: &RequestContext,
        config_hash: &ConfigHash,
        operator: Operator,
    ) -> Result<(), StoreError> {
        check_deadline(ctx)?;
        let _guard = self.lock_writes();
        let mut updated = self
            .definitions
            .get(config_hash)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)?;
        if updated.operators.contains(&operator) {
            return Ok(());
        }
        updated.operators.push(operator);

        self.persist_staged(|definitions| {
            for definition in definitions.iter_mut().filter(|d| d.config_hash == *config_hash) {
                *definition = updated.clone();
            }
        })?;
        self.definitions.insert(*config_hash, updated);
        Ok(())
    }
}
