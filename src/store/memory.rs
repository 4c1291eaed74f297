//! In-memory document store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{DocumentStore, StoreResult};
use crate::error::StoreError;

const SCHEME: &str = "memory://";

/// Store backed by a locator → bytes map.
///
/// Useful for embedding callers that already hold document bytes, and for
/// tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a document.
    pub fn insert(&self, locator: impl Into<String>, bytes: Vec<u8>) {
        self.write().insert(locator.into(), bytes);
    }

    /// Remove a document, returning its bytes if it existed.
    pub fn remove(&self, locator: &str) -> Option<Vec<u8>> {
        self.write().remove(locator)
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, locator: &str) -> bool {
        self.read().contains_key(locator)
    }

    // Every write is a single map operation, so a poisoned map is still whole.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Vec<u8>>> {
        self.documents.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Vec<u8>>> {
        self.documents.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FromIterator<(String, Vec<u8>)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (String, Vec<u8>)>>(iter: I) -> Self {
        Self {
            documents: RwLock::new(iter.into_iter().collect()),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn resolve_locator_to_url(&self, locator: &str) -> StoreResult<String> {
        if self.contains(locator) {
            Ok(format!("{SCHEME}{locator}"))
        } else {
            Err(StoreError::not_found(locator))
        }
    }

    async fn fetch_bytes(&self, url: &str) -> StoreResult<Vec<u8>> {
        let locator = url
            .strip_prefix(SCHEME)
            .ok_or_else(|| StoreError::fetch(url, "unsupported URL scheme"))?;

        self.read()
            .get(locator)
            .cloned()
            .ok_or_else(|| StoreError::fetch(url, "document removed after URL was issued"))
    }
}
