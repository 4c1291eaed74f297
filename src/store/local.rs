//! Directory-backed document store.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

use super::{DocumentStore, StoreResult};
use crate::error::StoreError;

const SCHEME: &str = "file://";

/// Store that resolves locators as paths relative to a root directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a locator to a path under the root.
    ///
    /// Absolute locators and locators that climb out of the root are
    /// rejected.
    fn locate(&self, locator: &str) -> Option<PathBuf> {
        let relative = Path::new(locator);
        if locator.is_empty() {
            return None;
        }

        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return None;
        }

        Some(self.root.join(relative))
    }
}

#[async_trait]
impl DocumentStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn resolve_locator_to_url(&self, locator: &str) -> StoreResult<String> {
        let path = self
            .locate(locator)
            .ok_or_else(|| StoreError::not_found(locator))?;

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(format!("{SCHEME}{}", path.display())),
            _ => Err(StoreError::not_found(locator)),
        }
    }

    async fn fetch_bytes(&self, url: &str) -> StoreResult<Vec<u8>> {
        let path = url
            .strip_prefix(SCHEME)
            .ok_or_else(|| StoreError::fetch(url, "unsupported URL scheme"))?;

        tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::fetch(url, e.to_string()))
    }
}
