//! Document stores: where packet source documents come from.
//!
//! A store turns a document's opaque locator into a time-limited access URL
//! and then into raw bytes. The packet builder only ever calls
//! [`DocumentStore::fetch`]; the two underlying steps are separate so that
//! hosted backends issuing signed URLs fit the same contract as local
//! directories.
//!
//! # Examples
//!
//! ```
//! use pdfpacket::store::{DocumentStore, MemoryStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! store.insert("tds/acme-membrane.pdf", b"%PDF-1.4 ...".to_vec());
//!
//! let bytes = store.fetch("tds/acme-membrane.pdf").await?;
//! assert!(bytes.starts_with(b"%PDF"));
//! # Ok(())
//! # }
//! ```

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::error::StoreError;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Default validity window for signed access URLs, in seconds.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u64 = 3600;

/// Source of packet documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short store name for log lines.
    fn name(&self) -> &'static str;

    /// Resolve a locator to an access URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when no document exists for the
    /// locator.
    async fn resolve_locator_to_url(&self, locator: &str) -> StoreResult<String>;

    /// Fetch the bytes behind an access URL.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fetch`] when the transport reports failure.
    async fn fetch_bytes(&self, url: &str) -> StoreResult<Vec<u8>>;

    /// Fetch a document's bytes by locator.
    async fn fetch(&self, locator: &str) -> StoreResult<Vec<u8>> {
        let url = self.resolve_locator_to_url(locator).await?;
        self.fetch_bytes(&url).await
    }
}
