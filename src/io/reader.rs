//! Resolving document references into parsed PDFs.
//!
//! Resolution is fetch-by-reference through a
//! [`DocumentStore`](crate::store::DocumentStore) followed by parsing the
//! bytes with `lopdf`. Fetches may run concurrently, but results always
//! come back in reference order so that page accounting can consume them
//! sequentially.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpacket::io::PdfReader;
//! use pdfpacket::model::DocumentReference;
//! use pdfpacket::store::LocalStore;
//!
//! # async fn example() {
//! let store = LocalStore::new("./documents");
//! let refs = vec![
//!     DocumentReference::new("Product Data", "tds/membrane.pdf"),
//!     DocumentReference::new("Safety Data Sheet", "sds/membrane.pdf"),
//! ];
//!
//! let reader = PdfReader::new();
//! let (results, stats) = reader.resolve_all(&store, &refs, 4).await;
//! println!("{} of {} documents resolved", stats.success_count, results.len());
//! # }
//! ```

use futures::stream::{self, StreamExt};
use lopdf::Document;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::debug;

use crate::error::{FailureKind, ResolutionFailure};
use crate::model::DocumentReference;
use crate::store::DocumentStore;

/// A resolved and parsed source document.
#[derive(Debug)]
pub struct LoadedPdf {
    /// The parsed PDF.
    pub document: Document,

    /// Locator the document was fetched from.
    pub locator: String,

    /// Number of pages in the document.
    pub page_count: usize,

    /// Size of the fetched bytes.
    pub byte_size: u64,

    /// Time taken to fetch and parse.
    pub load_time: Duration,
}

/// Outcome of resolving one reference.
pub type LoadResult = std::result::Result<LoadedPdf, ResolutionFailure>;

/// Statistics for a batch resolution.
#[derive(Debug, Clone)]
pub struct LoadStatistics {
    /// Number of documents successfully resolved.
    pub success_count: usize,

    /// Number of documents that failed to resolve.
    pub failure_count: usize,

    /// Wall time for the whole batch.
    pub total_time: Duration,

    /// Total bytes fetched for successful documents.
    pub total_size: u64,

    /// Total pages across successful documents.
    pub total_pages: usize,
}

impl LoadStatistics {
    fn from_results(results: &[LoadResult], total_time: Duration) -> Self {
        let mut stats = Self {
            success_count: 0,
            failure_count: 0,
            total_time,
            total_size: 0,
            total_pages: 0,
        };

        for result in results {
            match result {
                Ok(loaded) => {
                    stats.success_count += 1;
                    stats.total_size += loaded.byte_size;
                    stats.total_pages += loaded.page_count;
                }
                Err(_) => stats.failure_count += 1,
            }
        }

        stats
    }
}

/// Resolves document references to parsed PDFs.
///
/// Documents without pages count as failures.
#[derive(Debug, Clone)]
pub struct PdfReader;

impl PdfReader {
    /// Create a reader.
    pub fn new() -> Self {
        Self
    }

    /// Resolve one reference.
    ///
    /// `index` is the reference's position in the caller's list and is
    /// carried into any [`ResolutionFailure`].
    pub async fn resolve(
        &self,
        store: &dyn DocumentStore,
        index: usize,
        reference: &DocumentReference,
    ) -> LoadResult {
        let start = Instant::now();
        let failure = |kind: FailureKind| ResolutionFailure {
            index,
            display_title: reference.display_title.clone(),
            locator: reference.source_locator.clone(),
            kind,
        };

        let bytes = store
            .fetch(&reference.source_locator)
            .await
            .map_err(|e| failure(e.into()))?;
        let byte_size = bytes.len() as u64;

        let document = task::spawn_blocking(move || Self::parse(&bytes))
            .await
            .map_err(|e| failure(FailureKind::Parse(format!("parser task failed: {e}"))))?
            .map_err(failure)?;

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(failure(FailureKind::Empty));
        }

        debug!(
            store = store.name(),
            locator = %reference.source_locator,
            pages = page_count,
            bytes = byte_size,
            "resolved document"
        );

        Ok(LoadedPdf {
            document,
            locator: reference.source_locator.clone(),
            page_count,
            byte_size,
            load_time: start.elapsed(),
        })
    }

    /// Parse PDF bytes, classifying failures.
    pub fn parse(bytes: &[u8]) -> std::result::Result<Document, FailureKind> {
        let document = Document::load_mem(bytes).map_err(|e| {
            let msg = e.to_string();
            if msg.contains("encrypt") || msg.contains("password") {
                FailureKind::Encrypted
            } else {
                FailureKind::Parse(msg)
            }
        })?;

        // lopdf decrypts files with an empty user password on load and keeps
        // `/Encrypt` in the trailer. Only files it could not open are locked.
        if document.is_encrypted() && document.encryption_state.is_none() {
            return Err(FailureKind::Encrypted);
        }

        Ok(document)
    }

    /// Resolve references one at a time, in order.
    pub async fn resolve_sequential(
        &self,
        store: &dyn DocumentStore,
        references: &[DocumentReference],
    ) -> Vec<LoadResult> {
        let mut results = Vec::with_capacity(references.len());

        for (index, reference) in references.iter().enumerate() {
            results.push(self.resolve(store, index, reference).await);
        }

        results
    }

    /// Resolve references with up to `workers` fetches in flight.
    ///
    /// Results are returned in reference order regardless of completion
    /// order.
    pub async fn resolve_parallel(
        &self,
        store: &dyn DocumentStore,
        references: &[DocumentReference],
        workers: usize,
    ) -> Vec<LoadResult> {
        let workers = workers.max(1);

        let tasks = references
            .iter()
            .enumerate()
            .map(|(index, reference)| self.resolve(store, index, reference));

        stream::iter(tasks).buffered(workers).collect().await
    }

    /// Resolve all references, choosing sequential or parallel fetching.
    ///
    /// Small batches are fetched sequentially.
    pub async fn resolve_all(
        &self,
        store: &dyn DocumentStore,
        references: &[DocumentReference],
        max_workers: usize,
    ) -> (Vec<LoadResult>, LoadStatistics) {
        let start = Instant::now();

        let results = if references.len() <= 3 || max_workers <= 1 {
            self.resolve_sequential(store, references).await
        } else {
            self.resolve_parallel(store, references, max_workers).await
        };

        let stats = LoadStatistics::from_results(&results, start.elapsed());
        (results, stats)
    }
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}
