//! Packet assembly.
//!
//! A build runs in three passes over one exclusively owned document:
//!
//! 1. **Front matter.** The cover and a draft table of contents are drawn.
//!    The draft lists every document with a placeholder page label, since
//!    no page count is known yet.
//! 2. **Merge.** Documents are imported in reference order. Fetching may
//!    happen concurrently beforehand, but importing and page accounting are
//!    strictly sequential.
//! 3. **Rewrite.** The table of contents page is painted over and redrawn
//!    with the final start pages. The page keeps its position; only its
//!    drawing changes.
//!
//! The finished document is then serialized. Only missing metadata and
//! serialization failures abort a build; a document that cannot be
//! resolved is logged, listed with no page, and skipped.

use lopdf::ObjectId;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, info};

use super::accounting::{self, Outcome, PageContribution, ResolutionReport};
use super::bookmarks::BookmarkManager;
use super::front_matter::{self, TocRow};
use super::metadata::MetadataManager;
use super::pages::PacketDocument;
use crate::config::{CompressionLevel, PageSize};
use crate::error::{PacketError, ResolutionFailure, Result};
use crate::io::{LoadResult, PdfReader, PdfWriter};
use crate::model::{
    CoverDetails, DEFAULT_DATE_FORMAT, DocumentReference, PacketMetadata, ResolvedDocumentEntry,
};
use crate::store::DocumentStore;

/// Default number of concurrent document fetches.
pub const DEFAULT_JOBS: usize = 4;

/// Options controlling how a packet is assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Page size of the cover and table of contents.
    pub page_size: PageSize,

    /// Compression applied when serializing.
    pub compression: CompressionLevel,

    /// Add an outline with the front matter and each document.
    pub bookmarks: bool,

    /// Maximum concurrent fetches.
    pub jobs: usize,

    /// `chrono` format string for the cover date.
    pub date_format: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::default(),
            compression: CompressionLevel::default(),
            bookmarks: true,
            jobs: DEFAULT_JOBS,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

/// A finished packet and how it was numbered.
#[derive(Debug, Clone)]
pub struct PacketOutput {
    /// Serialized PDF.
    pub bytes: Vec<u8>,

    /// One entry per reference, in reference order.
    pub entries: Vec<ResolvedDocumentEntry>,

    /// Documents that could not be resolved.
    pub failures: Vec<ResolutionFailure>,

    /// Pages in the packet, front matter included.
    pub total_pages: usize,

    /// Outline entries written.
    pub bookmarks_added: usize,

    /// Time spent fetching and parsing documents.
    pub load_time: Duration,

    /// Total build time.
    pub build_time: Duration,
}

impl PacketOutput {
    /// Whether every document made it into the packet.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Assembles submittal packets from documents in a [`DocumentStore`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Utc;
/// use pdfpacket::model::{DocumentReference, PacketMetadata};
/// use pdfpacket::packet::PacketBuilder;
/// use pdfpacket::store::LocalStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let builder = PacketBuilder::new(Arc::new(LocalStore::new("./documents")));
/// let metadata = PacketMetadata::new("Roofing Submittal", "Jane Smith", "City Engineering", Utc::now());
/// let documents = vec![DocumentReference::new("Product Data", "tds/membrane.pdf")];
///
/// let bytes = builder.build(&metadata, &documents).await?;
/// std::fs::write("packet.pdf", bytes)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PacketBuilder {
    store: Arc<dyn DocumentStore>,
    reader: PdfReader,
    options: BuildOptions,
}

impl std::fmt::Debug for PacketBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacketBuilder")
            .field("store", &self.store.name())
            .field("options", &self.options)
            .finish()
    }
}

impl PacketBuilder {
    /// Create a builder with default options.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            reader: PdfReader::new(),
            options: BuildOptions::default(),
        }
    }

    /// Replace the build options.
    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    /// Current build options.
    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build a packet and return its bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::InvalidMetadata`] if a required metadata
    /// field is missing, or [`PacketError::Serialization`] if the packet
    /// cannot be encoded. Documents that fail to resolve do not cause an
    /// error.
    pub async fn build(
        &self,
        metadata: &PacketMetadata,
        references: &[DocumentReference],
    ) -> Result<Vec<u8>> {
        Ok(self.build_report(metadata, references).await?.bytes)
    }

    /// Build a packet and report its page numbering and failures.
    ///
    /// # Errors
    ///
    /// Same as [`build`](Self::build).
    pub async fn build_report(
        &self,
        metadata: &PacketMetadata,
        references: &[DocumentReference],
    ) -> Result<PacketOutput> {
        let start = Instant::now();
        let details = metadata.validate()?;

        let (loaded, stats) = self
            .reader
            .resolve_all(self.store.as_ref(), references, self.options.jobs)
            .await;
        debug!(
            resolved = stats.success_count,
            failed = stats.failure_count,
            pages = stats.total_pages,
            elapsed = ?stats.total_time,
            "documents resolved"
        );

        let options = self.options.clone();
        let references = references.to_vec();
        let mut output = task::spawn_blocking(move || {
            assemble(&details, &references, loaded, &options)
        })
        .await
        .map_err(|e| PacketError::other(format!("Assembly task failed: {e}")))??;

        output.load_time = stats.total_time;
        output.build_time = start.elapsed();

        info!(
            pages = output.total_pages,
            documents = output.entries.len(),
            failed = output.failures.len(),
            bytes = output.bytes.len(),
            "packet built"
        );

        Ok(output)
    }

    /// Resolve documents and compute page numbering without building.
    ///
    /// A document that resolves here can in rare cases still fail to
    /// import during a real build.
    pub async fn plan(&self, references: &[DocumentReference]) -> ResolutionReport {
        let (loaded, _) = self
            .reader
            .resolve_all(self.store.as_ref(), references, self.options.jobs)
            .await;

        let outcomes = loaded
            .into_iter()
            .map(|result| result.map(|pdf| PageContribution::new(pdf.page_count)));

        accounting::account(references, outcomes)
    }
}

/// Run the three passes and serialize.
fn assemble(
    details: &CoverDetails,
    references: &[DocumentReference],
    loaded: Vec<LoadResult>,
    options: &BuildOptions,
) -> Result<PacketOutput> {
    let page_size = options.page_size;
    let mut packet = PacketDocument::new(page_size);

    // Pass 1: cover and draft contents.
    let cover_id = packet.add_page(&front_matter::cover_content(
        details,
        &options.date_format,
        page_size,
    ))?;
    let draft = TocRow::draft(references);
    let toc_id = packet.add_page(&front_matter::toc_content(&draft, page_size, false))?;

    // Pass 2: merge in reference order.
    let mut first_pages: Vec<Option<ObjectId>> = Vec::with_capacity(references.len());
    let mut outcomes: Vec<Outcome> = Vec::with_capacity(references.len());
    for (index, (reference, result)) in references.iter().zip(loaded).enumerate() {
        let outcome = result.and_then(|pdf| {
            packet
                .append_document(pdf.document)
                .map_err(|kind| ResolutionFailure {
                    index,
                    display_title: reference.display_title.clone(),
                    locator: reference.source_locator.clone(),
                    kind,
                })
        });

        match outcome {
            Ok(page_ids) => {
                debug!(
                    index,
                    title = %reference.display_title,
                    pages = page_ids.len(),
                    "merged document"
                );
                first_pages.push(page_ids.first().copied());
                outcomes.push(Ok(PageContribution::new(page_ids.len())));
            }
            Err(failure) => {
                first_pages.push(None);
                outcomes.push(Err(failure));
            }
        }
    }

    let report = accounting::account(references, outcomes);

    // Pass 3: repaint the contents page with final numbers.
    let rows = TocRow::finalized(&report.entries);
    packet.overdraw_page(toc_id, &front_matter::toc_content(&rows, page_size, true))?;

    let total_pages = packet.page_count();
    debug_assert_eq!(total_pages, report.total_pages());

    let bookmarks_added = if options.bookmarks {
        let mut items = vec![
            ("Cover".to_string(), cover_id),
            ("Table of Contents".to_string(), toc_id),
        ];
        items.extend(
            report
                .entries
                .iter()
                .zip(&first_pages)
                .filter_map(|(entry, page)| page.map(|id| (entry.display_title.clone(), id))),
        );
        BookmarkManager::new().add_outline(packet.document_mut(), &items)?
    } else {
        0
    };

    MetadataManager::new().set_metadata(packet.document_mut(), details);

    let bytes = PdfWriter::with_compression(options.compression).to_bytes(packet.into_document())?;

    Ok(PacketOutput {
        bytes,
        entries: report.entries,
        failures: report.failures,
        total_pages,
        bookmarks_added,
        load_time: Duration::ZERO,
        build_time: Duration::ZERO,
    })
}
