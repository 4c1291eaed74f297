//! Page accounting.
//!
//! Turns per-document outcomes into [`ResolvedDocumentEntry`] values. The
//! fold walks outcomes in reference order with a page cursor that starts
//! right after the front matter and advances only by pages actually
//! contributed, so a failed document never leaves a gap.

use tracing::warn;

use crate::error::ResolutionFailure;
use crate::model::{DocumentReference, FRONT_MATTER_PAGE_COUNT, ResolvedDocumentEntry};

/// Pages one document added to the packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageContribution {
    /// Number of pages contributed.
    pub page_count: usize,
}

impl PageContribution {
    /// Create a contribution of `page_count` pages.
    pub fn new(page_count: usize) -> Self {
        Self { page_count }
    }
}

/// Outcome of resolving one document.
pub type Outcome = std::result::Result<PageContribution, ResolutionFailure>;

/// Page numbering for a whole packet plus the documents that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// One entry per reference, in reference order.
    pub entries: Vec<ResolvedDocumentEntry>,

    /// Documents that contributed no pages, in reference order.
    pub failures: Vec<ResolutionFailure>,
}

impl ResolutionReport {
    /// Total pages in the packet, front matter included.
    pub fn total_pages(&self) -> usize {
        FRONT_MATTER_PAGE_COUNT + self.entries.iter().map(|e| e.page_count).sum::<usize>()
    }

    /// Whether every document resolved.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Fold per-document outcomes into page numbering.
///
/// `outcomes` must yield one item per reference, in the same order. Failed
/// outcomes are logged and produce a zero-page entry at the current
/// cursor.
pub fn account<I>(references: &[DocumentReference], outcomes: I) -> ResolutionReport
where
    I: IntoIterator<Item = Outcome>,
{
    let first_page = FRONT_MATTER_PAGE_COUNT + 1;

    let (_, report) = references.iter().zip(outcomes).fold(
        (first_page, ResolutionReport::default()),
        |(cursor, mut report), (reference, outcome)| {
            let page_count = match outcome {
                Ok(contribution) => contribution.page_count,
                Err(failure) => {
                    warn!(
                        index = failure.index,
                        title = %failure.display_title,
                        locator = %failure.locator,
                        reason = %failure.kind,
                        "document skipped"
                    );
                    report.failures.push(failure);
                    0
                }
            };

            report.entries.push(ResolvedDocumentEntry {
                display_title: reference.display_title.clone(),
                page_count,
                start_page_number: cursor,
            });

            (cursor + page_count, report)
        },
    );

    report
}
