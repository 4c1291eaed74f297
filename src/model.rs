//! Packet input and output records.
//!
//! [`PacketMetadata`] and [`DocumentReference`] are what a caller hands to
//! [`PacketBuilder`](crate::packet::PacketBuilder). [`ResolvedDocumentEntry`]
//! is what page accounting produces for each reference, in the same order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

use crate::error::{PacketError, Result};

/// Number of pages that precede the first merged document (cover + TOC).
pub const FRONT_MATTER_PAGE_COUNT: usize = 2;

/// Placeholder printed on the cover when no project number is given.
pub const PROJECT_NUMBER_PLACEHOLDER: &str = "N/A";

/// Default `chrono` format for the cover date, e.g. "March 5, 2024".
pub const DEFAULT_DATE_FORMAT: &str = "%B %-d, %Y";

/// Descriptive data for one packet build.
///
/// Fields are optional so that incomplete input can be represented and
/// rejected by [`PacketMetadata::validate`]. A whitespace-only string counts
/// as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacketMetadata {
    /// Packet title, printed large on the cover.
    #[serde(default)]
    pub title: Option<String>,

    /// Optional project number.
    #[serde(default)]
    pub project_number: Option<String>,

    /// Who prepared the packet.
    #[serde(default)]
    pub prepared_by: Option<String>,

    /// Who the packet is submitted to.
    #[serde(default)]
    pub submitted_to: Option<String>,

    /// Packet date. Accepts RFC 3339 or a plain `YYYY-MM-DD` date.
    #[serde(default, deserialize_with = "lenient_date::deserialize")]
    pub date: Option<DateTime<Utc>>,
}

impl PacketMetadata {
    /// Create metadata with all required fields present.
    pub fn new(
        title: impl Into<String>,
        prepared_by: impl Into<String>,
        submitted_to: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            project_number: None,
            prepared_by: Some(prepared_by.into()),
            submitted_to: Some(submitted_to.into()),
            date: Some(date),
        }
    }

    /// Set the project number.
    pub fn with_project_number(mut self, project_number: impl Into<String>) -> Self {
        self.project_number = Some(project_number.into());
        self
    }

    /// Check required fields and produce the values printed on the cover.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::InvalidMetadata`] naming the first missing
    /// field, checked in the order title, preparedBy, submittedTo, date.
    pub fn validate(&self) -> Result<CoverDetails> {
        let title = required(&self.title, "title")?;
        let prepared_by = required(&self.prepared_by, "preparedBy")?;
        let submitted_to = required(&self.submitted_to, "submittedTo")?;
        let date = self
            .date
            .ok_or_else(|| PacketError::invalid_metadata("date"))?;

        Ok(CoverDetails {
            title,
            project_number: non_blank(&self.project_number),
            prepared_by,
            submitted_to,
            date,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn required(value: &Option<String>, field: &'static str) -> Result<String> {
    non_blank(value).ok_or_else(|| PacketError::invalid_metadata(field))
}

/// Validated metadata, trimmed and guaranteed complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverDetails {
    /// Packet title.
    pub title: String,
    /// Project number, if any.
    pub project_number: Option<String>,
    /// Who prepared the packet.
    pub prepared_by: String,
    /// Who the packet is submitted to.
    pub submitted_to: String,
    /// Packet date.
    pub date: DateTime<Utc>,
}

impl CoverDetails {
    /// Project number or the cover placeholder.
    pub fn project_number_or_placeholder(&self) -> &str {
        self.project_number
            .as_deref()
            .unwrap_or(PROJECT_NUMBER_PLACEHOLDER)
    }

    /// Date rendered with a `chrono` format string.
    ///
    /// An unusable format string falls back to [`DEFAULT_DATE_FORMAT`].
    pub fn formatted_date(&self, format: &str) -> String {
        let mut rendered = String::new();
        if write!(rendered, "{}", self.date.format(format)).is_err() {
            rendered = self.date.format(DEFAULT_DATE_FORMAT).to_string();
        }
        rendered
    }
}

/// One selected document, in caller order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentReference {
    /// Title used in the table of contents.
    pub display_title: String,
    /// Opaque identifier resolvable by a document store.
    pub source_locator: String,
}

impl DocumentReference {
    /// Create a new document reference.
    pub fn new(display_title: impl Into<String>, source_locator: impl Into<String>) -> Self {
        Self {
            display_title: display_title.into(),
            source_locator: source_locator.into(),
        }
    }
}

/// Where a document landed in the merged packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedDocumentEntry {
    /// Title copied from the reference.
    pub display_title: String,
    /// Pages contributed (0 when the document failed to resolve).
    pub page_count: usize,
    /// 1-based page at which the document's first page lands.
    pub start_page_number: usize,
}

impl ResolvedDocumentEntry {
    /// Whether the document contributed any pages.
    pub fn is_resolved(&self) -> bool {
        self.page_count > 0
    }

    /// Last page occupied by this document, if it contributed any.
    pub fn end_page_number(&self) -> Option<usize> {
        self.is_resolved()
            .then(|| self.start_page_number + self.page_count - 1)
    }
}

mod lenient_date {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }

        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Some(date.with_timezone(&Utc)));
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|day| day.and_hms_opt(0, 0, 0))
            .map(|midnight| Some(midnight.and_utc()))
            .ok_or_else(|| D::Error::custom(format!("invalid date '{raw}'")))
    }
}
