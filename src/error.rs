//! Error types for pdfpacket.
//!
//! Errors fall into two groups:
//!
//! - **Fatal** errors ([`PacketError`]) abort a build and produce no output:
//!   missing metadata, serialization failures, configuration and output
//!   file problems.
//! - **Per-document** failures ([`ResolutionFailure`]) are recorded while a
//!   packet is assembled. They degrade the affected entry to zero pages and
//!   never abort the build.
//!
//! [`StoreError`] is the error contract of a
//! [`DocumentStore`](crate::store::DocumentStore).

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfpacket operations.
pub type Result<T> = std::result::Result<T, PacketError>;

/// Main error type for fatal pdfpacket failures.
#[derive(Debug, thiserror::Error)]
pub enum PacketError {
    /// A required packet metadata field is missing or blank.
    #[error("Invalid packet metadata: '{field}' is required")]
    InvalidMetadata {
        /// Name of the missing field.
        field: &'static str,
    },

    /// The assembled packet could not be serialized to bytes.
    #[error("Failed to serialize packet PDF: {reason}")]
    Serialization {
        /// Reason for the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what's wrong with the configuration.
        message: String,
    },

    /// The packet manifest could not be read or parsed.
    #[error("Failed to load packet manifest: {}\n  Reason: {reason}", .path.display())]
    ManifestLoad {
        /// Path to the manifest.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// Output file already exists and overwrite is not allowed.
    #[error(
        "Output file already exists: {}\n  Use --force to overwrite or choose a different output path",
        .path.display()
    )]
    OutputExists {
        /// Path to the existing output file.
        path: PathBuf,
    },

    /// Failed to write the output file.
    #[error("Failed to write to output file: {}\n  Reason: {source}", .path.display())]
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// One or more documents failed to resolve in strict mode.
    #[error("{count} document(s) could not be resolved")]
    UnresolvedDocuments {
        /// Number of failed documents.
        count: usize,
    },

    /// User cancelled the operation.
    #[error("Operation cancelled by user")]
    Cancelled,

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error with a custom message.
    #[error("{message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl From<lopdf::Error> for PacketError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for PacketError {
    fn from(err: anyhow::Error) -> Self {
        Self::invalid_config(err.to_string())
    }
}

impl PacketError {
    /// Create an InvalidMetadata error.
    pub fn invalid_metadata(field: &'static str) -> Self {
        Self::InvalidMetadata { field }
    }

    /// Create a Serialization error.
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a ManifestLoad error.
    pub fn manifest_load(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::ManifestLoad {
            path,
            reason: reason.into(),
        }
    }

    /// Create an OutputExists error.
    pub fn output_exists(path: PathBuf) -> Self {
        Self::OutputExists { path }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidMetadata { .. } => 3,
            Self::Serialization { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::ManifestLoad { .. } => 2,
            Self::OutputExists { .. } => 4,
            Self::FailedToWrite { .. } => 5,
            Self::UnresolvedDocuments { .. } => 7,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io(_) => 5,
            Self::Other { .. } => 1,
        }
    }
}

/// Errors reported by a document store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No document exists for the locator.
    #[error("document not found: {locator}")]
    NotFound {
        /// The locator that could not be resolved.
        locator: String,
    },

    /// The transport returned a non-success response or failed outright.
    #[error("failed to fetch {url}: {reason}")]
    Fetch {
        /// URL that was requested.
        url: String,
        /// Reason for the failure.
        reason: String,
    },
}

impl StoreError {
    /// Create a NotFound error.
    pub fn not_found(locator: impl Into<String>) -> Self {
        Self::NotFound {
            locator: locator.into(),
        }
    }

    /// Create a Fetch error.
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }
}

/// Why a single document could not contribute pages to a packet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FailureKind {
    /// The store has no document for the locator.
    #[error("not found in document store")]
    NotFound,

    /// Fetching the document bytes failed.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The bytes are not a well-formed PDF.
    #[error("not a valid PDF: {0}")]
    Parse(String),

    /// The PDF needs a user password to open.
    #[error("PDF is password protected")]
    Encrypted,

    /// The PDF parsed but has no pages.
    #[error("PDF has no pages")]
    Empty,
}

impl From<StoreError> for FailureKind {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound,
            StoreError::Fetch { reason, .. } => Self::Fetch(reason),
        }
    }
}

/// A non-fatal failure to resolve one document reference.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("document #{} '{display_title}' ({locator}): {kind}", .index + 1)]
pub struct ResolutionFailure {
    /// Zero-based position of the reference in the caller's list.
    pub index: usize,
    /// Title shown in the table of contents.
    pub display_title: String,
    /// Locator that was being resolved.
    pub locator: String,
    /// What went wrong.
    pub kind: FailureKind,
}
