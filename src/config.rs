//! Configuration module for pdfpacket.
//!
//! This module turns CLI arguments into a validated configuration that
//! drives a packet build, and loads the packet manifest that names the
//! metadata and documents. It handles:
//! - Validation of argument combinations
//! - Store selection (local directory or hosted storage)
//! - Application of defaults

use anyhow::{Result, bail};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use crate::PacketError;
use crate::model::{DEFAULT_DATE_FORMAT, DocumentReference, PacketMetadata};
use crate::packet::BuildOptions;
use crate::store::http::HttpStoreConfig;
use crate::store::{DocumentStore, HttpStore, LocalStore};

/// Compression level for the output PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionLevel {
    /// No compression.
    None,
    /// Compress content streams.
    #[default]
    Standard,
    /// Compress streams and drop unreferenced objects.
    Maximum,
}

impl FromStr for CompressionLevel {
    type Err = PacketError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "standard" => Ok(Self::Standard),
            "maximum" => Ok(Self::Maximum),
            _ => Err(PacketError::invalid_config(format!(
                "Invalid compression level: {s}. Must be one of: none, standard, maximum"
            ))),
        }
    }
}

/// Page size used for the cover and table of contents.
///
/// Merged documents keep their own page sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    /// US Letter, 8.5 x 11 in.
    #[default]
    Letter,
    /// ISO A4, 210 x 297 mm.
    A4,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            Self::Letter => (612.0, 792.0),
            Self::A4 => (595.0, 842.0),
        }
    }
}

impl FromStr for PageSize {
    type Err = PacketError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "letter" => Ok(Self::Letter),
            "a4" => Ok(Self::A4),
            _ => Err(PacketError::invalid_config(format!(
                "Invalid page size: {s}. Must be one of: letter, a4"
            ))),
        }
    }
}

/// Output file overwrite behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Prompt the user before overwriting (default).
    #[default]
    Prompt,
    /// Always overwrite without prompting.
    Force,
    /// Never overwrite, error if file exists.
    NoClobber,
}

/// Where packet documents are fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    /// Locators are paths relative to a directory.
    Local {
        /// Directory that locators are resolved against.
        root: PathBuf,
    },
    /// Hosted object storage with signed URLs.
    Http(HttpStoreConfig),
}

impl StoreConfig {
    /// Open the configured store.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn open(&self) -> crate::Result<Arc<dyn DocumentStore>> {
        match self {
            Self::Local { root } => Ok(Arc::new(LocalStore::new(root.clone()))),
            Self::Http(config) => {
                let store = HttpStore::new(config.clone())
                    .map_err(|e| PacketError::invalid_config(e.to_string()))?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Human-readable description for status output.
    pub fn describe(&self) -> String {
        match self {
            Self::Local { root } => format!("directory {}", root.display()),
            Self::Http(config) => format!("bucket '{}' at {}", config.bucket, config.base_url),
        }
    }
}

/// A packet request read from disk.
///
/// ```json
/// {
///   "metadata": { "title": "...", "preparedBy": "...", "submittedTo": "...", "date": "2024-03-05" },
///   "documents": [ { "displayTitle": "Product Data", "sourceLocator": "tds/acme.pdf" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Cover page metadata.
    pub metadata: PacketMetadata,

    /// Documents in packet order.
    #[serde(default)]
    pub documents: Vec<DocumentReference>,
}

impl Manifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Read and parse a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::ManifestLoad`] if the file cannot be read or
    /// is not a valid manifest.
    pub async fn load(path: &Path) -> crate::Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PacketError::manifest_load(path.to_path_buf(), e.to_string()))?;

        Self::from_json(&text)
            .map_err(|e| PacketError::manifest_load(path.to_path_buf(), e.to_string()))
    }
}

/// Complete configuration for one packet build.
///
/// Derived and validated from CLI arguments.
#[derive(Debug, Clone)]
pub struct Config {
    /// Packet manifest path.
    pub manifest: PathBuf,

    /// Output PDF file path.
    pub output: PathBuf,

    /// Document store to fetch from.
    pub store: StoreConfig,

    /// Front matter page size.
    pub page_size: PageSize,

    /// Compression level for output.
    pub compression: CompressionLevel,

    /// Add an outline entry per document.
    pub bookmarks: bool,

    /// Number of concurrent fetches (None = auto-detect).
    pub jobs: Option<usize>,

    /// `chrono` format string for the cover date.
    pub date_format: String,

    /// File overwrite behavior.
    pub overwrite_mode: OverwriteMode,

    /// Resolve and plan without writing output.
    pub dry_run: bool,

    /// Fail instead of writing when any document cannot be resolved.
    pub strict: bool,

    /// Quiet mode - suppress non-error output.
    pub quiet: bool,

    /// Verbose output mode.
    pub verbose: bool,
}

impl Config {
    /// Create a configuration with defaults for everything but paths and
    /// store.
    pub fn new(manifest: PathBuf, output: PathBuf, store: StoreConfig) -> Self {
        Self {
            manifest,
            output,
            store,
            page_size: PageSize::default(),
            compression: CompressionLevel::default(),
            bookmarks: true,
            jobs: None,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            overwrite_mode: OverwriteMode::default(),
            dry_run: false,
            strict: false,
            quiet: false,
            verbose: false,
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Verbose and quiet modes are both enabled
    /// - Jobs count is zero
    /// - The output path is the manifest path
    /// - The date format is not a valid `chrono` format
    /// - Hosted storage settings are incomplete or the signed URL TTL is zero
    pub fn validate(&self) -> Result<()> {
        if self.verbose && self.quiet {
            bail!("Cannot use both --verbose and --quiet");
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            bail!("Number of jobs must be at least 1");
        }

        if self.output == self.manifest {
            bail!(
                "Output file cannot be the same as the manifest: {}",
                self.output.display()
            );
        }

        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            bail!("Invalid date format: {}", self.date_format);
        }

        if let StoreConfig::Http(http) = &self.store {
            if !(http.base_url.starts_with("http://") || http.base_url.starts_with("https://")) {
                bail!("Store URL must start with http:// or https://: {}", http.base_url);
            }
            if http.bucket.trim().is_empty() {
                bail!("A storage bucket is required with --store-url");
            }
            if http.signed_url_ttl == 0 {
                bail!("Signed URL TTL must be at least 1 second");
            }
        }

        Ok(())
    }

    /// Get the effective number of concurrent fetches.
    ///
    /// Returns the configured job count, or the number of CPU cores if
    /// auto-detect.
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    /// Check if output should be displayed.
    ///
    /// Returns false if in quiet mode and not doing a dry run.
    pub fn should_print(&self) -> bool {
        !self.quiet || self.dry_run
    }

    /// Packet build options derived from this configuration.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            page_size: self.page_size,
            compression: self.compression,
            bookmarks: self.bookmarks,
            jobs: self.effective_jobs(),
            date_format: self.date_format.clone(),
        }
    }
}
