//! CLI argument parsing for pdfpacket.
//!
//! This module defines the command-line interface structure using `clap`.
//! It handles argument parsing, validation, and help text generation.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpacket::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("Building packet from {}", cli.manifest.display());
//! ```

use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::config::{CompressionLevel, Config, OverwriteMode, PageSize, StoreConfig};
use crate::error::{PacketError, Result};
use crate::model::DEFAULT_DATE_FORMAT;
use crate::store::DEFAULT_SIGNED_URL_TTL_SECS;
use crate::store::http::HttpStoreConfig;

/// Assemble product documents into a submittal packet.
///
/// pdfpacket reads a packet manifest, fetches each listed PDF from a
/// document store, and merges them behind a generated cover page and
/// table of contents whose page numbers match the merged output.
#[derive(Parser, Debug)]
#[command(name = "pdfpacket")]
#[command(version)]
#[command(about = "Assemble product documents into a submittal packet PDF", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Packet manifest (JSON)
    ///
    /// Holds the packet metadata and the ordered list of documents:
    ///   { "metadata": { "title": ..., "preparedBy": ..., "submittedTo": ...,
    ///                   "date": "2024-03-05" },
    ///     "documents": [ { "displayTitle": ..., "sourceLocator": ... } ] }
    #[arg(required = true, value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Output PDF file path
    ///
    /// Use --force to overwrite existing files without confirmation.
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Directory that document locators are resolved against
    ///
    /// Takes precedence over --store-url. Defaults to the directory
    /// containing the manifest when no store URL is configured.
    #[arg(long, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    /// Base URL of the hosted storage backend
    ///
    /// Documents are fetched through signed URLs from the bucket
    /// given with --bucket.
    #[arg(long, value_name = "URL", env = "PDFPACKET_STORE_URL")]
    pub store_url: Option<String>,

    /// Storage bucket holding the documents
    #[arg(long, value_name = "NAME", env = "PDFPACKET_BUCKET")]
    pub bucket: Option<String>,

    /// API key for the storage backend
    #[arg(long, value_name = "KEY", env = "PDFPACKET_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Validity window of signed download URLs, in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_SIGNED_URL_TTL_SECS)]
    pub signed_url_ttl: u64,

    /// Per-request timeout for the storage backend, in seconds
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub timeout: u64,

    /// Page size of the cover and table of contents
    #[arg(long, value_name = "SIZE", default_value = "letter")]
    #[arg(value_parser = ["letter", "a4"])]
    pub page_size: String,

    /// Compression level for output PDF
    ///
    /// - none: No compression
    /// - standard: Compress content streams (default)
    /// - maximum: Compress and drop unreferenced objects
    #[arg(short, long, value_name = "LEVEL", default_value = "standard")]
    #[arg(value_parser = ["none", "standard", "maximum"])]
    pub compression: String,

    /// Do not add an outline (bookmarks) to the packet
    #[arg(long)]
    pub no_bookmarks: bool,

    /// Number of documents fetched concurrently
    ///
    /// Default is number of CPU cores. Use 1 for sequential fetching.
    /// Documents are always merged in manifest order.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Format of the date printed on the cover (chrono strftime syntax)
    #[arg(long, value_name = "FMT", default_value = DEFAULT_DATE_FORMAT)]
    pub date_format: String,

    /// Force overwrite of existing output file without confirmation
    #[arg(short, long)]
    pub force: bool,

    /// Never overwrite existing output file
    #[arg(long, conflicts_with = "force")]
    pub no_clobber: bool,

    /// Dry run - resolve documents and print the page plan without writing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Fail without writing output if any document cannot be resolved
    #[arg(long)]
    pub strict: bool,

    /// Suppress all non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - show per-document details and statistics
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Convert CLI arguments into a validated Config.
    ///
    /// # Errors
    ///
    /// Returns an error if the page size or compression level is invalid,
    /// or if configuration validation fails.
    pub fn to_config(&self) -> Result<Config> {
        let compression = CompressionLevel::from_str(&self.compression)?;
        let page_size = PageSize::from_str(&self.page_size)?;

        let overwrite_mode = if self.force {
            OverwriteMode::Force
        } else if self.no_clobber {
            OverwriteMode::NoClobber
        } else {
            OverwriteMode::Prompt
        };

        let config = Config {
            manifest: self.manifest.clone(),
            output: self.output.clone(),
            store: self.store_config(),
            page_size,
            compression,
            bookmarks: !self.no_bookmarks,
            jobs: self.jobs,
            date_format: self.date_format.clone(),
            overwrite_mode,
            dry_run: self.dry_run,
            strict: self.strict,
            quiet: self.quiet,
            verbose: self.verbose,
        };

        config.validate().map_err(|e| {
            PacketError::invalid_config(format!("Configuration validation failed: {e}"))
        })?;

        Ok(config)
    }

    /// Validate CLI arguments before processing.
    ///
    /// Performs early checks that don't require file I/O.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<()> {
        if self.manifest.as_os_str().is_empty() {
            return Err(PacketError::invalid_config("No manifest specified"));
        }

        if let Some(jobs) = self.jobs
            && jobs == 0
        {
            return Err(PacketError::invalid_config(
                "Number of jobs must be at least 1",
            ));
        }

        if !["none", "standard", "maximum"].contains(&self.compression.as_str()) {
            return Err(PacketError::invalid_config(format!(
                "Invalid compression level: {}",
                self.compression
            )));
        }

        if self.store_dir.is_none() && self.store_url.is_some() && self.bucket.is_none() {
            return Err(PacketError::invalid_config(
                "--bucket is required with --store-url",
            ));
        }

        Ok(())
    }

    fn store_config(&self) -> StoreConfig {
        if let Some(root) = &self.store_dir {
            return StoreConfig::Local { root: root.clone() };
        }

        match &self.store_url {
            Some(url) => StoreConfig::Http(HttpStoreConfig {
                base_url: url.trim_end_matches('/').to_string(),
                bucket: self.bucket.clone().unwrap_or_default(),
                api_key: self.api_key.clone(),
                signed_url_ttl: self.signed_url_ttl,
                timeout: Duration::from_secs(self.timeout),
            }),
            None => StoreConfig::Local {
                root: manifest_dir(&self.manifest),
            },
        }
    }
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
