//! Packet serialization and output persistence.
//!
//! Serialization is a pure `Document -> Vec<u8>` step so the packet builder
//! can hand callers an in-memory buffer. Persisting that buffer is a
//! separate, atomic file write used by the CLI.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpacket::io::PdfWriter;
//! use std::path::Path;
//!
//! # async fn example(packet: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = PdfWriter::new();
//! let stats = writer.save_bytes(&packet, Path::new("packet.pdf")).await?;
//! println!("Wrote {} in {:?}", stats.format_file_size(), stats.write_time);
//! # Ok(())
//! # }
//! ```

use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::task;

use crate::config::CompressionLevel;
use crate::error::{PacketError, Result};

/// Options for serializing and writing packets.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Use atomic writes (write to temp file, then rename).
    pub atomic: bool,

    /// Stream compression applied before serialization.
    pub compression: CompressionLevel,

    /// Renumber objects before serialization.
    pub optimize: bool,

    /// Buffer size for writing (in bytes).
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            compression: CompressionLevel::Standard,
            optimize: true,
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Format file size as human-readable string.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Serializes packets and writes them to disk.
#[derive(Debug, Clone, Default)]
pub struct PdfWriter {
    options: WriteOptions,
}

impl PdfWriter {
    /// Create a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Create a writer with the given compression level.
    pub fn with_compression(compression: CompressionLevel) -> Self {
        Self {
            options: WriteOptions {
                compression,
                ..Default::default()
            },
        }
    }

    /// Serialize a document to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::Serialization`] if the document cannot be
    /// encoded. No partial output is returned.
    pub fn to_bytes(&self, mut doc: Document) -> Result<Vec<u8>> {
        match self.options.compression {
            CompressionLevel::None => {}
            CompressionLevel::Standard => doc.compress(),
            CompressionLevel::Maximum => {
                doc.compress();
                doc.prune_objects();
            }
        }

        if self.options.optimize {
            doc.renumber_objects();
        }

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| PacketError::serialization(e.to_string()))?;

        if bytes.is_empty() {
            return Err(PacketError::serialization("encoder produced no output"));
        }

        Ok(bytes)
    }

    /// Write serialized packet bytes to `path`.
    ///
    /// Parent directories are created as needed. With atomic writes the
    /// bytes go to a sibling temp file that is renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::FailedToWrite`] if any filesystem step fails.
    pub async fn save_bytes(&self, bytes: &[u8], path: &Path) -> Result<WriteStatistics> {
        let path_buf = path.to_path_buf();
        let options = self.options.clone();
        let bytes = bytes.to_vec();

        task::spawn_blocking(move || {
            let start = Instant::now();
            let failed = |path: &Path, source: std::io::Error| PacketError::FailedToWrite {
                path: path.to_path_buf(),
                source,
            };

            if let Some(parent) = path_buf.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).map_err(|e| failed(parent, e))?;
            }

            let write_path = if options.atomic {
                path_buf.with_extension("pdf.tmp")
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| failed(&write_path, e))?;
            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);

            writer
                .write_all(&bytes)
                .and_then(|()| writer.flush())
                .map_err(|e| failed(&write_path, e))?;
            drop(writer);

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    failed(&path_buf, e)
                })?;
            }

            Ok::<_, PacketError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| PacketError::other(format!("Write task failed: {e}")))?
    }

    /// Check that the output location is writable.
    ///
    /// A missing parent directory is acceptable since
    /// [`save_bytes`](Self::save_bytes) creates it. An existing parent that
    /// is read-only, or a path whose parent is a file, is not.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::InvalidConfig`] describing the problem.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        if tokio::fs::metadata(path)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
        {
            return Err(PacketError::invalid_config(format!(
                "Output path is a directory: {}",
                path.display()
            )));
        }

        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        match tokio::fs::metadata(parent).await {
            Ok(meta) if !meta.is_dir() => Err(PacketError::invalid_config(format!(
                "Output parent is not a directory: {}",
                parent.display()
            ))),
            Ok(meta) if meta.permissions().readonly() => Err(PacketError::invalid_config(
                format!("Output directory is not writable: {}", parent.display()),
            )),
            _ => Ok(()),
        }
    }

    /// Check if the output file exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
