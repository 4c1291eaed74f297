//! pdfpacket - Assemble product documents into a submittal packet PDF.
//!
//! A packet is a generated cover page, a generated table of contents, and
//! the pages of each selected document, merged in the order given. The
//! table of contents lists the page each document starts on in the merged
//! output. Those numbers are only known once every document has been
//! merged, so the contents page is drawn twice: once as a draft, and again
//! over the draft after merging.
//!
//! - Documents are fetched through a [`DocumentStore`](store::DocumentStore):
//!   a local directory, hosted object storage with signed URLs, or memory.
//! - A document that cannot be fetched or parsed is skipped with a warning.
//!   Its row stays in the table of contents and no page gap is left.
//! - Missing metadata and serialization failures abort the build.
//!
//! # Examples
//!
//! ## Building a packet
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use pdfpacket::model::{DocumentReference, PacketMetadata};
//! use pdfpacket::packet::PacketBuilder;
//! use pdfpacket::store::LocalStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let metadata = PacketMetadata::new(
//!     "Roofing Submittal",
//!     "Jane Smith",
//!     "City Engineering",
//!     Utc::now(),
//! )
//! .with_project_number("P-1042");
//!
//! let documents = vec![
//!     DocumentReference::new("Product Data", "tds/membrane.pdf"),
//!     DocumentReference::new("Warranty", "warranty/20-year.pdf"),
//! ];
//!
//! let builder = PacketBuilder::new(Arc::new(LocalStore::new("./documents")));
//! let output = builder.build_report(&metadata, &documents).await?;
//!
//! for entry in &output.entries {
//!     println!("{} starts on page {}", entry.display_title, entry.start_page_number);
//! }
//! std::fs::write("packet.pdf", &output.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Planning without building
//!
//! ```no_run
//! use std::sync::Arc;
//! use pdfpacket::model::DocumentReference;
//! use pdfpacket::packet::PacketBuilder;
//! use pdfpacket::store::MemoryStore;
//!
//! # async fn example() {
//! let builder = PacketBuilder::new(Arc::new(MemoryStore::new()));
//! let plan = builder
//!     .plan(&[DocumentReference::new("Product Data", "tds/membrane.pdf")])
//!     .await;
//! println!("{} pages", plan.total_pages());
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod output;
pub mod packet;
pub mod store;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use config::Config;
pub use error::{FailureKind, PacketError, ResolutionFailure, Result, StoreError};
pub use model::{DocumentReference, PacketMetadata, ResolvedDocumentEntry};
pub use packet::{BuildOptions, PacketBuilder, PacketOutput};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
