//! Document Info dictionary for packets.
//!
//! Dates are taken from the packet date rather than the clock, so two
//! builds of the same packet carry the same Info dictionary.

use chrono::{DateTime, Utc};
use lopdf::{Dictionary, Document, Object, StringFormat};

use crate::model::CoverDetails;

/// Producer and creator name written to the Info dictionary.
pub const PRODUCER: &str = "pdfpacket";

/// Writes packet metadata into the Info dictionary.
#[derive(Debug, Default)]
pub struct MetadataManager;

impl MetadataManager {
    /// Create a new metadata manager.
    pub fn new() -> Self {
        Self
    }

    /// Set the Info dictionary from cover details.
    ///
    /// Title, Author (preparer), Subject (recipient), and Keywords (project
    /// number, when present) are set along with Creator, Producer, and
    /// dates.
    pub fn set_metadata(&self, doc: &mut Document, details: &CoverDetails) {
        let mut info = Dictionary::new();
        info.set("Title", text_string(&details.title));
        info.set("Author", text_string(&details.prepared_by));
        info.set(
            "Subject",
            text_string(&format!("Submittal to {}", details.submitted_to)),
        );
        if let Some(project_number) = &details.project_number {
            info.set("Keywords", text_string(project_number));
        }
        info.set("Creator", text_string(PRODUCER));
        info.set("Producer", text_string(PRODUCER));

        let date = format_pdf_date(details.date);
        info.set("CreationDate", Object::string_literal(date.clone()));
        info.set("ModDate", Object::string_literal(date));

        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);
    }
}

/// Encode a PDF text string.
///
/// ASCII stays a literal string; anything else is written as UTF-16BE
/// with a byte order mark.
pub fn text_string(value: &str) -> Object {
    if value.is_ascii() {
        return Object::string_literal(value);
    }

    let mut bytes = vec![0xFE, 0xFF];
    bytes.extend(value.encode_utf16().flat_map(u16::to_be_bytes));
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Format a timestamp as a PDF date string (`D:YYYYMMDDHHmmSSZ`).
pub fn format_pdf_date(date: DateTime<Utc>) -> String {
    date.format("D:%Y%m%d%H%M%SZ").to_string()
}
