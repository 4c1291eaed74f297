//! Bookmark (outline) creation for packets.

use lopdf::{Dictionary, Document, Object, ObjectId};

use super::metadata::text_string;
use crate::error::{PacketError, Result};

/// Builds the packet's navigation outline.
#[derive(Debug, Default)]
pub struct BookmarkManager;

impl BookmarkManager {
    /// Create a new bookmark manager.
    pub fn new() -> Self {
        Self
    }

    /// Add a flat outline with one entry per `(title, page)` item.
    ///
    /// Returns the number of entries written.
    pub fn add_outline(&self, doc: &mut Document, items: &[(String, ObjectId)]) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let outline_id = doc.new_object_id();
        let item_ids: Vec<ObjectId> = items.iter().map(|_| doc.new_object_id()).collect();

        for (i, ((title, page_id), &item_id)) in items.iter().zip(&item_ids).enumerate() {
            // [page /XYZ null null null] keeps the reader's zoom.
            let dest = vec![
                Object::Reference(*page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ];

            let mut item = Dictionary::new();
            item.set("Title", text_string(title));
            item.set("Parent", outline_id);
            item.set("Dest", dest);
            if i > 0 {
                item.set("Prev", item_ids[i - 1]);
            }
            if let Some(&next) = item_ids.get(i + 1) {
                item.set("Next", next);
            }

            doc.objects.insert(item_id, Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", item_ids.len() as i64);
        if let (Some(&first), Some(&last)) = (item_ids.first(), item_ids.last()) {
            outline.set("First", first);
            outline.set("Last", last);
        }
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        let catalog = doc
            .catalog_mut()
            .map_err(|e| PacketError::other(format!("Failed to get catalog: {e}")))?;
        catalog.set("Outlines", outline_id);
        catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));

        Ok(item_ids.len())
    }
}
