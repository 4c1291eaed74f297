//! The packet's page tree.
//!
//! [`PacketDocument`] owns the output document for the duration of one
//! build. Front matter pages are drawn directly; source documents are
//! imported whole, page tree and all, and grafted onto a single flat
//! `Pages` node.

use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use super::front_matter::{BOLD_FONT, REGULAR_FONT};
use crate::config::PageSize;
use crate::error::{FailureKind, PacketError, Result};

/// Page attributes a page may inherit from its ancestors.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page tree depth beyond which a source document is considered malformed.
const MAX_TREE_DEPTH: usize = 64;

/// An in-progress packet.
#[derive(Debug)]
pub struct PacketDocument {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_size: PageSize,
}

impl PacketDocument {
    /// Create an empty packet with the standard fonts registered.
    pub fn new(page_size: PageSize) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(standard_font("Helvetica"));
        let bold_id = doc.add_object(standard_font("Helvetica-Bold"));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                REGULAR_FONT => regular_id,
                BOLD_FONT => bold_id,
            },
            "ProcSet" => vec![Object::Name(b"PDF".to_vec()), Object::Name(b"Text".to_vec())],
        });

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            pages_id,
            resources_id,
            page_size,
        }
    }

    /// Append a page drawn with `content`.
    pub fn add_page(&mut self, content: &Content) -> Result<ObjectId> {
        let (width, height) = self.page_size.dimensions();
        let content_id = self.add_content_stream(content)?;

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Resources" => self.resources_id,
            "Contents" => content_id,
        });

        self.add_pages_to_tree(&[page_id])?;
        Ok(page_id)
    }

    /// Paint `content` over an existing page.
    ///
    /// The content is appended as an additional stream, so it is drawn on
    /// top of whatever the page already shows.
    pub fn overdraw_page(&mut self, page_id: ObjectId, content: &Content) -> Result<()> {
        let content_id = self.add_content_stream(content)?;

        let page = self
            .doc
            .get_dictionary_mut(page_id)
            .map_err(|e| PacketError::other(format!("Failed to get page: {e}")))?;

        let contents = match page.get(b"Contents").ok().cloned() {
            Some(Object::Reference(existing_id)) => Object::Array(vec![
                Object::Reference(existing_id),
                Object::Reference(content_id),
            ]),
            Some(Object::Array(mut streams)) => {
                streams.push(Object::Reference(content_id));
                Object::Array(streams)
            }
            _ => Object::Reference(content_id),
        };
        page.set("Contents", contents);

        Ok(())
    }

    /// Import every page of `source`, in order, after the pages added so
    /// far.
    ///
    /// Returns the new page ids. The packet is left untouched when the
    /// source cannot be imported.
    pub fn append_document(
        &mut self,
        mut source: Document,
    ) -> std::result::Result<Vec<ObjectId>, FailureKind> {
        if let Ok(encrypt_id) = source.trailer.get(b"Encrypt").and_then(Object::as_reference) {
            source.objects.remove(&encrypt_id);
            source.trailer.remove(b"Encrypt");
        }
        source.renumber_objects_with(self.doc.max_id + 1);

        let page_ids: Vec<ObjectId> = source.get_pages().into_values().collect();
        if page_ids.is_empty() {
            return Err(FailureKind::Empty);
        }

        let (width, height) = self.page_size.dimensions();
        for &page_id in &page_ids {
            let inherited = inherited_attributes(&source, page_id)?;
            let page = source
                .get_dictionary_mut(page_id)
                .map_err(|e| FailureKind::Parse(format!("page {page_id:?}: {e}")))?;

            for (key, value) in inherited {
                page.set(key, value);
            }
            if !page.has(b"MediaBox") {
                page.set(
                    "MediaBox",
                    vec![0.into(), 0.into(), width.into(), height.into()],
                );
            }
            page.set("Parent", self.pages_id);
        }

        let max_id = source.max_id;
        let objects = source
            .objects
            .into_iter()
            .filter(|(_, object)| !matches!(object.type_name(), Ok(b"Catalog" | b"Pages")));
        self.doc.objects.extend(objects);
        self.doc.max_id = self.doc.max_id.max(max_id);

        self.add_pages_to_tree(&page_ids)
            .map_err(|e| FailureKind::Parse(e.to_string()))?;

        Ok(page_ids)
    }

    /// Number of pages so far.
    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Mutable access to the underlying document.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Finish the packet, handing back the document.
    pub fn into_document(self) -> Document {
        self.doc
    }

    fn add_content_stream(&mut self, content: &Content) -> Result<ObjectId> {
        let bytes = content
            .encode()
            .map_err(|e| PacketError::other(format!("Failed to encode page content: {e}")))?;
        Ok(self.doc.add_object(Stream::new(Dictionary::new(), bytes)))
    }

    /// Add pages to the packet's page tree.
    fn add_pages_to_tree(&mut self, page_ids: &[ObjectId]) -> Result<()> {
        let pages = self
            .doc
            .get_dictionary_mut(self.pages_id)
            .map_err(|e| PacketError::other(format!("Failed to get pages object: {e}")))?;

        match pages.get_mut(b"Kids") {
            Ok(Object::Array(kids)) => {
                kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));
            }
            _ => return Err(PacketError::other("Pages dictionary missing Kids array")),
        }

        let current_count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        pages.set("Count", current_count + page_ids.len() as i64);

        Ok(())
    }
}

fn standard_font(base_font: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Collect attributes a page inherits but does not carry itself.
fn inherited_attributes(
    doc: &Document,
    page_id: ObjectId,
) -> std::result::Result<Vec<(&'static [u8], Object)>, FailureKind> {
    let page = doc
        .get_dictionary(page_id)
        .map_err(|e| FailureKind::Parse(format!("page {page_id:?}: {e}")))?;

    let mut missing: Vec<&'static [u8]> = INHERITABLE_KEYS
        .into_iter()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;

    while let Some(node_id) = parent {
        if missing.is_empty() {
            break;
        }
        depth += 1;
        if depth > MAX_TREE_DEPTH {
            return Err(FailureKind::Parse("page tree is too deep".to_string()));
        }

        let Ok(node) = doc.get_dictionary(node_id) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(found)
}
