//! Shared helpers for integration tests.
//!
//! Source PDFs are synthesized in memory with lopdf, so the suite needs no
//! binary fixtures. Packets are inspected by decoding the content streams of
//! their pages.

#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{
    Document, EncryptionState, EncryptionVersion, Object, ObjectId, Permissions, Stream, dictionary,
};
use std::sync::Arc;

use pdfpacket::model::{DocumentReference, PacketMetadata};
use pdfpacket::packet::PacketBuilder;
use pdfpacket::store::MemoryStore;

/// Build a PDF with `pages` pages, each showing "{label} p{n}".
pub fn sample_pdf(pages: usize, label: &str) -> Vec<u8> {
    save(sample_document(pages, label))
}

/// Like [`sample_pdf`], encrypted with a print-only owner password.
///
/// An empty `user_password` gives a file any reader can open.
pub fn locked_pdf(pages: usize, label: &str, user_password: &str) -> Vec<u8> {
    let mut doc = sample_document(pages, label);
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal("pdfpacket-locked"),
            Object::string_literal("pdfpacket-locked"),
        ],
    );

    let state = EncryptionState::try_from(EncryptionVersion::V2 {
        document: &doc,
        owner_password: "owner",
        user_password,
        key_length: 128,
        permissions: Permissions::PRINTABLE,
    })
    .unwrap();
    doc.encrypt(&state).unwrap();
    save(doc)
}

fn save(mut doc: Document) -> Vec<u8> {
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

fn sample_document(pages: usize, label: &str) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("{label} p{n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Metadata with every required field present.
pub fn metadata() -> PacketMetadata {
    PacketMetadata::new(
        "Roofing Submittal",
        "Jane Smith",
        "City Engineering",
        Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
    )
    .with_project_number("P-1042")
}

/// A memory store holding one sample PDF per `(locator, pages)` pair.
pub fn store_with(docs: &[(&str, usize)]) -> MemoryStore {
    let store = MemoryStore::new();
    for (locator, pages) in docs {
        store.insert(*locator, sample_pdf(*pages, locator));
    }
    store
}

/// A builder over [`store_with`].
pub fn builder_with(docs: &[(&str, usize)]) -> PacketBuilder {
    PacketBuilder::new(Arc::new(store_with(docs)))
}

/// One reference per locator, titled "Title {locator}".
pub fn refs(locators: &[&str]) -> Vec<DocumentReference> {
    locators
        .iter()
        .map(|l| DocumentReference::new(format!("Title {l}"), *l))
        .collect()
}

/// Parse packet bytes with all streams decompressed.
pub fn load(bytes: &[u8]) -> Document {
    let mut doc = Document::load_mem(bytes).unwrap();
    doc.decompress();
    doc
}

/// Page ids in page order.
pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Text shown by `Tj` operators in one content stream.
pub fn shown_text(content: &[u8]) -> Vec<String> {
    text_runs(content).into_iter().map(|(_, text)| text).collect()
}

/// All text on a page, joined with spaces.
pub fn page_text(doc: &Document, page_id: ObjectId) -> String {
    shown_text(&doc.get_page_content(page_id).unwrap()).join(" ")
}

/// Text of every page after the front matter.
pub fn body_texts(doc: &Document) -> Vec<String> {
    page_ids(doc)
        .into_iter()
        .skip(2)
        .map(|id| page_text(doc, id))
        .collect()
}

/// Content streams of a page, in drawing order.
pub fn page_streams(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
    doc.get_page_contents(page_id)
        .into_iter()
        .map(|id| doc.get_object(id).unwrap().as_stream().unwrap().content.clone())
        .collect()
}

/// A table of contents row: title text and page label (empty when absent).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub title: String,
    pub label: String,
}

/// Rows drawn by one table of contents stream.
///
/// Text is grouped by baseline; the first two baselines are the heading
/// and the column captions.
pub fn toc_rows_in(content: &[u8]) -> Vec<Row> {
    let mut lines: Vec<(f32, Vec<String>)> = Vec::new();
    for (y, text) in text_runs(content) {
        match lines.last_mut() {
            Some((last_y, texts)) if (*last_y - y).abs() < 0.5 => texts.push(text),
            _ => lines.push((y, vec![text])),
        }
    }

    lines
        .into_iter()
        .skip(2)
        .map(|(_, mut texts)| {
            let title = texts.remove(0);
            Row {
                title,
                label: texts.pop().unwrap_or_default(),
            }
        })
        .collect()
}

/// Rows currently visible on the packet's table of contents page.
pub fn toc_rows(doc: &Document) -> Vec<Row> {
    let toc_page = page_ids(doc)[1];
    let streams = page_streams(doc, toc_page);
    toc_rows_in(streams.last().unwrap())
}

/// Rows of the draft drawing underneath the final table of contents.
pub fn draft_toc_rows(doc: &Document) -> Vec<Row> {
    let toc_page = page_ids(doc)[1];
    let streams = page_streams(doc, toc_page);
    toc_rows_in(&streams[0])
}

/// Labels of the visible table of contents rows.
pub fn toc_labels(doc: &Document) -> Vec<String> {
    toc_rows(doc).into_iter().map(|row| row.label).collect()
}

/// Read a string from the Info dictionary.
pub fn info_field(doc: &Document, key: &[u8]) -> Option<String> {
    let info_id = doc.trailer.get(b"Info").ok()?.as_reference().ok()?;
    match doc.get_dictionary(info_id).ok()?.get(key).ok()? {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Outline titles, first to last.
pub fn outline_titles(doc: &Document) -> Vec<String> {
    let Ok(outline_id) = doc
        .catalog()
        .and_then(|c| c.get(b"Outlines"))
        .and_then(Object::as_reference)
    else {
        return Vec::new();
    };
    let outline = doc.get_dictionary(outline_id).unwrap();

    let mut titles = Vec::new();
    let mut next = outline.get(b"First").and_then(Object::as_reference).ok();
    while let Some(id) = next {
        let item = doc.get_dictionary(id).unwrap();
        if let Ok(Object::String(bytes, _)) = item.get(b"Title") {
            titles.push(String::from_utf8_lossy(bytes).into_owned());
        }
        next = item.get(b"Next").and_then(Object::as_reference).ok();
    }
    titles
}

/// `(baseline, text)` for every `Tj` in a content stream.
fn text_runs(content: &[u8]) -> Vec<(f32, String)> {
    let content = Content::decode(content).unwrap();
    let mut y = 0.0;
    let mut runs = Vec::new();

    for op in content.operations {
        match op.operator.as_str() {
            "Td" => {
                if let Some(value) = op.operands.get(1).and_then(|o| o.as_float().ok()) {
                    y = value;
                }
            }
            "Tj" => {
                if let Some(Object::String(bytes, _)) = op.operands.first() {
                    runs.push((y, String::from_utf8_lossy(bytes).into_owned()));
                }
            }
            _ => {}
        }
    }
    runs
}
