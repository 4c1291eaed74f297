//! Integration tests for packet assembly and page numbering.

use pdfpacket::config::{CompressionLevel, PageSize};
use pdfpacket::packet::{BuildOptions, PacketBuilder};
use pdfpacket::store::MemoryStore;
use std::sync::Arc;

use crate::common::{
    Row, body_texts, builder_with, draft_toc_rows, info_field, load, metadata, outline_titles,
    page_ids, page_streams, page_text, refs, sample_pdf, toc_labels, toc_rows,
};

#[tokio::test]
async fn test_start_pages_follow_page_counts() {
    let builder = builder_with(&[("a", 2), ("b", 5), ("c", 1)]);
    let output = builder
        .build_report(&metadata(), &refs(&["a", "b", "c"]))
        .await
        .unwrap();

    let starts: Vec<usize> = output.entries.iter().map(|e| e.start_page_number).collect();
    assert_eq!(starts, vec![3, 5, 10]);
    assert_eq!(output.total_pages, 10);

    let doc = load(&output.bytes);
    assert_eq!(doc.get_pages().len(), 10);
    assert_eq!(toc_labels(&doc), vec!["3", "5", "10"]);
}

#[tokio::test]
async fn test_front_matter_occupies_first_two_pages() {
    let bytes = builder_with(&[("a", 3)])
        .build(&metadata(), &refs(&["a"]))
        .await
        .unwrap();

    let doc = load(&bytes);
    let ids = page_ids(&doc);

    let cover = page_text(&doc, ids[0]);
    assert!(cover.contains("SUBMITTAL PACKET"));
    assert!(cover.contains("Roofing Submittal"));
    assert!(cover.contains("P-1042"));
    assert!(cover.contains("Jane Smith"));
    assert!(cover.contains("City Engineering"));
    assert!(cover.contains("March 5, 2024"));

    assert!(page_text(&doc, ids[1]).contains("Table of Contents"));
    assert_eq!(page_text(&doc, ids[2]), "a p1");
}

#[tokio::test]
async fn test_empty_reference_list_yields_front_matter_only() {
    let output = builder_with(&[])
        .build_report(&metadata(), &[])
        .await
        .unwrap();

    assert_eq!(output.total_pages, 2);
    assert!(output.entries.is_empty());

    let doc = load(&output.bytes);
    assert_eq!(doc.get_pages().len(), 2);
    assert!(toc_rows(&doc).is_empty());
}

#[tokio::test]
async fn test_pages_follow_reference_order() {
    let builder = builder_with(&[("a", 1), ("b", 2), ("c", 1)]);
    let bytes = builder
        .build(&metadata(), &refs(&["c", "a", "b"]))
        .await
        .unwrap();

    let doc = load(&bytes);
    assert_eq!(body_texts(&doc), vec!["c p1", "a p1", "b p1", "b p2"]);
}

#[tokio::test]
async fn test_concurrent_fetch_keeps_reference_order() {
    let docs: Vec<(String, usize)> = (0..8).map(|i| (format!("d{i}"), i % 3 + 1)).collect();
    let store = MemoryStore::new();
    for (locator, pages) in &docs {
        store.insert(locator.clone(), sample_pdf(*pages, locator));
    }
    let builder = PacketBuilder::new(Arc::new(store)).with_options(BuildOptions {
        jobs: 4,
        ..Default::default()
    });

    let locators: Vec<&str> = docs.iter().rev().map(|(l, _)| l.as_str()).collect();
    let output = builder
        .build_report(&metadata(), &refs(&locators))
        .await
        .unwrap();

    let mut expected_start = 3;
    for (entry, locator) in output.entries.iter().zip(&locators) {
        assert_eq!(entry.display_title, format!("Title {locator}"));
        assert_eq!(entry.start_page_number, expected_start);
        expected_start += entry.page_count;
    }

    let doc = load(&output.bytes);
    let firsts: Vec<String> = output
        .entries
        .iter()
        .map(|e| page_text(&doc, page_ids(&doc)[e.start_page_number - 1]))
        .collect();
    let expected: Vec<String> = locators.iter().map(|l| format!("{l} p1")).collect();
    assert_eq!(firsts, expected);
}

#[tokio::test]
async fn test_toc_is_redrawn_over_draft() {
    let bytes = builder_with(&[("a", 2), ("b", 1)])
        .build(&metadata(), &refs(&["a", "b"]))
        .await
        .unwrap();

    let doc = load(&bytes);
    let toc_page = page_ids(&doc)[1];
    assert_eq!(page_streams(&doc, toc_page).len(), 2);

    assert_eq!(
        draft_toc_rows(&doc),
        vec![
            Row {
                title: "1. Title a".to_string(),
                label: "TBD".to_string()
            },
            Row {
                title: "2. Title b".to_string(),
                label: "TBD".to_string()
            },
        ]
    );
    assert_eq!(
        toc_rows(&doc),
        vec![
            Row {
                title: "1. Title a".to_string(),
                label: "3".to_string()
            },
            Row {
                title: "2. Title b".to_string(),
                label: "5".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_repeated_builds_number_identically() {
    let builder = builder_with(&[("a", 2), ("b", 5), ("c", 1)]);
    let references = refs(&["a", "missing", "b", "c"]);

    let first = builder.build_report(&metadata(), &references).await.unwrap();
    let second = builder.build_report(&metadata(), &references).await.unwrap();

    assert_eq!(first.entries, second.entries);
    assert_eq!(first.total_pages, second.total_pages);
    assert_eq!(toc_rows(&load(&first.bytes)), toc_rows(&load(&second.bytes)));
}

#[tokio::test]
async fn test_overflowing_toc_gets_summary_row() {
    let docs: Vec<(String, usize)> = (0..40).map(|i| (format!("d{i:02}"), 1)).collect();
    let pairs: Vec<(&str, usize)> = docs.iter().map(|(l, n)| (l.as_str(), *n)).collect();
    let locators: Vec<&str> = docs.iter().map(|(l, _)| l.as_str()).collect();

    let output = builder_with(&pairs)
        .build_report(&metadata(), &refs(&locators))
        .await
        .unwrap();

    assert_eq!(output.total_pages, 42);
    assert_eq!(output.entries[39].start_page_number, 42);

    let doc = load(&output.bytes);
    let rows = toc_rows(&doc);
    let last = rows.last().unwrap();
    assert!(rows.len() < 40);
    assert_eq!(last.title, format!("... and {} more", 40 - (rows.len() - 1)));
    assert!(last.label.is_empty());
    assert_eq!(rows[0].label, "3");
}

#[tokio::test]
async fn test_bookmarks_and_info_dictionary() {
    let bytes = builder_with(&[("a", 2), ("b", 1)])
        .build(&metadata(), &refs(&["a", "b"]))
        .await
        .unwrap();

    let doc = load(&bytes);
    assert_eq!(
        outline_titles(&doc),
        vec!["Cover", "Table of Contents", "Title a", "Title b"]
    );
    assert_eq!(info_field(&doc, b"Title").as_deref(), Some("Roofing Submittal"));
    assert_eq!(info_field(&doc, b"Author").as_deref(), Some("Jane Smith"));
    assert_eq!(
        info_field(&doc, b"Subject").as_deref(),
        Some("Submittal to City Engineering")
    );
    assert_eq!(info_field(&doc, b"Keywords").as_deref(), Some("P-1042"));
    assert_eq!(
        info_field(&doc, b"CreationDate").as_deref(),
        Some("D:20240305000000Z")
    );
}

#[tokio::test]
async fn test_a4_front_matter_without_compression_or_bookmarks() {
    let builder = builder_with(&[("a", 1)]).with_options(BuildOptions {
        page_size: PageSize::A4,
        compression: CompressionLevel::None,
        bookmarks: false,
        ..Default::default()
    });
    let bytes = builder.build(&metadata(), &refs(&["a"])).await.unwrap();

    let doc = load(&bytes);
    assert!(outline_titles(&doc).is_empty());

    let cover = doc.get_dictionary(page_ids(&doc)[0]).unwrap();
    let media_box: Vec<f32> = cover
        .get(b"MediaBox")
        .unwrap()
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o.as_float().unwrap())
        .collect();
    assert_eq!(media_box, vec![0.0, 0.0, 595.0, 842.0]);
}
