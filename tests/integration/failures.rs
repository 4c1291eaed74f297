//! Integration tests for unresolvable documents and fatal metadata errors.

use pdfpacket::error::{FailureKind, PacketError};
use pdfpacket::model::PacketMetadata;
use pdfpacket::packet::PacketBuilder;
use std::sync::Arc;

use crate::common::{
    Row, body_texts, builder_with, load, locked_pdf, metadata, refs, sample_pdf, store_with,
    toc_labels, toc_rows,
};

#[tokio::test]
async fn test_missing_document_leaves_no_gap() {
    let output = builder_with(&[("a", 2), ("c", 1)])
        .build_report(&metadata(), &refs(&["a", "b", "c"]))
        .await
        .unwrap();

    let starts: Vec<usize> = output.entries.iter().map(|e| e.start_page_number).collect();
    assert_eq!(starts, vec![3, 5, 5]);
    assert_eq!(output.entries[1].page_count, 0);
    assert_eq!(output.total_pages, 5);
    assert!(!output.is_complete());

    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].index, 1);
    assert_eq!(output.failures[0].locator, "b");
    assert_eq!(output.failures[0].kind, FailureKind::NotFound);

    let doc = load(&output.bytes);
    assert_eq!(body_texts(&doc), vec!["a p1", "a p2", "c p1"]);
}

#[tokio::test]
async fn test_failed_document_keeps_its_toc_row() {
    let bytes = builder_with(&[("a", 2), ("c", 1)])
        .build(&metadata(), &refs(&["a", "b", "c"]))
        .await
        .unwrap();

    let doc = load(&bytes);
    assert_eq!(
        toc_rows(&doc)[1],
        Row {
            title: "2. Title b".to_string(),
            label: "unavailable".to_string()
        }
    );
    assert_eq!(toc_labels(&doc), vec!["3", "unavailable", "5"]);
}

#[tokio::test]
async fn test_unparseable_and_empty_documents_are_skipped() {
    let store = store_with(&[("good", 1)]);
    store.insert("garbage", b"this is not a pdf".to_vec());
    store.insert("empty", sample_pdf(0, "empty"));

    let output = PacketBuilder::new(Arc::new(store))
        .build_report(&metadata(), &refs(&["garbage", "good", "empty"]))
        .await
        .unwrap();

    assert_eq!(output.total_pages, 3);
    assert_eq!(output.entries[1].start_page_number, 3);
    assert_eq!(output.entries[2].start_page_number, 4);

    let kinds: Vec<&FailureKind> = output.failures.iter().map(|f| &f.kind).collect();
    assert_eq!(kinds.len(), 2);
    assert!(matches!(kinds[0], FailureKind::Parse(_)));
    assert_eq!(kinds[1], &FailureKind::Empty);
}

#[tokio::test]
async fn test_owner_locked_document_is_merged() {
    let store = store_with(&[("a", 1)]);
    store.insert("tds", locked_pdf(2, "tds", ""));
    store.insert("secret", locked_pdf(1, "secret", "user"));

    let output = PacketBuilder::new(Arc::new(store))
        .build_report(&metadata(), &refs(&["tds", "secret", "a"]))
        .await
        .unwrap();

    let starts: Vec<usize> = output.entries.iter().map(|e| e.start_page_number).collect();
    assert_eq!(starts, vec![3, 5, 5]);
    assert_eq!(output.entries[0].page_count, 2);
    assert_eq!(output.total_pages, 5);
    assert_eq!(output.failures.len(), 1);
    assert_eq!(output.failures[0].locator, "secret");
    assert_eq!(output.failures[0].kind, FailureKind::Encrypted);

    let doc = load(&output.bytes);
    assert!(!doc.is_encrypted());
    assert_eq!(body_texts(&doc), vec!["tds p1", "tds p2", "a p1"]);
    assert_eq!(toc_labels(&doc), vec!["3", "unavailable", "5"]);
}

#[tokio::test]
async fn test_all_documents_failing_still_builds_front_matter() {
    let output = builder_with(&[])
        .build_report(&metadata(), &refs(&["x", "y"]))
        .await
        .unwrap();

    assert_eq!(output.total_pages, 2);
    assert_eq!(output.failures.len(), 2);

    let doc = load(&output.bytes);
    assert_eq!(doc.get_pages().len(), 2);
    assert_eq!(toc_labels(&doc), vec!["unavailable", "unavailable"]);
}

#[tokio::test]
async fn test_missing_title_is_fatal() {
    let metadata = PacketMetadata {
        title: None,
        ..metadata()
    };

    let result = builder_with(&[("a", 1)])
        .build(&metadata, &refs(&["a"]))
        .await;

    match result {
        Err(PacketError::InvalidMetadata { field }) => assert_eq!(field, "title"),
        other => panic!("expected InvalidMetadata, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_required_fields_are_fatal() {
    let cases = [
        (
            PacketMetadata {
                prepared_by: Some("   ".to_string()),
                ..metadata()
            },
            "preparedBy",
        ),
        (
            PacketMetadata {
                submitted_to: None,
                ..metadata()
            },
            "submittedTo",
        ),
        (
            PacketMetadata {
                date: None,
                ..metadata()
            },
            "date",
        ),
    ];

    let builder = builder_with(&[]);
    for (metadata, expected) in cases {
        let err = builder.build(&metadata, &[]).await.unwrap_err();
        assert!(
            matches!(err, PacketError::InvalidMetadata { field } if field == expected),
            "expected {expected}, got {err:?}"
        );
        assert_eq!(err.exit_code(), 3);
    }
}

#[tokio::test]
async fn test_missing_project_number_uses_placeholder() {
    let metadata = PacketMetadata {
        project_number: None,
        ..metadata()
    };

    let bytes = builder_with(&[]).build(&metadata, &[]).await.unwrap();
    let doc = load(&bytes);
    let cover = crate::common::page_text(&doc, crate::common::page_ids(&doc)[0]);
    assert!(cover.contains("N/A"));
}
