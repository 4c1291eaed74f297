//! Output formatting and display for pdfpacket.
//!
//! User-facing status output for the command-line tool: status messages,
//! the page plan of a packet, resolution failures, and build summaries.
//! Library code logs through `tracing` instead.
//!
//! # Examples
//!
//! ```no_run
//! use pdfpacket::output::OutputFormatter;
//! use pdfpacket::config::Config;
//!
//! # fn example(config: Config) {
//! let formatter = OutputFormatter::from_config(&config);
//! formatter.info("Resolving documents...");
//! # }
//! ```

pub mod formatter;

pub use formatter::{MessageLevel, OutputFormatter};

use crate::error::ResolutionFailure;
use crate::io::format_file_size;
use crate::model::{FRONT_MATTER_PAGE_COUNT, ResolvedDocumentEntry};
use crate::packet::PacketOutput;

/// Format the page plan as aligned table lines.
///
/// The first two rows are the front matter; every document follows with
/// its page range, or `unavailable` when it contributed no pages.
pub fn plan_lines(entries: &[ResolvedDocumentEntry]) -> Vec<String> {
    let mut rows: Vec<(String, String, String)> = vec![
        ("Cover".to_string(), "1".to_string(), "1".to_string()),
        (
            "Table of Contents".to_string(),
            "1".to_string(),
            FRONT_MATTER_PAGE_COUNT.to_string(),
        ),
    ];

    rows.extend(entries.iter().map(|entry| {
        let pages = match entry.end_page_number() {
            Some(end) if end == entry.start_page_number => end.to_string(),
            Some(end) => format!("{}-{end}", entry.start_page_number),
            None => "unavailable".to_string(),
        };
        (
            entry.display_title.clone(),
            entry.page_count.to_string(),
            pages,
        )
    }));

    let title_width = rows
        .iter()
        .map(|(title, _, _)| title.chars().count())
        .max()
        .unwrap_or(0)
        .max("Document".len());

    let mut lines = vec![format!("{:<title_width$}  {:>5}  Pages", "Document", "Count")];
    lines.extend(
        rows.into_iter()
            .map(|(title, count, pages)| format!("{title:<title_width$}  {count:>5}  {pages}")),
    );
    lines
}

/// Display the page plan of a packet.
pub fn display_plan(formatter: &OutputFormatter, entries: &[ResolvedDocumentEntry]) {
    formatter.section("Page plan");
    for line in plan_lines(entries) {
        formatter.line(&line);
    }
}

/// Display documents that could not be resolved.
pub fn display_failures(formatter: &OutputFormatter, failures: &[ResolutionFailure]) {
    if failures.is_empty() {
        return;
    }

    formatter.warning(&format!(
        "{} document(s) could not be resolved and were skipped:",
        failures.len()
    ));
    for failure in failures {
        formatter.warning(&format!("  {failure}"));
    }
}

/// Display build statistics. Only shown in verbose mode.
pub fn display_build_statistics(formatter: &OutputFormatter, output: &PacketOutput) {
    if !formatter.is_verbose() {
        return;
    }

    let resolved = output.entries.iter().filter(|e| e.is_resolved()).count();

    formatter.section("Statistics");
    formatter.detail(
        "Documents",
        &format!("{resolved} of {} merged", output.entries.len()),
    );
    formatter.detail("Total pages", &output.total_pages.to_string());
    formatter.detail("Bookmarks", &output.bookmarks_added.to_string());
    formatter.detail(
        "Packet size",
        &format_file_size(output.bytes.len() as u64),
    );
    formatter.detail(
        "Load time",
        &format!("{:.2}s", output.load_time.as_secs_f64()),
    );
    formatter.detail(
        "Build time",
        &format!("{:.2}s", output.build_time.as_secs_f64()),
    );
}
