//! Cover page and table of contents drawing.
//!
//! Both pages are drawn with the standard Helvetica faces, so no font data
//! is embedded. Text is encoded as WinAnsi; characters outside that set are
//! replaced with `?`.
//!
//! # Coordinate System
//!
//! PDF coordinates have their origin at the bottom-left corner with Y
//! increasing upward. Layout here works from the top margin down, so row
//! positions are computed as `page_height - offset`.

use lopdf::content::{Content, Operation};
use lopdf::{Object, StringFormat};

use crate::config::PageSize;
use crate::model::{CoverDetails, DocumentReference, ResolvedDocumentEntry};

// =============================================================================
// Layout Constants
// =============================================================================

/// Resource name of the regular face.
pub const REGULAR_FONT: &str = "F1";

/// Resource name of the bold face.
pub const BOLD_FONT: &str = "F2";

/// Page label drawn on the draft table of contents.
pub const DRAFT_PAGE_LABEL: &str = "TBD";

/// Page label drawn for documents that contributed no pages.
pub const UNAVAILABLE_PAGE_LABEL: &str = "unavailable";

/// Page margin on all sides (in points).
const MARGIN: f32 = 72.0;

/// Average Helvetica glyph width as a fraction of font size.
const CHAR_WIDTH_FACTOR: f32 = 0.52;

/// Helvetica digit width as a fraction of font size.
const DIGIT_WIDTH_FACTOR: f32 = 0.556;

/// Line height as a multiple of font size.
const LINE_HEIGHT_FACTOR: f32 = 1.25;

const COVER_KICKER_SIZE: f32 = 11.0;
const COVER_TITLE_SIZE: f32 = 28.0;
const COVER_LABEL_SIZE: f32 = 9.0;
const COVER_VALUE_SIZE: f32 = 14.0;
/// Title lines that fit above the field block on both page sizes.
const COVER_TITLE_MAX_LINES: usize = 4;

/// Vertical distance between cover fields (in points).
const COVER_FIELD_SPACING: f32 = 44.0;

const TOC_HEADING_SIZE: f32 = 20.0;
const TOC_COLUMN_SIZE: f32 = 9.0;
const TOC_ROW_SIZE: f32 = 11.0;

/// Vertical distance between table of contents rows (in points).
const TOC_ROW_SPACING: f32 = 20.0;

/// Distance from the top margin to the first row baseline (in points).
const TOC_FIRST_ROW_OFFSET: f32 = 78.0;

/// Space reserved for the page label column (in points).
const TOC_LABEL_COLUMN: f32 = 80.0;

const ELLIPSIS: &str = "...";

// =============================================================================
// Table of Contents Rows
// =============================================================================

/// One line of the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocRow {
    /// Left column text.
    pub title: String,
    /// Right column text; empty for the overflow summary row.
    pub page_label: String,
}

impl TocRow {
    /// Rows for the draft pass, before any page count is known.
    pub fn draft(references: &[DocumentReference]) -> Vec<Self> {
        references
            .iter()
            .enumerate()
            .map(|(i, reference)| Self {
                title: numbered(i, &reference.display_title),
                page_label: DRAFT_PAGE_LABEL.to_string(),
            })
            .collect()
    }

    /// Rows carrying final start pages.
    pub fn finalized(entries: &[ResolvedDocumentEntry]) -> Vec<Self> {
        entries
            .iter()
            .enumerate()
            .map(|(i, entry)| Self {
                title: numbered(i, &entry.display_title),
                page_label: if entry.is_resolved() {
                    entry.start_page_number.to_string()
                } else {
                    UNAVAILABLE_PAGE_LABEL.to_string()
                },
            })
            .collect()
    }
}

fn numbered(index: usize, title: &str) -> String {
    format!("{}. {}", index + 1, title.trim())
}

/// Number of rows that fit on the table of contents page.
pub fn toc_capacity(page_size: PageSize) -> usize {
    let (_, height) = page_size.dimensions();
    let usable = height - 2.0 * MARGIN - TOC_FIRST_ROW_OFFSET;
    (usable / TOC_ROW_SPACING).floor().max(1.0) as usize + 1
}

/// Fit rows onto one page.
///
/// When there are more rows than fit, the last visible slot becomes a
/// summary row counting the hidden entries.
pub fn fit_rows(rows: &[TocRow], capacity: usize) -> Vec<TocRow> {
    if rows.len() <= capacity {
        return rows.to_vec();
    }

    let shown = capacity.saturating_sub(1);
    let mut fitted = rows[..shown].to_vec();
    fitted.push(TocRow {
        title: format!("... and {} more", rows.len() - shown),
        page_label: String::new(),
    });
    fitted
}

// =============================================================================
// Page Content
// =============================================================================

/// Draw the cover page.
pub fn cover_content(details: &CoverDetails, date_format: &str, page_size: PageSize) -> Content {
    let (width, height) = page_size.dimensions();
    let mut ops = Vec::new();
    let text_width = width - 2.0 * MARGIN;

    fill_color(&mut ops, 0.35);
    let kicker_y = height - MARGIN - COVER_KICKER_SIZE;
    text(&mut ops, BOLD_FONT, COVER_KICKER_SIZE, MARGIN, kicker_y, "SUBMITTAL PACKET");
    rule(&mut ops, MARGIN, height - MARGIN - 24.0, text_width, 1.5);

    fill_color(&mut ops, 0.0);
    let title_lines = wrap_lines(
        &details.title,
        max_chars(text_width, COVER_TITLE_SIZE),
        COVER_TITLE_MAX_LINES,
    );
    let mut y = height * 0.68;
    for line in &title_lines {
        text(&mut ops, BOLD_FONT, COVER_TITLE_SIZE, MARGIN, y, line);
        y -= COVER_TITLE_SIZE * LINE_HEIGHT_FACTOR;
    }

    let date = details.formatted_date(date_format);
    let fields = [
        ("PROJECT NUMBER", details.project_number_or_placeholder()),
        ("PREPARED BY", details.prepared_by.as_str()),
        ("SUBMITTED TO", details.submitted_to.as_str()),
        ("DATE", date.as_str()),
    ];

    let value_chars = max_chars(text_width, COVER_VALUE_SIZE);
    let mut y = height * 0.42;
    for (label, value) in fields {
        fill_color(&mut ops, 0.4);
        text(&mut ops, BOLD_FONT, COVER_LABEL_SIZE, MARGIN, y, label);
        fill_color(&mut ops, 0.0);
        let value = truncate(value, value_chars);
        text(&mut ops, REGULAR_FONT, COVER_VALUE_SIZE, MARGIN, y - 18.0, &value);
        y -= COVER_FIELD_SPACING;
    }

    Content { operations: ops }
}

/// Draw the table of contents.
///
/// With `overdraw` set, a full-page white rectangle is painted first so that
/// any earlier drawing on the page is hidden.
pub fn toc_content(rows: &[TocRow], page_size: PageSize, overdraw: bool) -> Content {
    let (width, height) = page_size.dimensions();
    let mut ops = Vec::new();

    if overdraw {
        ops.push(Operation::new("q", vec![]));
        fill_color(&mut ops, 1.0);
        ops.push(Operation::new(
            "re",
            vec![0.0f32.into(), 0.0f32.into(), width.into(), height.into()],
        ));
        ops.push(Operation::new("f", vec![]));
        ops.push(Operation::new("Q", vec![]));
    }

    let right = width - MARGIN;
    let top = height - MARGIN;

    fill_color(&mut ops, 0.0);
    let heading_y = top - TOC_HEADING_SIZE;
    text(&mut ops, BOLD_FONT, TOC_HEADING_SIZE, MARGIN, heading_y, "Table of Contents");

    fill_color(&mut ops, 0.4);
    let column_y = top - 52.0;
    text(&mut ops, BOLD_FONT, TOC_COLUMN_SIZE, MARGIN, column_y, "DOCUMENT");
    let page_header = "PAGE";
    let page_header_x = right - estimated_width(page_header, TOC_COLUMN_SIZE);
    text(&mut ops, BOLD_FONT, TOC_COLUMN_SIZE, page_header_x, column_y, page_header);
    rule(&mut ops, MARGIN, column_y - 8.0, width - 2.0 * MARGIN, 0.75);

    fill_color(&mut ops, 0.0);
    let title_chars = max_chars(width - 2.0 * MARGIN - TOC_LABEL_COLUMN, TOC_ROW_SIZE);
    let mut y = top - TOC_FIRST_ROW_OFFSET;
    for row in fit_rows(rows, toc_capacity(page_size)) {
        let title = truncate(&row.title, title_chars);
        text(&mut ops, REGULAR_FONT, TOC_ROW_SIZE, MARGIN, y, &title);
        if !row.page_label.is_empty() {
            let x = right - estimated_width(&row.page_label, TOC_ROW_SIZE);
            text(&mut ops, REGULAR_FONT, TOC_ROW_SIZE, x, y, &row.page_label);
        }
        y -= TOC_ROW_SPACING;
    }

    Content { operations: ops }
}

// =============================================================================
// Drawing Helpers
// =============================================================================

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, value: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new(
        "Tf",
        vec![Object::Name(font.as_bytes().to_vec()), size.into()],
    ));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::String(encode_win_ansi(value), StringFormat::Literal)],
    ));
    ops.push(Operation::new("ET", vec![]));
}

/// Set a gray fill color (0 = black, 1 = white).
fn fill_color(ops: &mut Vec<Operation>, gray: f32) {
    ops.push(Operation::new("rg", vec![gray.into(), gray.into(), gray.into()]));
}

/// Filled horizontal bar.
fn rule(ops: &mut Vec<Operation>, x: f32, y: f32, width: f32, thickness: f32) {
    ops.push(Operation::new(
        "re",
        vec![x.into(), y.into(), width.into(), thickness.into()],
    ));
    ops.push(Operation::new("f", vec![]));
}

fn estimated_width(value: &str, size: f32) -> f32 {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                DIGIT_WIDTH_FACTOR
            } else {
                CHAR_WIDTH_FACTOR
            }
        })
        .sum::<f32>()
        * size
}

fn max_chars(width: f32, size: f32) -> usize {
    (width / (size * CHAR_WIDTH_FACTOR)).floor().max(10.0) as usize
}

/// Shorten `value` to at most `max_chars` characters, ending with "...".
pub fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }

    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let mut shortened: String = value.chars().take(keep).collect();
    shortened.truncate(shortened.trim_end().len());
    shortened.push_str(ELLIPSIS);
    shortened
}

/// Word wrap text to at most `max_lines` lines, truncating the last one.
fn wrap_lines(text: &str, max_chars: usize, max_lines: usize) -> Vec<String> {
    let mut lines = word_wrap(text, max_chars);
    if lines.len() > max_lines {
        let rest = lines.split_off(max_lines.saturating_sub(1)).join(" ");
        lines.push(truncate(&rest, max_chars));
    }
    lines
}

/// Word wrap text to fit within max_chars per line.
///
/// Words longer than a line are split across lines.
fn word_wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    let words = text.split_whitespace().flat_map(|word| {
        let chars: Vec<char> = word.chars().collect();
        chars
            .chunks(max_chars.max(1))
            .map(|chunk| chunk.iter().collect::<String>())
            .collect::<Vec<_>>()
    });

    for word in words {
        let word = word.as_str();
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.chars().count() + 1 + word.chars().count() <= max_chars {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    lines
}

/// Encode text for a WinAnsiEncoding simple font.
pub fn encode_win_ansi(value: &str) -> Vec<u8> {
    value
        .chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => b' ',
            c if (c as u32) < 0x20 => b'?',
            c if (c as u32) < 0x7F => c as u8,
            c if (0xA0..=0xFF).contains(&(c as u32)) => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8A,
            '‹' => 0x8B,
            'Œ' => 0x8C,
            'Ž' => 0x8E,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9A,
            '›' => 0x9B,
            'œ' => 0x9C,
            'ž' => 0x9E,
            'Ÿ' => 0x9F,
            _ => b'?',
        })
        .collect()
}
