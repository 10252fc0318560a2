//! Table Structure
//!
//! Origin cells with row/column spans, ordered rows, and the table view
//! consumed by the grid normalizer and the table exporters. Only origin
//! cells are represented; positions covered by a span are implicit until
//! normalization.

use serde::{Deserialize, Deserializer, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Cells
// ─────────────────────────────────────────────────────────────────────────────

/// An origin cell as authored, before span expansion into the dense matrix.
///
/// Spans are always at least 1; malformed span values (zero or negative on
/// the wire) are clamped to 1 rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cell {
    /// Visible cell text
    pub text: String,

    /// Number of rows this cell covers (≥1)
    #[serde(deserialize_with = "clamped_span")]
    pub row_span: u32,

    /// Number of columns this cell covers (≥1)
    #[serde(deserialize_with = "clamped_span")]
    pub col_span: u32,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            text: String::new(),
            row_span: 1,
            col_span: 1,
        }
    }
}

impl Cell {
    /// Create a simple 1x1 cell.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Create a cell covering `rows` x `cols` positions (each clamped to ≥1).
    pub fn spanning(text: impl Into<String>, rows: u32, cols: u32) -> Self {
        Self {
            text: text.into(),
            row_span: rows.max(1),
            col_span: cols.max(1),
        }
    }

    /// Cell text with newline runs collapsed to `"; "` and whitespace runs
    /// compacted to single spaces, trimmed at both ends.
    ///
    /// Mirrors how cell content lifted from a live multi-line view is
    /// flattened before it enters the matrix.
    pub fn flattened_text(&self) -> String {
        flatten_text(&self.text)
    }
}

/// Deserialize a span value, clamping anything below 1 up to 1.
fn clamped_span<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(if raw < 1 { 1 } else { raw as u32 })
}

/// Flatten multi-line text: newline runs become `"; "`, other whitespace
/// runs collapse to a single space, and the ends are trimmed.
pub fn flatten_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_newline = false;
    let mut pending_space = false;

    for ch in raw.chars() {
        if ch == '\n' || ch == '\r' {
            pending_newline = true;
        } else if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_newline && !out.is_empty() {
                out.push_str("; ");
            } else if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_newline = false;
            pending_space = false;
            out.push(ch);
        }
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Rows and the Table View
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered sequence of origin cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(pub Vec<Cell>);

impl Row {
    pub fn new(cells: Vec<Cell>) -> Self {
        Row(cells)
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The table structure as supplied by the view layer: ordered rows of origin
/// cells plus a flag recording whether the table carries a header section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableView {
    pub rows: Vec<Row>,
    pub has_header_section: bool,
}

impl TableView {
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            has_header_section: false,
        }
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header_section = has_header;
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// A table is considered empty when it has no rows or no cell carries
    /// any visible text; empty tables abort an export before any artifact
    /// bytes are produced.
    pub fn is_empty(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|row| row.cells())
            .all(|cell| cell.text.trim().is_empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_default_spans() {
        let cell = Cell::new("A");
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
    }

    #[test]
    fn test_spanning_clamps_zero() {
        let cell = Cell::spanning("A", 0, 0);
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
    }

    #[test]
    fn test_deserialize_defaults_missing_spans() {
        let cell: Cell = serde_json::from_str(r#"{"text":"A"}"#).unwrap();
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
    }

    #[test]
    fn test_deserialize_clamps_invalid_spans() {
        let cell: Cell = serde_json::from_str(r#"{"text":"A","rowSpan":0,"colSpan":-3}"#).unwrap();
        assert_eq!(cell.row_span, 1);
        assert_eq!(cell.col_span, 1);
    }

    #[test]
    fn test_deserialize_keeps_valid_spans() {
        let cell: Cell = serde_json::from_str(r#"{"text":"A","rowSpan":2,"colSpan":3}"#).unwrap();
        assert_eq!(cell.row_span, 2);
        assert_eq!(cell.col_span, 3);
    }

    #[test]
    fn test_flatten_text_newlines() {
        assert_eq!(flatten_text("a\nb"), "a; b");
        assert_eq!(flatten_text("a \n  b"), "a; b");
        assert_eq!(flatten_text("  a   b  "), "a b");
        assert_eq!(flatten_text("\n a \n"), "a");
    }

    #[test]
    fn test_table_emptiness() {
        assert!(TableView::default().is_empty());

        let blank = TableView::new(vec![Row::new(vec![Cell::new("  ")])]);
        assert!(blank.is_empty());

        let filled = TableView::new(vec![Row::new(vec![Cell::new("A")])]);
        assert!(!filled.is_empty());
    }

    #[test]
    fn test_table_serialization_round_trip() {
        let table = TableView::new(vec![
            Row::new(vec![Cell::new("Outlook"), Cell::new("Play")]),
            Row::new(vec![Cell::spanning("Sunny", 2, 1), Cell::new("No")]),
        ])
        .with_header(true);

        let json = serde_json::to_string(&table).unwrap();
        let back: TableView = serde_json::from_str(&json).unwrap();
        assert_eq!(table, back);
    }
}
