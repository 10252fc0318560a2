//! Grid Normalization
//!
//! Reconstructs a dense rectangular matrix of text from the sparse,
//! span-annotated rows of a [`TableView`]. Row-spanning cells are replayed
//! into subsequent rows at their anchor column only; column spans repeat the
//! cell text across consecutive columns of the same row. After all rows are
//! processed every undefined position is filled with an empty string, so the
//! result is always rectangular.
//!
//! Cell text is flattened on entry (newline runs become `"; "`, whitespace
//! runs collapse to single spaces) so a multi-line cell never breaks the
//! fixed-width rendering downstream.
//!
//! Complexity is O(rows x columns). A row with fewer cells than its
//! neighbors (a "void" row) is legal and yields a row padded with
//! carryovers and blanks, not an error.

use crate::model::TableView;

// ─────────────────────────────────────────────────────────────────────────────
// Matrix
// ─────────────────────────────────────────────────────────────────────────────

/// A dense rectangular matrix of cell text. Every position is defined; the
/// width is the maximum column index reached by any row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridMatrix {
    cells: Vec<Vec<String>>,
    cols: usize,
}

impl GridMatrix {
    pub fn rows(&self) -> &[Vec<String>] {
        &self.cells
    }

    pub fn row_count(&self) -> usize {
        self.cells.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.cells.get(row).and_then(|r| r.get(col)).map(String::as_str)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Normalization
// ─────────────────────────────────────────────────────────────────────────────

/// A row-span continuation pending replay into subsequent rows.
#[derive(Debug)]
struct Carryover {
    /// Anchor column the spanning cell started at
    column: usize,
    rows_remaining: u32,
    text: String,
}

/// Turn span-annotated rows into a dense rectangular matrix.
pub fn normalize(table: &TableView) -> GridMatrix {
    let mut grid: Vec<Vec<Option<String>>> = Vec::with_capacity(table.rows.len());
    let mut pending: Vec<Carryover> = Vec::new();
    let mut max_cols = 0;

    for row in &table.rows {
        let mut current: Vec<Option<String>> = Vec::new();

        // Stamp carryovers inherited from earlier rows before walking this
        // row's own cells, so origin cells skip the occupied columns.
        for carry in &mut pending {
            if carry.rows_remaining > 0 {
                if current.len() <= carry.column {
                    current.resize(carry.column + 1, None);
                }
                if current[carry.column].is_none() {
                    current[carry.column] = Some(carry.text.clone());
                }
                carry.rows_remaining -= 1;
            }
        }

        let mut col = 0;
        for cell in row.cells() {
            // Advance past columns already occupied in this row.
            while matches!(current.get(col), Some(Some(_))) {
                col += 1;
            }

            let col_span = cell.col_span.max(1) as usize;
            let row_span = cell.row_span.max(1);
            let text = cell.flattened_text();

            if current.len() < col + col_span {
                current.resize(col + col_span, None);
            }
            for offset in 0..col_span {
                current[col + offset] = Some(text.clone());
            }

            // Replay into later rows at the anchor column only, regardless
            // of the column span.
            if row_span > 1 {
                pending.push(Carryover {
                    column: col,
                    rows_remaining: row_span - 1,
                    text,
                });
            }

            col += col_span;
            if col > max_cols {
                max_cols = col;
            }
        }

        pending.retain(|carry| carry.rows_remaining > 0);
        grid.push(current);
    }

    let cells = grid
        .into_iter()
        .map(|row| {
            let mut filled: Vec<String> = row
                .into_iter()
                .map(|value| value.unwrap_or_default())
                .collect();
            filled.resize(max_cols, String::new());
            filled
        })
        .collect();

    GridMatrix {
        cells,
        cols: max_cols,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row};

    fn table(rows: Vec<Vec<Cell>>) -> TableView {
        TableView::new(rows.into_iter().map(Row::new).collect())
    }

    #[test]
    fn test_plain_grid_is_rectangular() {
        let matrix = normalize(&table(vec![
            vec![Cell::new("a"), Cell::new("b")],
            vec![Cell::new("c"), Cell::new("d")],
        ]));

        assert_eq!(matrix.col_count(), 2);
        assert!(matrix.rows().iter().all(|row| row.len() == 2));
        assert_eq!(matrix.get(1, 1), Some("d"));
    }

    #[test]
    fn test_row_span_replays_anchor_column() {
        // {text:"X", rowSpan:2} at row0/col0 followed by row1 cell "Y":
        // row0 = ["X", ""], row1 = ["X", "Y"].
        let matrix = normalize(&table(vec![
            vec![Cell::spanning("X", 2, 1)],
            vec![Cell::new("Y")],
        ]));

        assert_eq!(matrix.rows()[0], vec!["X".to_string(), String::new()]);
        assert_eq!(matrix.rows()[1], vec!["X".to_string(), "Y".to_string()]);
    }

    #[test]
    fn test_col_span_repeats_text() {
        let matrix = normalize(&table(vec![
            vec![Cell::spanning("wide", 1, 3)],
            vec![Cell::new("a"), Cell::new("b"), Cell::new("c")],
        ]));

        assert_eq!(
            matrix.rows()[0],
            vec!["wide".to_string(), "wide".to_string(), "wide".to_string()]
        );
        assert_eq!(matrix.col_count(), 3);
    }

    #[test]
    fn test_combined_spans_replay_anchor_only() {
        // A cell spanning both directions replays only its starting column
        // into the next row; the rest of that row is free for origin cells.
        let matrix = normalize(&table(vec![
            vec![Cell::spanning("B", 2, 2), Cell::new("c")],
            vec![Cell::new("d"), Cell::new("e")],
        ]));

        assert_eq!(
            matrix.rows()[0],
            vec!["B".to_string(), "B".to_string(), "c".to_string()]
        );
        // Anchor column 0 carries "B"; columns 1 and 2 are taken by the
        // row's own cells.
        assert_eq!(
            matrix.rows()[1],
            vec!["B".to_string(), "d".to_string(), "e".to_string()]
        );
    }

    #[test]
    fn test_void_row_is_padded() {
        let matrix = normalize(&table(vec![
            vec![Cell::new("a"), Cell::new("b"), Cell::new("c")],
            vec![Cell::new("only")],
        ]));

        assert_eq!(
            matrix.rows()[1],
            vec!["only".to_string(), String::new(), String::new()]
        );
    }

    #[test]
    fn test_long_row_span_survives_multiple_rows() {
        let matrix = normalize(&table(vec![
            vec![Cell::spanning("tall", 3, 1), Cell::new("r0")],
            vec![Cell::new("r1")],
            vec![Cell::new("r2")],
            vec![Cell::new("r3"), Cell::new("r3b")],
        ]));

        assert_eq!(matrix.get(0, 0), Some("tall"));
        assert_eq!(matrix.get(1, 0), Some("tall"));
        assert_eq!(matrix.get(2, 0), Some("tall"));
        // Span exhausted; the final row starts at column 0 again.
        assert_eq!(matrix.get(3, 0), Some("r3"));
        assert_eq!(matrix.get(1, 1), Some("r1"));
    }

    #[test]
    fn test_multiline_cell_text_is_flattened() {
        let matrix = normalize(&table(vec![vec![
            Cell::new("Outlook = Sunny\nHumidity = High"),
            Cell::new("  No  "),
        ]]));

        assert_eq!(matrix.get(0, 0), Some("Outlook = Sunny; Humidity = High"));
        assert_eq!(matrix.get(0, 1), Some("No"));
    }

    #[test]
    fn test_empty_table() {
        let matrix = normalize(&TableView::default());
        assert!(matrix.is_empty());
        assert_eq!(matrix.col_count(), 0);
    }
}
