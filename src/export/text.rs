//! Plain-Text Export Generation
//!
//! Two renderers share this module: the monospace bordered grid for tables
//! and the connector-glyph pretty-printer for trees. Both produce exact,
//! deterministic text: fixed inputs yield byte-identical artifacts.

use unicode_width::UnicodeWidthStr;

use crate::error::{Error, Result};
use crate::export::options::ExportOptions;
use crate::export::Artifact;
use crate::grid::{self, GridMatrix};
use crate::model::{ClassLegend, TableView, TreeNode};
use crate::visibility::{select_subtree, VisibilitySet};

// ─────────────────────────────────────────────────────────────────────────────
// Grid Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Export a table as monospace bordered text.
///
/// Optional caption lines precede the grid with one blank line before the
/// first border.
///
/// # Errors
///
/// Returns [`Error::EmptyExportRoot`] when the table holds no visible text;
/// no artifact is produced.
pub fn export_table_text(
    table: &TableView,
    captions: &[String],
    options: &ExportOptions,
) -> Result<Artifact> {
    if table.is_empty() {
        return Err(Error::EmptyExportRoot {
            target: options.target.label().to_string(),
        });
    }

    let matrix = grid::normalize(table);
    let body = render_grid_text(&matrix, captions);

    Ok(Artifact::from_text(
        options.artifact_name(),
        options.format.content_type(),
        body,
    ))
}

/// Render a dense matrix as a fixed-width bordered table.
///
/// Every rendered line has identical width and no column is narrower than
/// its longest cell. A border precedes the first row and another follows it
/// as the header separator; a single-row grid renders its row again as the
/// body so the separator never abuts the closing border.
pub fn render_grid_text(matrix: &GridMatrix, captions: &[String]) -> String {
    let widths: Vec<usize> = (0..matrix.col_count())
        .map(|col| {
            matrix
                .rows()
                .iter()
                .map(|row| row[col].width())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = {
        let mut line = String::from("+");
        for width in &widths {
            line.push_str(&"-".repeat(width + 2));
            line.push('+');
        }
        line
    };

    let format_row = |row: &[String]| -> String {
        let mut line = String::from("|");
        for (col, value) in row.iter().enumerate() {
            line.push(' ');
            line.push_str(value);
            line.push_str(&" ".repeat(widths[col] - value.width()));
            line.push_str(" |");
        }
        line
    };

    let mut lines: Vec<String> = Vec::new();
    if !captions.is_empty() {
        lines.extend(captions.iter().cloned());
        lines.push(String::new());
    }

    lines.push(border.clone());
    for (idx, row) in matrix.rows().iter().enumerate() {
        lines.push(format_row(row));
        if idx == 0 {
            lines.push(border.clone());
            // Header separator for a single-row grid: the row serves as
            // both header and body.
            if matrix.row_count() == 1 {
                lines.push(format_row(row));
            }
        }
    }
    lines.push(border);

    lines.join("\n")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Rendering
// ─────────────────────────────────────────────────────────────────────────────

/// Connector glyph for a child with later siblings.
const EARLIER_CHILD: &str = "├─ ";
/// Connector glyph for the final sibling.
const LAST_CHILD: &str = "└─ ";
/// Continuation under a parent that has later siblings.
const VERTICAL_CONTINUATION: &str = "│  ";
/// Continuation under a final sibling.
const BLANK_CONTINUATION: &str = "   ";

/// Export the visible portion of the tree as indented connector text, with
/// a header block stating the export scope and the class-name legend.
pub fn export_tree_text(
    tree: &TreeNode,
    legend: &ClassLegend,
    visibility: &VisibilitySet,
    options: &ExportOptions,
) -> Result<Artifact> {
    let (scoped, scope) = select_subtree(tree, visibility);

    let mut lines = vec![
        "Decision Tree (text export)".to_string(),
        format!("Scope: {}", scope.label()),
        format!("Classes: {}", legend.heading()),
        "Fields: Node/Leaf id | attribute | n | class counts | entropy | \
         (branch labels shown above each child)"
            .to_string(),
    ];
    lines.push(render_tree_text(&scoped, legend));

    Ok(Artifact::from_text(
        options.artifact_name(),
        options.format.content_type(),
        lines.join("\n"),
    ))
}

/// Pretty-print a (possibly pruned) tree. The root draws no incoming
/// connector; every other node's line is preceded by a connector line
/// carrying its branch label.
pub fn render_tree_text(root: &TreeNode, legend: &ClassLegend) -> String {
    let mut lines = Vec::new();
    write_node(&mut lines, root, "", None, true, legend);
    lines.join("\n")
}

fn write_node(
    lines: &mut Vec<String>,
    node: &TreeNode,
    prefix: &str,
    branch_label: Option<&str>,
    is_last: bool,
    legend: &ClassLegend,
) {
    let next_prefix = format!(
        "{}{}",
        prefix,
        if is_last {
            BLANK_CONTINUATION
        } else {
            VERTICAL_CONTINUATION
        }
    );

    if let Some(label) = branch_label {
        let connector = if is_last { LAST_CHILD } else { EARLIER_CHILD };
        lines.push(format!("{}{}branch: {}", prefix, connector, label));
    }

    let values = node.node_values();
    match node {
        TreeNode::Leaf(leaf) => {
            let attribute = leaf
                .attribute
                .as_deref()
                .map(|attr| format!(" [{}]", attr))
                .unwrap_or_default();
            let label = leaf.label.as_deref().unwrap_or("LABEL?");
            lines.push(format!(
                "{}Leaf {}:{} label={} | n={} | {}={} | {}={} | entropy={}",
                next_prefix,
                leaf.id,
                attribute,
                label,
                values.n,
                legend.first(),
                values.class1,
                legend.second(),
                values.class2,
                format_entropy(values.entropy),
            ));
        }
        TreeNode::Internal(internal) => {
            lines.push(format!(
                "{}Node {}: {} | n={} | entropy={}",
                next_prefix,
                internal.id,
                internal.attribute,
                values.n,
                format_entropy(values.entropy),
            ));

            let count = internal.children.len();
            for (idx, child) in internal.children.iter().enumerate() {
                write_node(
                    lines,
                    child,
                    &next_prefix,
                    child.prev_branch_val(),
                    idx + 1 == count,
                    legend,
                );
            }
        }
    }
}

/// Entropy to two decimal places; blank when absent or non-finite.
fn format_entropy(entropy: Option<f64>) -> String {
    match entropy {
        Some(value) if value.is_finite() => format!("{:.2}", value),
        _ => String::new(),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::options::{ExportFormat, ExportTarget};
    use crate::model::{Cell, InternalNode, LeafNode, NodeValues, Row};

    fn options(target: ExportTarget) -> ExportOptions {
        ExportOptions::new(target, ExportFormat::Text)
    }

    fn table(rows: Vec<Vec<Cell>>) -> TableView {
        TableView::new(rows.into_iter().map(Row::new).collect())
    }

    #[test]
    fn test_single_cell_grid_renders_header_separator() {
        let matrix = grid::normalize(&table(vec![vec![Cell::new("A")]]));
        let text = render_grid_text(&matrix, &[]);
        assert_eq!(text, "+---+\n| A |\n+---+\n| A |\n+---+");
    }

    #[test]
    fn test_grid_rows_have_identical_width() {
        let matrix = grid::normalize(&table(vec![
            vec![Cell::new("Outlook"), Cell::new("Play")],
            vec![Cell::new("Sunny"), Cell::new("No")],
            vec![Cell::new("Overcast"), Cell::new("Yes")],
        ]));
        let text = render_grid_text(&matrix, &[]);

        let mut lengths = text.lines().map(|line| line.chars().count());
        let first = lengths.next().unwrap();
        assert!(lengths.all(|len| len == first));
    }

    #[test]
    fn test_grid_with_captions() {
        let matrix = grid::normalize(&table(vec![vec![Cell::new("A")]]));
        let text = render_grid_text(&matrix, &["Current rule: Outlook = Sunny".to_string()]);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Current rule: Outlook = Sunny");
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "+---+");
    }

    #[test]
    fn test_grid_column_width_tracks_longest_cell() {
        let matrix = grid::normalize(&table(vec![
            vec![Cell::new("ab"), Cell::new("x")],
            vec![Cell::new("a"), Cell::new("longer")],
        ]));
        let text = render_grid_text(&matrix, &[]);
        assert!(text.contains("| ab | x      |"));
        assert!(text.contains("| a  | longer |"));
    }

    #[test]
    fn test_export_empty_table_aborts() {
        let err = export_table_text(
            &TableView::default(),
            &[],
            &options(ExportTarget::DataTable),
        )
        .unwrap_err();
        assert!(matches!(err, Error::EmptyExportRoot { .. }));
    }

    #[test]
    fn test_export_table_text_artifact_name() {
        let artifact = export_table_text(
            &table(vec![vec![Cell::new("A")]]),
            &[],
            &options(ExportTarget::ValueTable),
        )
        .unwrap();
        assert_eq!(artifact.filename, "value-table.txt");
    }

    fn two_leaf_tree() -> TreeNode {
        TreeNode::Internal(InternalNode {
            id: "n0".to_string(),
            attribute: "Weather".to_string(),
            node_values: NodeValues::new(10, 6, 4, 0.971),
            prev_branch_val: None,
            children: vec![
                TreeNode::Leaf(LeafNode {
                    id: "l1".to_string(),
                    attribute: Some("Weather".to_string()),
                    node_values: NodeValues::new(6, 6, 0, 0.0),
                    prev_branch_val: Some("Sunny".to_string()),
                    label: Some("Yes".to_string()),
                }),
                TreeNode::Leaf(LeafNode {
                    id: "l2".to_string(),
                    attribute: Some("Weather".to_string()),
                    node_values: NodeValues {
                        n: 4,
                        class1: 0,
                        class2: 4,
                        entropy: None,
                    },
                    prev_branch_val: Some("Rainy".to_string()),
                    label: Some("No".to_string()),
                }),
            ],
        })
    }

    #[test]
    fn test_tree_connector_glyphs_in_order() {
        let text = render_tree_text(&two_leaf_tree(), &ClassLegend::new("Yes", "No"));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "   Node n0: Weather | n=10 | entropy=0.97");
        assert_eq!(lines[1], "   ├─ branch: Sunny");
        assert_eq!(
            lines[2],
            "   │  Leaf l1: [Weather] label=Yes | n=6 | Yes=6 | No=0 | entropy=0.00"
        );
        assert_eq!(lines[3], "   └─ branch: Rainy");
        assert_eq!(
            lines[4],
            "      Leaf l2: [Weather] label=No | n=4 | Yes=0 | No=4 | entropy="
        );
    }

    #[test]
    fn test_tree_missing_leaf_fields_fall_back() {
        let tree = TreeNode::Leaf(LeafNode {
            id: "l9".to_string(),
            attribute: None,
            node_values: NodeValues::default(),
            prev_branch_val: None,
            label: None,
        });
        let text = render_tree_text(&tree, &ClassLegend::empty());
        assert_eq!(
            text,
            "   Leaf l9: label=LABEL? | n=0 | class0=0 | class1=0 | entropy="
        );
    }

    #[test]
    fn test_export_tree_text_header_block() {
        let tree = two_leaf_tree();
        let artifact = export_tree_text(
            &tree,
            &ClassLegend::new("Yes", "No"),
            &VisibilitySet::empty(),
            &options(ExportTarget::Tree),
        )
        .unwrap();

        let text = artifact.as_str().unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Decision Tree (text export)");
        assert_eq!(lines[1], "Scope: full tree");
        assert_eq!(lines[2], "Classes: Yes , No");
        assert!(lines[3].starts_with("Fields:"));
        assert_eq!(lines[4], "   Node n0: Weather | n=10 | entropy=0.97");
    }

    #[test]
    fn test_export_tree_text_current_step_scope() {
        let tree = two_leaf_tree();
        let visible = VisibilitySet::from_reference_ids(["useNode0", "useLeaf1"]);
        let artifact = export_tree_text(
            &tree,
            &ClassLegend::new("Yes", "No"),
            &visible,
            &options(ExportTarget::Tree),
        )
        .unwrap();

        let text = artifact.as_str().unwrap();
        assert!(text.contains("Scope: current step only"));
        assert!(text.contains("branch: Sunny"));
        assert!(!text.contains("branch: Rainy"));
    }

    #[test]
    fn test_repeated_export_is_byte_identical() {
        let tree = two_leaf_tree();
        let legend = ClassLegend::new("Yes", "No");
        let visible = VisibilitySet::empty();
        let opts = options(ExportTarget::Tree);

        let first = export_tree_text(&tree, &legend, &visible, &opts).unwrap();
        let second = export_tree_text(&tree, &legend, &visible, &opts).unwrap();
        assert_eq!(first.bytes, second.bytes);
    }
}
