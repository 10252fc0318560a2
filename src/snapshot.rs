//! Export Snapshots
//!
//! A [`Snapshot`] bundles everything the view layer supplies to the export
//! pipeline: the two tables, the tree with its legend and visibility state,
//! captured markup, the rule library, and recorded resolved styles. The CLI
//! reads one from disk; the test-suite uses the same shape as its fixture
//! format.
//!
//! Exports never consult ambient state: every input is carried explicitly
//! by the snapshot, and each export call works on clones of it.

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::export::font::FontRequest;
use crate::export::options::{ExportFormat, ExportOptions, ExportTarget};
use crate::export::{html, svg, text, Artifact};
use crate::markup::{table_markup, BoundingBox, Element};
use crate::model::{ClassLegend, TableView, TreeNode};
use crate::style::{MapResolver, RuleLibrary};
use crate::visibility::VisibilitySet;

/// Viewport used when a table snapshot carries no live measurement.
const NOMINAL_BOUNDS: BoundingBox = BoundingBox {
    width: 640.0,
    height: 480.0,
};

// ─────────────────────────────────────────────────────────────────────────────
// Snapshot Shapes
// ─────────────────────────────────────────────────────────────────────────────

/// One table as captured from the live view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSnapshot {
    pub view: TableView,

    /// Free-text caption lines rendered above the plain-text grid
    #[serde(default)]
    pub captions: Vec<String>,

    /// Captured markup of the on-screen table; synthesized from `view`
    /// when absent
    #[serde(default)]
    pub markup: Option<Element>,

    /// Live bounding box of the on-screen table
    #[serde(default)]
    pub bounds: Option<BoundingBox>,
}

impl TableSnapshot {
    pub fn new(view: TableView) -> Self {
        Self {
            view,
            captions: Vec::new(),
            markup: None,
            bounds: None,
        }
    }
}

/// The tree as captured from the live view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub root: TreeNode,

    #[serde(default)]
    pub legend: ClassLegend,

    /// Reference ids currently shown; `None` when the view supplied no
    /// visibility signal (the diagram markup is consulted instead, and
    /// failing that the export falls back to the full tree)
    #[serde(default)]
    pub visible_reference_ids: Option<Vec<String>>,

    /// The diagram's svg markup, required for rich tree exports
    #[serde(default)]
    pub diagram: Option<Element>,
}

impl TreeSnapshot {
    pub fn new(root: TreeNode) -> Self {
        Self {
            root,
            legend: ClassLegend::empty(),
            visible_reference_ids: None,
            diagram: None,
        }
    }
}

/// The style-resolution environment captured at export time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleEnvironment {
    /// Every discoverable rule source
    pub rules: RuleLibrary,

    /// Recorded resolved values, keyed by element id
    pub resolved: MapResolver,

    /// Font to embed into vector exports
    pub font: Option<FontRequest>,
}

/// The complete bundle of collaborator-supplied inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    pub data_table: Option<TableSnapshot>,
    pub value_table: Option<TableSnapshot>,
    pub tree: Option<TreeSnapshot>,
    pub styles: StyleEnvironment,
}

impl Snapshot {
    /// Parse a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a snapshot from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    fn table(&self, target: ExportTarget) -> Option<&TableSnapshot> {
        match target {
            ExportTarget::DataTable => self.data_table.as_ref(),
            ExportTarget::ValueTable => self.value_table.as_ref(),
            ExportTarget::Tree => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Export Dispatch
    // ─────────────────────────────────────────────────────────────────────

    /// Run one export against this snapshot, producing a named byte blob.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingExportRoot`] / [`Error::EmptyExportRoot`]
    /// when the requested target is absent or holds nothing, and
    /// [`Error::TreeDataUnavailable`] for tree exports without tree data.
    pub fn export(&self, options: &ExportOptions) -> Result<Artifact> {
        match options.target {
            ExportTarget::DataTable | ExportTarget::ValueTable => {
                self.export_table(options.target, options)
            }
            ExportTarget::Tree => self.export_tree(options),
        }
    }

    fn export_table(&self, target: ExportTarget, options: &ExportOptions) -> Result<Artifact> {
        let table = self.table(target).ok_or_else(|| Error::MissingExportRoot {
            target: target.label().to_string(),
        })?;

        match options.format {
            ExportFormat::Text => text::export_table_text(&table.view, &table.captions, options),
            ExportFormat::Svg => {
                let markup = self.table_root(table);
                let bounds = table.bounds.unwrap_or_else(|| {
                    warn!(
                        "No live measurement for the {}; using nominal viewport",
                        target.label()
                    );
                    NOMINAL_BOUNDS
                });
                svg::export_table_svg(&markup, &self.styles.resolved, &self.styles.rules, bounds, options)
            }
            ExportFormat::Html => {
                let markup = self.table_root(table);
                html::export_table_html(&markup, &self.styles.resolved, &self.styles.rules, options)
            }
        }
    }

    /// The export root for a table: captured markup when the snapshot
    /// carries it, otherwise markup synthesized from the table view.
    fn table_root(&self, table: &TableSnapshot) -> Element {
        table
            .markup
            .clone()
            .unwrap_or_else(|| table_markup(&table.view))
    }

    fn export_tree(&self, options: &ExportOptions) -> Result<Artifact> {
        let tree = self.tree.as_ref().ok_or(Error::TreeDataUnavailable)?;

        match options.format {
            ExportFormat::Text => {
                let visibility = self.tree_visibility(tree);
                text::export_tree_text(&tree.root, &tree.legend, &visibility, options)
            }
            ExportFormat::Svg => {
                let diagram = self.tree_diagram(tree)?;
                let font = options.embed_font.as_ref().or(self.styles.font.as_ref());
                svg::export_tree_svg(diagram, &self.styles.resolved, &self.styles.rules, font, options)
            }
            ExportFormat::Html => {
                let diagram = self.tree_diagram(tree)?;
                html::export_tree_html(diagram, options)
            }
        }
    }

    /// The visibility snapshot for the tree: the explicit id list when
    /// supplied, else display states read off the diagram markup, else an
    /// empty set (which makes the export fall back to the full tree).
    fn tree_visibility(&self, tree: &TreeSnapshot) -> VisibilitySet {
        if let Some(ids) = &tree.visible_reference_ids {
            return VisibilitySet::from_reference_ids(ids.iter().cloned());
        }
        if let Some(diagram) = &tree.diagram {
            return VisibilitySet::from_markup(diagram, &self.styles.resolved);
        }
        VisibilitySet::empty()
    }

    fn tree_diagram<'a>(&self, tree: &'a TreeSnapshot) -> Result<&'a Element> {
        tree.diagram.as_ref().ok_or_else(|| Error::MissingExportRoot {
            target: "tree diagram".to_string(),
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row};

    fn sample_snapshot_json() -> String {
        r#"{
            "dataTable": {
                "view": {
                    "rows": [
                        [ {"text": "Outlook"}, {"text": "Play"} ],
                        [ {"text": "Sunny", "rowSpan": 2}, {"text": "No"} ],
                        [ {"text": "Yes"} ]
                    ],
                    "hasHeaderSection": true
                },
                "captions": ["Current rule: Outlook = Sunny"],
                "bounds": { "width": 320.4, "height": 96.0 }
            },
            "tree": {
                "root": {
                    "id": "n0",
                    "attribute": "Outlook",
                    "nodeValues": { "n": 14, "class1": 9, "class2": 5, "entropy": 0.94 },
                    "children": [
                        {
                            "id": "l1",
                            "attribute": "Outlook",
                            "prevBranchVal": "Overcast",
                            "nodeValues": { "n": 4, "class1": 4, "class2": 0, "entropy": 0 },
                            "isLeaf": true,
                            "label": "Yes"
                        }
                    ]
                },
                "legend": ["Yes", "No"],
                "visibleReferenceIds": ["useNode0", "useLeaf1"]
            },
            "styles": {
                "rules": {
                    "inlineCss": [".table { border: 1px solid #ddd; }"],
                    "sheets": [ { "href": "https://cdn.example/app.css", "rules": null } ]
                },
                "resolved": {},
                "font": { "family": "Inter", "source": "/missing/Inter.woff2" }
            }
        }"#
        .to_string()
    }

    #[test]
    fn test_snapshot_round_trip() {
        let snapshot = Snapshot::from_json_str(&sample_snapshot_json()).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back = Snapshot::from_json_str(&json).unwrap();
        assert_eq!(snapshot, back);
    }

    #[test]
    fn test_snapshot_parse_error() {
        let err = Snapshot::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, Error::SnapshotParse { .. }));
    }

    #[test]
    fn test_table_text_export_via_snapshot() {
        let snapshot = Snapshot::from_json_str(&sample_snapshot_json()).unwrap();
        let artifact = snapshot
            .export(&ExportOptions::new(ExportTarget::DataTable, ExportFormat::Text))
            .unwrap();

        let text = artifact.as_str().unwrap();
        assert!(text.starts_with("Current rule: Outlook = Sunny\n"));
        // Row-span carryover replays "Sunny" into the following row.
        assert!(text.contains("| Sunny   | No   |"));
        assert!(text.contains("| Sunny   | Yes  |"));
    }

    #[test]
    fn test_table_svg_export_uses_measured_bounds() {
        let snapshot = Snapshot::from_json_str(&sample_snapshot_json()).unwrap();
        let artifact = snapshot
            .export(&ExportOptions::new(ExportTarget::DataTable, ExportFormat::Svg))
            .unwrap();

        let svg = artifact.as_str().unwrap();
        assert!(svg.contains("width=\"321\" height=\"96\""));
    }

    #[test]
    fn test_missing_table_aborts() {
        let snapshot = Snapshot::from_json_str(&sample_snapshot_json()).unwrap();
        let err = snapshot
            .export(&ExportOptions::new(ExportTarget::ValueTable, ExportFormat::Text))
            .unwrap_err();
        assert!(matches!(err, Error::MissingExportRoot { .. }));
    }

    #[test]
    fn test_tree_text_export_scope_from_ids() {
        let snapshot = Snapshot::from_json_str(&sample_snapshot_json()).unwrap();
        let artifact = snapshot
            .export(&ExportOptions::new(ExportTarget::Tree, ExportFormat::Text))
            .unwrap();

        let text = artifact.as_str().unwrap();
        assert!(text.contains("Scope: current step only"));
        assert!(text.contains("Classes: Yes , No"));
        assert!(text.contains("branch: Overcast"));
    }

    #[test]
    fn test_tree_svg_without_diagram_aborts() {
        let snapshot = Snapshot::from_json_str(&sample_snapshot_json()).unwrap();
        let err = snapshot
            .export(&ExportOptions::new(ExportTarget::Tree, ExportFormat::Svg))
            .unwrap_err();
        assert!(matches!(err, Error::MissingExportRoot { .. }));
    }

    #[test]
    fn test_tree_export_without_tree_data() {
        let snapshot = Snapshot::default();
        let err = snapshot
            .export(&ExportOptions::new(ExportTarget::Tree, ExportFormat::Text))
            .unwrap_err();
        assert!(matches!(err, Error::TreeDataUnavailable));
    }

    #[test]
    fn test_nominal_bounds_when_unmeasured() {
        let mut snapshot = Snapshot::default();
        snapshot.data_table = Some(TableSnapshot::new(TableView::new(vec![Row::new(vec![
            Cell::new("A"),
        ])])));

        let artifact = snapshot
            .export(&ExportOptions::new(ExportTarget::DataTable, ExportFormat::Svg))
            .unwrap();
        assert!(artifact.as_str().unwrap().contains("width=\"640\" height=\"480\""));
    }
}
