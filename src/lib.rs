//! Treecast: export pipeline for live decision-tree and table views
//!
//! This crate turns two live, in-memory structures (a tabular grid whose
//! cells may span multiple rows/columns, and a classification tree whose
//! nodes may be selectively hidden by the current view) into static,
//! portable artifacts:
//!
//! - a plain-text bordered table / connector tree,
//! - a self-contained SVG image, and
//! - a standalone HTML document,
//!
//! each delivered as a named byte blob ([`Artifact`]).
//!
//! The pipeline never reaches into ambient state: the caller passes the
//! table, the tree with its class legend, a visibility signal, the export
//! markup, a style resolver, and the rule library explicitly (usually
//! bundled as a [`Snapshot`]). Inputs are cloned up front and never
//! mutated. Locally recoverable problems (a denied stylesheet, a selector
//! that matches nothing, a failed font fetch) degrade in place; only the
//! structural absence of the export target aborts.

pub mod config;
pub mod error;
pub mod export;
pub mod grid;
pub mod markup;
pub mod model;
pub mod snapshot;
pub mod style;
pub mod visibility;

pub use error::{Error, Result};
pub use export::options::{ExportFormat, ExportOptions, ExportTarget};
pub use export::{Artifact, FontRequest};
pub use model::{Cell, ClassLegend, NodeValues, Row, TableView, TreeNode};
pub use snapshot::Snapshot;
pub use visibility::{ExportScope, VisibilitySet};
