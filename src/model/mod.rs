//! Data Model for Treecast
//!
//! This module defines the value types the export pipeline consumes: the
//! span-annotated table structure and the classification tree. Both are
//! created and mutated by an external view layer; the pipeline treats them
//! as read-only snapshots and clones before any transform.
//!
//! # Architecture
//!
//! - `table.rs` - Origin cells, rows, and the table view with its header flag
//! - `tree.rs` - The two-variant tree node, per-node statistics, class legend

pub mod table;
pub mod tree;

pub use table::{Cell, Row, TableView};
pub use tree::{ClassLegend, InternalNode, LeafNode, NodeValues, TreeNode};
