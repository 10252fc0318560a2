//! Classification Tree Model
//!
//! An immutable value representation of the externally-built decision tree.
//! Nodes come in two variants: internal nodes carry a split attribute and
//! ordered children; leaves carry a classification label. Every node has a
//! stable unique id, per-node statistics, and (except the root) the label of
//! its incoming branch.
//!
//! The wire form is the flat object shape the view layer produces (an
//! `isLeaf` discriminator instead of a tagged variant); (de)serialization
//! maps between the two.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Node Statistics
// ─────────────────────────────────────────────────────────────────────────────

/// Per-node sample statistics.
///
/// `class1`/`class2` are counts for the two classes in legend order;
/// `entropy` is in `[0, 1]` when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeValues {
    pub n: u64,
    pub class1: u64,
    pub class2: u64,
    pub entropy: Option<f64>,
}

impl NodeValues {
    pub fn new(n: u64, class1: u64, class2: u64, entropy: f64) -> Self {
        Self {
            n,
            class1,
            class2,
            entropy: Some(entropy),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Nodes
// ─────────────────────────────────────────────────────────────────────────────

/// A node of the classification tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum TreeNode {
    Internal(InternalNode),
    Leaf(LeafNode),
}

/// An internal node: split attribute plus ordered children.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalNode {
    pub id: String,
    /// The attribute this node splits on
    pub attribute: String,
    pub node_values: NodeValues,
    /// Incoming branch label; `None` only for the root
    pub prev_branch_val: Option<String>,
    pub children: Vec<TreeNode>,
}

/// A leaf node carrying a classification label.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafNode {
    pub id: String,
    /// The parent's split attribute, as supplied by the view layer
    pub attribute: Option<String>,
    pub node_values: NodeValues,
    /// Incoming branch label; `None` only for the root
    pub prev_branch_val: Option<String>,
    pub label: Option<String>,
}

impl TreeNode {
    pub fn id(&self) -> &str {
        match self {
            TreeNode::Internal(node) => &node.id,
            TreeNode::Leaf(node) => &node.id,
        }
    }

    pub fn node_values(&self) -> &NodeValues {
        match self {
            TreeNode::Internal(node) => &node.node_values,
            TreeNode::Leaf(node) => &node.node_values,
        }
    }

    pub fn prev_branch_val(&self) -> Option<&str> {
        match self {
            TreeNode::Internal(node) => node.prev_branch_val.as_deref(),
            TreeNode::Leaf(node) => node.prev_branch_val.as_deref(),
        }
    }

    /// Ordered children; empty for leaves.
    pub fn children(&self) -> &[TreeNode] {
        match self {
            TreeNode::Internal(node) => &node.children,
            TreeNode::Leaf(_) => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TreeNode::Leaf(_))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire Form
// ─────────────────────────────────────────────────────────────────────────────

/// The flat object shape produced by the view layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawNode {
    id: String,
    attribute: Option<String>,
    node_values: NodeValues,
    prev_branch_val: Option<String>,
    children: Vec<RawNode>,
    is_leaf: bool,
    label: Option<String>,
}

impl Default for RawNode {
    fn default() -> Self {
        Self {
            id: String::new(),
            attribute: None,
            node_values: NodeValues::default(),
            prev_branch_val: None,
            children: Vec::new(),
            is_leaf: false,
            label: None,
        }
    }
}

impl From<RawNode> for TreeNode {
    fn from(raw: RawNode) -> Self {
        if raw.is_leaf {
            // Children of a malformed leaf are dropped, not followed.
            TreeNode::Leaf(LeafNode {
                id: raw.id,
                attribute: raw.attribute,
                node_values: raw.node_values,
                prev_branch_val: raw.prev_branch_val,
                label: raw.label,
            })
        } else {
            TreeNode::Internal(InternalNode {
                id: raw.id,
                attribute: raw.attribute.unwrap_or_default(),
                node_values: raw.node_values,
                prev_branch_val: raw.prev_branch_val,
                children: raw.children.into_iter().map(TreeNode::from).collect(),
            })
        }
    }
}

impl From<TreeNode> for RawNode {
    fn from(node: TreeNode) -> Self {
        match node {
            TreeNode::Internal(node) => RawNode {
                id: node.id,
                attribute: Some(node.attribute),
                node_values: node.node_values,
                prev_branch_val: node.prev_branch_val,
                children: node.children.into_iter().map(RawNode::from).collect(),
                is_leaf: false,
                label: None,
            },
            TreeNode::Leaf(node) => RawNode {
                id: node.id,
                attribute: node.attribute,
                node_values: node.node_values,
                prev_branch_val: node.prev_branch_val,
                children: Vec::new(),
                is_leaf: true,
                label: node.label,
            },
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Class Legend
// ─────────────────────────────────────────────────────────────────────────────

/// Placeholder names used when the legend is not available.
const PLACEHOLDER_CLASS_NAMES: [&str; 2] = ["class0", "class1"];

/// The ordered pair of class names used to label leaf statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassLegend(pub Vec<String>);

impl ClassLegend {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        ClassLegend(vec![first.into(), second.into()])
    }

    pub fn empty() -> Self {
        ClassLegend(Vec::new())
    }

    /// Name of the first class, or its placeholder.
    pub fn first(&self) -> &str {
        self.0
            .first()
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_CLASS_NAMES[0])
    }

    /// Name of the second class, or its placeholder.
    pub fn second(&self) -> &str {
        self.0
            .get(1)
            .map(String::as_str)
            .unwrap_or(PLACEHOLDER_CLASS_NAMES[1])
    }

    /// Legend line for export headers: names joined with `" , "`, or
    /// `"(unknown)"` when no names were supplied.
    pub fn heading(&self) -> String {
        if self.0.is_empty() {
            "(unknown)".to_string()
        } else {
            self.0.join(" , ")
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
