//! Tree Visibility and Subtree Cloning
//!
//! The view layer shows the tree step by step; an export must reflect only
//! what is currently on screen. Visibility is decided per diagram reference
//! element (a role-prefixed id derived from the tree node id) and captured
//! into an immutable [`VisibilitySet`] at export time. The subtree cloner
//! then copies only visible nodes, pruning invisible branches entirely.
//!
//! When the root itself is invisible the pipeline falls back to the full
//! unfiltered tree rather than failing, and the export scope records that.

use log::warn;
use std::collections::HashSet;

use crate::markup::Element;
use crate::model::{InternalNode, LeafNode, TreeNode};
use crate::style::StyleResolver;

/// Prefixes of diagram reference ids, by node role.
const NODE_REF_PREFIX: &str = "useNode";
const LEAF_REF_PREFIX: &str = "useLeaf";

/// Map a tree node id to its diagram reference id: a leading `n` marks an
/// internal node (`n3` → `useNode3`), anything else a leaf (`l5` →
/// `useLeaf5`).
pub fn reference_id(node_id: &str) -> String {
    let rest = node_id.get(1..).unwrap_or("");
    if node_id.starts_with('n') {
        format!("{}{}", NODE_REF_PREFIX, rest)
    } else {
        format!("{}{}", LEAF_REF_PREFIX, rest)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Visibility Set
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable snapshot of the diagram reference ids considered shown at
/// export time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisibilitySet {
    ids: HashSet<String>,
}

impl VisibilitySet {
    pub fn new(ids: HashSet<String>) -> Self {
        Self { ids }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Snapshot from an explicit list of reference ids.
    pub fn from_reference_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Snapshot from an injected predicate over reference ids, evaluated for
    /// every node of the tree. The core visibility logic depends only on
    /// this predicate.
    pub fn from_predicate<F>(root: &TreeNode, is_visible: F) -> Self
    where
        F: Fn(&str) -> bool,
    {
        let mut ids = HashSet::new();
        collect_visible(root, &is_visible, &mut ids);
        Self { ids }
    }

    /// Snapshot from diagram markup: a reference element is visible iff its
    /// own resolved `display` is not suppressed and no `g` ancestor's is.
    pub fn from_markup(root: &Element, resolver: &dyn StyleResolver) -> Self {
        let mut ids = HashSet::new();
        collect_from_markup(root, resolver, false, &mut ids);
        Self { ids }
    }

    pub fn contains_reference(&self, reference_id: &str) -> bool {
        self.ids.contains(reference_id)
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.ids.contains(&reference_id(node_id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

fn collect_visible<F>(node: &TreeNode, is_visible: &F, out: &mut HashSet<String>)
where
    F: Fn(&str) -> bool,
{
    let reference = reference_id(node.id());
    if is_visible(&reference) {
        out.insert(reference);
    }
    for child in node.children() {
        collect_visible(child, is_visible, out);
    }
}

fn collect_from_markup(
    el: &Element,
    resolver: &dyn StyleResolver,
    ancestor_suppressed: bool,
    out: &mut HashSet<String>,
) {
    let suppressed_here = resolver
        .resolved_value(el, "display")
        .is_some_and(|display| display == "none");

    if let Some(id) = &el.id {
        let is_reference = id.starts_with(NODE_REF_PREFIX) || id.starts_with(LEAF_REF_PREFIX);
        if is_reference && !suppressed_here && !ancestor_suppressed {
            out.insert(id.clone());
        }
    }

    // Only grouping elements propagate suppression to their subtree.
    let suppresses_children = ancestor_suppressed || (suppressed_here && el.is_tag("g"));
    for child in el.elements() {
        collect_from_markup(child, resolver, suppresses_children, out);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Export Scope
// ─────────────────────────────────────────────────────────────────────────────

/// Whether a tree export reflects the full structure or only the currently
/// visible portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportScope {
    FullTree,
    CurrentStep,
}

impl ExportScope {
    pub fn label(&self) -> &'static str {
        match self {
            ExportScope::FullTree => "full tree",
            ExportScope::CurrentStep => "current step only",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Subtree Cloning
// ─────────────────────────────────────────────────────────────────────────────

/// Clone the visible portion of the tree.
///
/// Copies data-model fields only. An invisible child prunes its whole
/// branch. When the root itself is invisible, the entire unfiltered tree is
/// cloned instead and the scope is [`ExportScope::FullTree`]; the result is
/// never empty.
pub fn select_subtree(root: &TreeNode, visible: &VisibilitySet) -> (TreeNode, ExportScope) {
    let mut seen = HashSet::new();
    match clone_visible(root, visible, &mut seen) {
        Some(clone) => (clone, ExportScope::CurrentStep),
        None => {
            let mut seen = HashSet::new();
            (clone_full(root, &mut seen), ExportScope::FullTree)
        }
    }
}

/// Clone `node` if visible, descending only into visible children. Returns
/// `None` for invisible nodes and for nodes whose id was already seen
/// (defensive cycle/duplicate guard).
pub fn clone_visible(
    node: &TreeNode,
    visible: &VisibilitySet,
    seen: &mut HashSet<String>,
) -> Option<TreeNode> {
    if node.id().is_empty() || !visible.contains_node(node.id()) {
        return None;
    }
    if !seen.insert(node.id().to_string()) {
        warn!("Duplicate node id '{}' in tree; skipping subtree", node.id());
        return None;
    }

    Some(match node {
        TreeNode::Leaf(leaf) => TreeNode::Leaf(LeafNode {
            id: leaf.id.clone(),
            attribute: leaf.attribute.clone(),
            node_values: leaf.node_values.clone(),
            prev_branch_val: leaf.prev_branch_val.clone(),
            label: leaf.label.clone(),
        }),
        TreeNode::Internal(internal) => TreeNode::Internal(InternalNode {
            id: internal.id.clone(),
            attribute: internal.attribute.clone(),
            node_values: internal.node_values.clone(),
            prev_branch_val: internal.prev_branch_val.clone(),
            children: internal
                .children
                .iter()
                .filter_map(|child| clone_visible(child, visible, seen))
                .collect(),
        }),
    })
}

fn clone_full(node: &TreeNode, seen: &mut HashSet<String>) -> TreeNode {
    match node {
        TreeNode::Leaf(_) => node.clone(),
        TreeNode::Internal(internal) => TreeNode::Internal(InternalNode {
            id: internal.id.clone(),
            attribute: internal.attribute.clone(),
            node_values: internal.node_values.clone(),
            prev_branch_val: internal.prev_branch_val.clone(),
            children: internal
                .children
                .iter()
                .filter_map(|child| {
                    if !seen.insert(child.id().to_string()) {
                        warn!(
                            "Duplicate node id '{}' in tree; skipping subtree",
                            child.id()
                        );
                        return None;
                    }
                    Some(clone_full(child, seen))
                })
                .collect(),
        }),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassLegend, NodeValues};
    use crate::style::MapResolver;

    fn leaf(id: &str, branch: &str) -> TreeNode {
        TreeNode::Leaf(LeafNode {
            id: id.to_string(),
            attribute: Some("Weather".to_string()),
            node_values: NodeValues::new(4, 4, 0, 0.0),
            prev_branch_val: Some(branch.to_string()),
            label: Some("Yes".to_string()),
        })
    }

    fn sample_tree() -> TreeNode {
        TreeNode::Internal(InternalNode {
            id: "n0".to_string(),
            attribute: "Weather".to_string(),
            node_values: NodeValues::new(10, 6, 4, 0.97),
            prev_branch_val: None,
            children: vec![leaf("l1", "Sunny"), leaf("l2", "Rainy")],
        })
    }

    #[test]
    fn test_reference_id_mapping() {
        assert_eq!(reference_id("n3"), "useNode3");
        assert_eq!(reference_id("l5"), "useLeaf5");
        assert_eq!(reference_id("n12"), "useNode12");
    }

    #[test]
    fn test_from_predicate() {
        let tree = sample_tree();
        let visible = VisibilitySet::from_predicate(&tree, |ref_id| ref_id != "useLeaf2");

        assert!(visible.contains_node("n0"));
        assert!(visible.contains_node("l1"));
        assert!(!visible.contains_node("l2"));
    }

    #[test]
    fn test_clone_visible_prunes_branches() {
        let tree = sample_tree();
        let visible = VisibilitySet::from_reference_ids(["useNode0", "useLeaf1"]);

        let (clone, scope) = select_subtree(&tree, &visible);
        assert_eq!(scope, ExportScope::CurrentStep);
        assert_eq!(clone.children().len(), 1);
        assert_eq!(clone.children()[0].id(), "l1");
    }

    #[test]
    fn test_invisible_root_falls_back_to_full_tree() {
        let tree = sample_tree();
        let (clone, scope) = select_subtree(&tree, &VisibilitySet::empty());

        assert_eq!(scope, ExportScope::FullTree);
        assert_eq!(clone, tree);
    }

    #[test]
    fn test_duplicate_ids_are_skipped() {
        let tree = TreeNode::Internal(InternalNode {
            id: "n0".to_string(),
            attribute: "Weather".to_string(),
            node_values: NodeValues::default(),
            prev_branch_val: None,
            children: vec![leaf("l1", "Sunny"), leaf("l1", "Rainy")],
        });
        let visible =
            VisibilitySet::from_reference_ids(["useNode0", "useLeaf1"]);

        let (clone, _) = select_subtree(&tree, &visible);
        assert_eq!(clone.children().len(), 1);
    }

    #[test]
    fn test_from_markup_respects_group_suppression() {
        let svg = Element::new("svg")
            .child(
                Element::new("g")
                    .with_id("gVisible")
                    .child(Element::new("use").with_id("useNode0"))
                    .child(Element::new("use").with_id("useLeaf1")),
            )
            .child(
                Element::new("g")
                    .with_id("gHidden")
                    .child(Element::new("use").with_id("useLeaf2")),
            )
            .child(Element::new("use").with_id("useLeaf3"));

        let mut resolver = MapResolver::new();
        resolver.insert("gHidden", "display", "none");
        resolver.insert("useLeaf3", "display", "none");

        let visible = VisibilitySet::from_markup(&svg, &resolver);
        assert!(visible.contains_reference("useNode0"));
        assert!(visible.contains_reference("useLeaf1"));
        assert!(!visible.contains_reference("useLeaf2"));
        assert!(!visible.contains_reference("useLeaf3"));
        assert_eq!(visible.len(), 2);
    }

    #[test]
    fn test_scope_labels() {
        assert_eq!(ExportScope::FullTree.label(), "full tree");
        assert_eq!(ExportScope::CurrentStep.label(), "current step only");

        // Legend heading used alongside the scope in export headers.
        assert_eq!(ClassLegend::new("Yes", "No").heading(), "Yes , No");
    }
}
