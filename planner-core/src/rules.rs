//! Hierarchy rules deciding which structural edits are legal.
//!
//! All checks are read-only. Commands never re-validate, so callers run
//! these before building an add, move or paste.

use serde::{Deserialize, Serialize};

use crate::models::{NodeId, NodeKind, Tree};

/// Whether the two outermost levels may mix `Program` and `Project` children.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum HierarchyMode {
    /// A portfolio holds either programs or projects, never both.
    Strict,
    #[default]
    Lenient,
}

impl HierarchyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Lenient => "lenient",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "strict" => Some(Self::Strict),
            "lenient" => Some(Self::Lenient),
            _ => None,
        }
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Strict)
    }
}

/// Child kinds each level accepts.
pub fn allowed_children(parent: NodeKind) -> &'static [NodeKind] {
    match parent {
        NodeKind::Portfolio | NodeKind::Program => &[NodeKind::Program, NodeKind::Project],
        NodeKind::Project => &[NodeKind::Area],
        NodeKind::Area => &[NodeKind::Capability],
        NodeKind::Capability => &[NodeKind::Feature],
        NodeKind::Feature => &[],
    }
}

/// Table lookup only, ignoring siblings and mode.
pub fn kind_accepts(parent: NodeKind, child: NodeKind) -> bool {
    allowed_children(parent).contains(&child)
}

/// Whether `parent` may take a new child of kind `child`.
///
/// In strict mode a portfolio that already holds programs refuses projects
/// and vice versa.
pub fn hierarchy_accepts(tree: &Tree, parent: NodeId, child: NodeKind, mode: HierarchyMode) -> bool {
    let Some(parent_kind) = tree.kind(parent) else {
        return false;
    };
    if !kind_accepts(parent_kind, child) {
        return false;
    }
    if mode.is_strict() && parent_kind == NodeKind::Portfolio {
        let mixes = tree
            .children(parent)
            .iter()
            .filter_map(|c| tree.kind(*c))
            .any(|existing| existing != child && kind_accepts(NodeKind::Portfolio, existing));
        if mixes {
            return false;
        }
    }
    true
}

/// Whether `candidate_parent` lies inside the subtree rooted at `potential_child`.
///
/// Walks the parent chain starting at `candidate_parent` itself, so a node
/// counts as inside its own subtree.
pub fn is_descendant(tree: &Tree, candidate_parent: NodeId, potential_child: NodeId) -> bool {
    candidate_parent == potential_child
        || tree
            .ancestors(candidate_parent)
            .any(|ancestor| ancestor == potential_child)
}

/// Whether `child` may be moved under `new_parent`.
///
/// Moving a node under itself is rejected too: [`is_descendant`] counts a
/// node as part of its own subtree.
pub fn is_valid_reparent(tree: &Tree, child: NodeId, new_parent: NodeId, mode: HierarchyMode) -> bool {
    let (Some(child_kind), true) = (tree.kind(child), tree.contains(new_parent)) else {
        return false;
    };
    if tree.parent(child).is_none() {
        return false;
    }
    if is_descendant(tree, new_parent, child) {
        return false;
    }
    hierarchy_accepts(tree, new_parent, child_kind, mode)
}

/// Whether `dragged` may be placed directly before or after `reference`.
pub fn can_insert_sibling(
    tree: &Tree,
    dragged: NodeId,
    reference: NodeId,
    mode: HierarchyMode,
) -> bool {
    if dragged == reference {
        return false;
    }
    let (Some(dragged_kind), true) = (tree.kind(dragged), tree.contains(reference)) else {
        return false;
    };
    let Some(parent) = tree.parent(reference) else {
        return false;
    };
    if tree.parent(dragged) == Some(parent) && tree.children(parent).len() == 2 {
        return false;
    }
    hierarchy_accepts(tree, parent, dragged_kind, mode) && !is_descendant(tree, reference, dragged)
}
