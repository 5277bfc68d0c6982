use thiserror::Error;

use crate::models::{NodeId, NodeKind};

/// Failures raised by primitive tree operations.
///
/// These describe programmer errors at the command layer: callers are
/// expected to validate with [`crate::rules`] before building a command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Node {0} is already attached to a parent")]
    AlreadyAttached(NodeId),

    #[error("Node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Node {node} is a {actual}, expected a {expected}")]
    WrongKind {
        node: NodeId,
        expected: NodeKind,
        actual: NodeKind,
    },

    #[error("Snapshot for a {snapshot} node cannot be applied to {node} ({kind})")]
    SnapshotMismatch {
        node: NodeId,
        kind: NodeKind,
        snapshot: &'static str,
    },
}

/// Failures surfaced by [`crate::commands::Command`] implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("Failed to clone clipboard node {node}: {source}")]
    CloneFailed {
        node: NodeId,
        #[source]
        source: TreeError,
    },
}

/// Rejections reported by [`crate::session::EditSession`] before any command runs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("A {parent} cannot contain a {child}")]
    IllegalChild { parent: NodeKind, child: NodeKind },

    #[error("Cannot move {node} under {target}")]
    InvalidReparent { node: NodeId, target: NodeId },

    #[error("Cannot insert {node} next to {reference}")]
    InvalidSiblingInsert { node: NodeId, reference: NodeId },

    #[error("Node {node} has no milestone at position {index}")]
    NoSuchMilestone { node: NodeId, index: usize },

    #[error("Project has no work package named '{0}'")]
    NoSuchWorkPackage(String),

    #[error("{0} is not a feature")]
    NotAFeature(NodeId),

    #[error("Clipboard is empty")]
    EmptyClipboard,

    #[error("Paste of {0} finished without attaching a copy")]
    PasteIncomplete(NodeId),

    #[error(transparent)]
    Command(#[from] CommandError),
}

impl From<TreeError> for EditError {
    fn from(err: TreeError) -> Self {
        Self::Command(CommandError::Tree(err))
    }
}
