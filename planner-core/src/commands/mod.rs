//! Reversible commands over a [`Tree`].
//!
//! Every command captures enough state on construction and execution to
//! reverse itself exactly. `execute` on an executed command and `undo` on a
//! command that is not executed are no-ops, so a command can bounce between
//! the undo and redo histories any number of times.
//!
//! - Structural commands ([`AddChildCommand`], [`DeleteNodeCommand`],
//!   [`MoveNodeCommand`], [`PasteNodeCommand`]) queue
//!   [`TreeEvent::StructureChanged`](crate::models::TreeEvent::StructureChanged).
//! - [`EditNodeCommand`] queues [`TreeEvent::NodeUpdated`](crate::models::TreeEvent::NodeUpdated).

mod add;
mod delete;
mod edit;
mod move_node;
mod paste;

pub use add::AddChildCommand;
pub use delete::DeleteNodeCommand;
pub use edit::EditNodeCommand;
pub use move_node::MoveNodeCommand;
pub use paste::PasteNodeCommand;

use crate::error::CommandError;
use crate::models::{NodeId, Tree};

pub trait Command {
    /// Apply the effect. No-op when already executed.
    fn execute(&mut self, tree: &mut Tree) -> Result<(), CommandError>;

    /// Reverse the effect. No-op when not currently executed.
    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError>;

    /// Short human-readable label for menus ("Undo Delete feature 'Login'").
    fn description(&self) -> String;

    /// Every node this command may attach, detach or edit again.
    ///
    /// Nodes outside the tree stay allocated only while some recorded
    /// command lists them here.
    fn nodes(&self) -> Vec<NodeId>;
}

/// `kind 'name'` for descriptions, or the raw id if the node is unknown.
pub(crate) fn label(tree: &Tree, id: NodeId) -> String {
    match tree.get(id) {
        Some(node) => format!("{} '{}'", node.kind(), node.name),
        None => id.to_string(),
    }
}
