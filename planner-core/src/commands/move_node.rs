use tracing::{debug, warn};

use super::{label, Command};
use crate::error::CommandError;
use crate::models::{NodeId, Tree, TreeEvent};

/// Reparent or reorder a node.
///
/// With `new_index` the node lands at that position in `new_parent` (clamped,
/// see [`crate::move_index`]); without it the node is appended. Moving to the
/// current parent without an index is a no-op, as is moving the root.
pub struct MoveNodeCommand {
    node: NodeId,
    original_parent: Option<NodeId>,
    original_index: Option<usize>,
    new_parent: NodeId,
    new_index: Option<isize>,
    landed_at: Option<usize>,
    description: String,
    executed: bool,
}

impl MoveNodeCommand {
    pub fn new(tree: &Tree, node: NodeId, new_parent: NodeId, new_index: Option<isize>) -> Self {
        Self {
            node,
            original_parent: tree.parent(node),
            original_index: None,
            new_parent,
            new_index,
            landed_at: None,
            description: format!("Move {}", label(tree, node)),
            executed: false,
        }
    }

    /// Index the node occupied in the new parent after the last execute.
    pub fn landed_at(&self) -> Option<usize> {
        self.landed_at
    }
}

impl Command for MoveNodeCommand {
    fn execute(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if self.executed {
            return Ok(());
        }
        let Some(original_parent) = self.original_parent else {
            warn!("Refusing to move root node {}", self.node);
            return Ok(());
        };
        if original_parent == self.new_parent && self.new_index.is_none() {
            return Ok(());
        }
        tree.node(self.new_parent)?;

        self.original_index = Some(tree.remove_child(original_parent, self.node)?);
        let landed_at = match self.new_index {
            Some(index) => tree.insert_child(self.new_parent, self.node, index)?,
            None => {
                tree.append_child(self.new_parent, self.node)?;
                tree.children(self.new_parent).len() - 1
            }
        };
        self.landed_at = Some(landed_at);
        self.executed = true;
        debug!(
            "Moved {} from {} to {} at {}",
            self.node, original_parent, self.new_parent, landed_at
        );

        tree.notify(TreeEvent::StructureChanged(original_parent));
        if self.new_parent != original_parent {
            tree.notify(TreeEvent::StructureChanged(self.new_parent));
        }
        Ok(())
    }

    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.executed {
            return Ok(());
        }
        let Some(original_parent) = self.original_parent else {
            return Ok(());
        };
        tree.remove_child(self.new_parent, self.node)?;
        match self.original_index {
            Some(index) => {
                tree.insert_child(original_parent, self.node, index as isize)?;
            }
            None => tree.append_child(original_parent, self.node)?,
        }
        self.executed = false;
        debug!("Moved {} back to {}", self.node, original_parent);

        tree.notify(TreeEvent::StructureChanged(self.new_parent));
        if self.new_parent != original_parent {
            tree.notify(TreeEvent::StructureChanged(original_parent));
        }
        Ok(())
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn nodes(&self) -> Vec<NodeId> {
        [Some(self.node), self.original_parent, Some(self.new_parent)]
            .into_iter()
            .flatten()
            .collect()
    }
}
