use tracing::{debug, warn};

use super::{label, Command};
use crate::error::CommandError;
use crate::models::{NodeId, Tree, TreeEvent};

/// Detach a node (and its subtree) from its parent.
///
/// The root has no parent, so deleting it does nothing. Undo puts the node
/// back at the index it was removed from.
pub struct DeleteNodeCommand {
    node: NodeId,
    parent: Option<NodeId>,
    index: Option<usize>,
    description: String,
    executed: bool,
}

impl DeleteNodeCommand {
    pub fn new(tree: &Tree, node: NodeId) -> Self {
        Self {
            node,
            parent: tree.parent(node),
            index: None,
            description: format!("Delete {}", label(tree, node)),
            executed: false,
        }
    }
}

impl Command for DeleteNodeCommand {
    fn execute(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if self.executed {
            return Ok(());
        }
        let Some(parent) = self.parent else {
            warn!("Refusing to delete root node {}", self.node);
            return Ok(());
        };
        self.index = Some(tree.remove_child(parent, self.node)?);
        self.executed = true;
        debug!("Deleted {} from {}", self.node, parent);
        tree.notify(TreeEvent::StructureChanged(parent));
        Ok(())
    }

    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.executed {
            return Ok(());
        }
        let Some(parent) = self.parent else {
            return Ok(());
        };
        match self.index {
            Some(index) => {
                tree.insert_child(parent, self.node, index as isize)?;
            }
            None => tree.append_child(parent, self.node)?,
        }
        self.executed = false;
        debug!("Restored {} under {}", self.node, parent);
        tree.notify(TreeEvent::StructureChanged(parent));
        Ok(())
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn nodes(&self) -> Vec<NodeId> {
        std::iter::once(self.node).chain(self.parent).collect()
    }
}
