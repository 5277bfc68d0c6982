use tracing::debug;

use super::{label, Command};
use crate::error::CommandError;
use crate::models::{NodeId, Tree, TreeEvent};

/// Append a detached `child` under `parent`.
pub struct AddChildCommand {
    parent: NodeId,
    child: NodeId,
    description: String,
    executed: bool,
}

impl AddChildCommand {
    pub fn new(tree: &Tree, parent: NodeId, child: NodeId) -> Self {
        Self {
            parent,
            child,
            description: format!("Add {}", label(tree, child)),
            executed: false,
        }
    }
}

impl Command for AddChildCommand {
    fn execute(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if self.executed {
            return Ok(());
        }
        tree.append_child(self.parent, self.child)?;
        self.executed = true;
        debug!("Added {} under {}", self.child, self.parent);
        tree.notify(TreeEvent::StructureChanged(self.parent));
        Ok(())
    }

    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.executed {
            return Ok(());
        }
        tree.remove_child(self.parent, self.child)?;
        self.executed = false;
        debug!("Removed {} from {}", self.child, self.parent);
        tree.notify(TreeEvent::StructureChanged(self.parent));
        Ok(())
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.parent, self.child]
    }
}
