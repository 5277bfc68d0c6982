use tracing::debug;

use super::Command;
use crate::error::CommandError;
use crate::models::{NodeId, NodeKind, NodeSnapshot, SnapshotChange, Tree, TreeEvent};

/// In-place property edit described by a before/after snapshot pair.
pub struct EditNodeCommand {
    node: NodeId,
    before: NodeSnapshot,
    after: NodeSnapshot,
    executed: bool,
}

impl EditNodeCommand {
    pub fn new(node: NodeId, before: NodeSnapshot, after: NodeSnapshot) -> Self {
        Self {
            node,
            before,
            after,
            executed: false,
        }
    }

    fn apply(&self, tree: &mut Tree, snapshot: &NodeSnapshot) -> Result<(), CommandError> {
        snapshot.apply(tree, self.node)?;
        if tree.kind(self.node) == Some(NodeKind::Feature) {
            tree.refresh_progress_from(self.node)?;
        }
        tree.notify(TreeEvent::NodeUpdated(self.node));
        Ok(())
    }
}

impl Command for EditNodeCommand {
    fn execute(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if self.executed {
            return Ok(());
        }
        self.apply(tree, &self.after)?;
        self.executed = true;
        debug!("Applied edit to {}", self.node);
        Ok(())
    }

    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.executed {
            return Ok(());
        }
        self.apply(tree, &self.before)?;
        self.executed = false;
        debug!("Reverted edit to {}", self.node);
        Ok(())
    }

    fn description(&self) -> String {
        match self.before.diff(&self.after).as_slice() {
            [SnapshotChange::Name] => {
                format!("Rename '{}' to '{}'", self.before.name, self.after.name)
            }
            [SnapshotChange::WorkPackage] => format!("Reassign '{}'", self.after.name),
            [SnapshotChange::MilestoneStatus(_)] => {
                format!("Update milestone of '{}'", self.after.name)
            }
            _ => format!("Edit '{}'", self.after.name),
        }
    }

    fn nodes(&self) -> Vec<NodeId> {
        vec![self.node]
    }
}
