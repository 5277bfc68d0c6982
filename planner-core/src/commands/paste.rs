use tracing::debug;

use super::{label, Command};
use crate::error::CommandError;
use crate::models::{NodeId, Tree, TreeEvent};

/// Attach a deep copy of the clipboard node under `target`.
///
/// The copy is made on first execute and reused on redo, so later commands
/// that refer to the pasted nodes stay valid across undo/redo. With
/// `resequence` every feature in the copy gets a fresh sequence id.
pub struct PasteNodeCommand {
    target: NodeId,
    source: NodeId,
    resequence: bool,
    pasted: Option<NodeId>,
    description: String,
    executed: bool,
}

impl PasteNodeCommand {
    pub fn new(tree: &Tree, target: NodeId, source: NodeId, resequence: bool) -> Self {
        Self {
            target,
            source,
            resequence,
            pasted: None,
            description: format!("Paste {}", label(tree, source)),
            executed: false,
        }
    }

    /// Root of the pasted copy, once executed.
    pub fn pasted(&self) -> Option<NodeId> {
        self.pasted
    }

    fn clone_source(&self, tree: &mut Tree) -> Result<NodeId, CommandError> {
        let copy = tree
            .deep_clone(self.source)
            .map_err(|source| CommandError::CloneFailed {
                node: self.source,
                source,
            })?;
        if self.resequence {
            tree.resequence(copy)?;
        }
        Ok(copy)
    }
}

impl Command for PasteNodeCommand {
    fn execute(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if self.executed {
            return Ok(());
        }
        let copy = match self.pasted {
            Some(copy) => copy,
            None => self.clone_source(tree)?,
        };
        self.pasted = Some(copy);

        tree.append_child(self.target, copy)?;
        tree.recompute_progress(copy)?;
        tree.refresh_progress_from(self.target)?;
        self.executed = true;
        debug!("Pasted {} as {} under {}", self.source, copy, self.target);
        tree.notify(TreeEvent::StructureChanged(self.target));
        Ok(())
    }

    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.executed {
            return Ok(());
        }
        let Some(copy) = self.pasted else {
            return Ok(());
        };
        tree.remove_child(self.target, copy)?;
        tree.refresh_progress_from(self.target)?;
        self.executed = false;
        debug!("Removed pasted {} from {}", copy, self.target);
        tree.notify(TreeEvent::StructureChanged(self.target));
        Ok(())
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn nodes(&self) -> Vec<NodeId> {
        [Some(self.target), Some(self.source), self.pasted]
            .into_iter()
            .flatten()
            .collect()
    }
}
