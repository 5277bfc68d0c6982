use tracing::{debug, info, warn};

use crate::commands::{
    AddChildCommand, Command, DeleteNodeCommand, EditNodeCommand, MoveNodeCommand, PasteNodeCommand,
};
use crate::error::EditError;
use crate::models::{MilestoneStatus, NodeId, NodeKind, NodeSnapshot, Tree, TreeEvent};
use crate::rules::{self, HierarchyMode};
use crate::service::{CommandExecutionService, EditorState};
use crate::stack::CommandStack;

/// How a node was put on the clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOrigin {
    Copy,
    Cut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clipboard {
    pub node: NodeId,
    pub origin: ClipboardOrigin,
}

/// Where a dragged node is dropped relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropPosition {
    Before,
    After,
    /// Append as the target's last child.
    Into,
}

/// One open document with its command history.
///
/// Every structural request is validated against [`rules`] here, before a
/// command is built; every mutation then flows through the session's
/// [`CommandExecutionService`].
pub struct EditSession {
    tree: Tree,
    commands: CommandExecutionService,
    mode: HierarchyMode,
    clipboard: Option<Clipboard>,
}

impl EditSession {
    pub fn new(tree: Tree, mode: HierarchyMode, undo_depth: usize) -> Self {
        Self {
            tree,
            commands: CommandExecutionService::new(CommandStack::new(undo_depth)),
            mode,
            clipboard: None,
        }
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn state(&self) -> &EditorState {
        self.commands.state()
    }

    pub fn commands(&self) -> &CommandExecutionService {
        &self.commands
    }

    pub fn mode(&self) -> HierarchyMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: HierarchyMode) {
        self.mode = mode;
    }

    pub fn clipboard(&self) -> Option<Clipboard> {
        self.clipboard
    }

    /// Swap in another document, dropping history and clipboard.
    pub fn replace_tree(&mut self, tree: Tree) -> Tree {
        self.commands.reset();
        self.clipboard = None;
        std::mem::replace(&mut self.tree, tree)
    }

    pub fn mark_saved(&mut self) {
        self.commands.mark_saved();
    }

    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.tree.drain_events()
    }

    // ============================================================
    // Structural edits
    // ============================================================

    pub fn add_child(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        name: impl Into<String>,
    ) -> Result<NodeId, EditError> {
        let parent_kind = self.tree.node(parent)?.kind();
        if !rules::hierarchy_accepts(&self.tree, parent, kind, self.mode) {
            return Err(EditError::IllegalChild {
                parent: parent_kind,
                child: kind,
            });
        }
        let child = self.tree.create_node(kind, name);
        let command = AddChildCommand::new(&self.tree, parent, child);
        self.run(command)?;
        Ok(child)
    }

    /// Delete `node`. Returns `false` for the root, which is protected.
    pub fn delete(&mut self, node: NodeId) -> Result<bool, EditError> {
        self.tree.node(node)?;
        if self.tree.parent(node).is_none() {
            warn!("Ignoring delete of root node");
            return Ok(false);
        }
        let command = DeleteNodeCommand::new(&self.tree, node);
        self.run(command)?;
        Ok(true)
    }

    /// Move `node` to the end of `new_parent`'s children.
    pub fn reparent(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), EditError> {
        if !rules::is_valid_reparent(&self.tree, node, new_parent, self.mode) {
            return Err(EditError::InvalidReparent {
                node,
                target: new_parent,
            });
        }
        let command = MoveNodeCommand::new(&self.tree, node, new_parent, None);
        self.run(command)?;
        Ok(())
    }

    /// Resolve a drag-and-drop of `dragged` onto `target`.
    pub fn drop_node(
        &mut self,
        dragged: NodeId,
        target: NodeId,
        position: DropPosition,
    ) -> Result<(), EditError> {
        let invalid = EditError::InvalidSiblingInsert {
            node: dragged,
            reference: target,
        };
        let (parent, reference_index) = match position {
            DropPosition::Into => return self.reparent(dragged, target),
            DropPosition::Before | DropPosition::After => {
                if !rules::can_insert_sibling(&self.tree, dragged, target, self.mode) {
                    return Err(invalid);
                }
                let Some(parent) = self.tree.parent(target) else {
                    return Err(invalid);
                };
                let Some(index) = self.tree.index_of(parent, target) else {
                    return Err(invalid);
                };
                (parent, index)
            }
        };

        let mut index = match position {
            DropPosition::After => reference_index + 1,
            _ => reference_index,
        };
        // The tentative index counts the dragged node when it sits earlier
        // in the same list; removal shifts everything after it down by one.
        if let Some(current) = self.tree.index_of(parent, dragged) {
            if current < index {
                index -= 1;
            }
        }

        let command = MoveNodeCommand::new(&self.tree, dragged, parent, Some(index as isize));
        self.run(command)?;
        Ok(())
    }

    // ============================================================
    // Clipboard
    // ============================================================

    pub fn copy(&mut self, node: NodeId) -> Result<(), EditError> {
        self.tree.node(node)?;
        self.clipboard = Some(Clipboard {
            node,
            origin: ClipboardOrigin::Copy,
        });
        Ok(())
    }

    /// Delete `node` and keep it on the clipboard. Cutting the root does nothing.
    pub fn cut(&mut self, node: NodeId) -> Result<bool, EditError> {
        if !self.delete(node)? {
            return Ok(false);
        }
        self.clipboard = Some(Clipboard {
            node,
            origin: ClipboardOrigin::Cut,
        });
        Ok(true)
    }

    /// Paste the clipboard under `target`, returning the pasted copy.
    ///
    /// The first paste after a cut keeps sequence ids so the moved features
    /// keep their identity; every other paste resequences.
    pub fn paste(&mut self, target: NodeId) -> Result<NodeId, EditError> {
        let clipboard = self.clipboard.ok_or(EditError::EmptyClipboard)?;
        let target_kind = self.tree.node(target)?.kind();
        let source_kind = self.tree.node(clipboard.node)?.kind();
        if !rules::hierarchy_accepts(&self.tree, target, source_kind, self.mode) {
            return Err(EditError::IllegalChild {
                parent: target_kind,
                child: source_kind,
            });
        }

        let resequence =
            clipboard.origin == ClipboardOrigin::Copy || self.shares_sequence_ids(clipboard.node);
        let command = PasteNodeCommand::new(&self.tree, target, clipboard.node, resequence);
        let pasted = self.run_then(command, PasteNodeCommand::pasted)?;
        self.clipboard = Some(Clipboard {
            node: clipboard.node,
            origin: ClipboardOrigin::Copy,
        });

        let pasted = pasted.ok_or(EditError::PasteIncomplete(clipboard.node))?;
        info!("Pasted {} under {}", pasted, target);
        Ok(pasted)
    }

    /// Whether any feature under `source` carries a sequence id already used
    /// in the tree, as when a cut was undone before pasting.
    fn shares_sequence_ids(&self, source: NodeId) -> bool {
        let taken = self.tree.sequence_ids();
        self.tree
            .features_in(source)
            .into_iter()
            .filter_map(|f| self.tree.get(f).and_then(|n| n.sequence_id()))
            .any(|id| taken.contains(&id))
    }

    // ============================================================
    // Property edits
    // ============================================================

    /// Apply `after` to `node` as one undoable edit.
    ///
    /// Returns `false` without touching history when nothing changed.
    pub fn edit(&mut self, node: NodeId, after: NodeSnapshot) -> Result<bool, EditError> {
        let before = NodeSnapshot::capture(&self.tree, node)?;
        if before.is_unchanged_from(&after) {
            return Ok(false);
        }
        let command = EditNodeCommand::new(node, before, after);
        self.run(command)?;
        Ok(true)
    }

    pub fn rename(&mut self, node: NodeId, name: impl Into<String>) -> Result<bool, EditError> {
        let after = NodeSnapshot::capture(&self.tree, node)?.with_name(name);
        self.edit(node, after)
    }

    pub fn set_milestone_status(
        &mut self,
        feature: NodeId,
        index: usize,
        status: MilestoneStatus,
    ) -> Result<bool, EditError> {
        let node = self.tree.node(feature)?;
        if node.kind() != NodeKind::Feature {
            return Err(EditError::NotAFeature(feature));
        }
        if index >= node.milestones().len() {
            return Err(EditError::NoSuchMilestone {
                node: feature,
                index,
            });
        }
        let after = NodeSnapshot::capture(&self.tree, feature)?.with_milestone_status(index, status);
        self.edit(feature, after)
    }

    /// Put `feature` into the named work package of its project, or into none.
    pub fn assign_work_package(
        &mut self,
        feature: NodeId,
        work_package: Option<&str>,
    ) -> Result<bool, EditError> {
        if self.tree.node(feature)?.kind() != NodeKind::Feature {
            return Err(EditError::NotAFeature(feature));
        }
        if let Some(name) = work_package {
            let known = self
                .tree
                .owning_project(feature)
                .and_then(|p| self.tree.get(p))
                .is_some_and(|p| p.work_packages().iter().any(|wp| wp.name == name));
            if !known {
                return Err(EditError::NoSuchWorkPackage(name.to_string()));
            }
        }
        let after = NodeSnapshot::capture(&self.tree, feature)?.with_work_package(work_package);
        self.edit(feature, after)
    }

    // ============================================================
    // History
    // ============================================================

    fn run(&mut self, command: impl Command + 'static) -> Result<(), EditError> {
        self.run_then(command, |_| ())
    }

    /// Execute through the service, then free nodes the history let go of.
    fn run_then<C, R>(&mut self, command: C, read: impl FnOnce(&C) -> R) -> Result<R, EditError>
    where
        C: Command + 'static,
    {
        let value = self.commands.execute_then(command, &mut self.tree, read)?;
        let pinned = self.clipboard.map(|c| c.node);
        let freed = self.commands.sweep(&mut self.tree, pinned);
        if freed > 0 {
            debug!("Freed {} unreachable nodes", freed);
        }
        Ok(value)
    }

    pub fn undo(&mut self) -> Result<(), EditError> {
        self.commands.undo(&mut self.tree)?;
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), EditError> {
        self.commands.redo(&mut self.tree)?;
        Ok(())
    }
}
