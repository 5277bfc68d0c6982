use serde::Serialize;

use crate::commands::Command;
use crate::error::CommandError;
use crate::models::{NodeId, Tree};
use crate::stack::CommandStack;

/// UI-facing state refreshed after every execute, undo and redo.
///
/// Menu and status presentation read this; only
/// [`CommandExecutionService`] writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditorState {
    pub dirty: bool,
    pub undo_available: bool,
    pub redo_available: bool,
    /// Empty when nothing can be undone.
    pub next_undo_description: String,
    /// Empty when nothing can be redone.
    pub next_redo_description: String,
}

/// Single entry point for running commands against a document.
///
/// All execute/undo/redo calls for one document go through one instance so
/// the dirty flag and undo/redo affordances never drift from the stack.
#[derive(Default)]
pub struct CommandExecutionService {
    stack: CommandStack,
    state: EditorState,
}

impl CommandExecutionService {
    pub fn new(stack: CommandStack) -> Self {
        Self {
            stack,
            state: EditorState::default(),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn stack(&self) -> &CommandStack {
        &self.stack
    }

    /// Run and record `command`, then mark the document dirty.
    ///
    /// A failing command leaves the dirty flag as it was.
    pub fn execute(
        &mut self,
        command: impl Command + 'static,
        tree: &mut Tree,
    ) -> Result<(), CommandError> {
        self.execute_then(command, tree, |_| ())
    }

    /// Like [`execute`](Self::execute), returning what `read` takes from the
    /// command after it ran and before it is recorded.
    pub fn execute_then<C, R>(
        &mut self,
        mut command: C,
        tree: &mut Tree,
        read: impl FnOnce(&C) -> R,
    ) -> Result<R, CommandError>
    where
        C: Command + 'static,
    {
        if let Err(err) = command.execute(tree) {
            self.refresh();
            return Err(err);
        }
        let value = read(&command);
        self.stack.record(Box::new(command));
        self.state.dirty = true;
        self.refresh();
        Ok(value)
    }

    pub fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.stack.can_undo() {
            return Ok(());
        }
        let result = self.stack.undo(tree);
        if result.is_ok() {
            self.state.dirty = true;
        }
        self.refresh();
        result
    }

    pub fn redo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.stack.can_redo() {
            return Ok(());
        }
        let result = self.stack.redo(tree);
        if result.is_ok() {
            self.state.dirty = true;
        }
        self.refresh();
        result
    }

    /// Free detached nodes that no recorded command and none of `pinned`
    /// can reach. Only scans once the stack has discarded commands.
    pub fn sweep(&mut self, tree: &mut Tree, pinned: impl IntoIterator<Item = NodeId>) -> usize {
        if self.stack.take_dropped() == 0 {
            return 0;
        }
        let mut referenced = self.stack.referenced_nodes();
        referenced.extend(pinned);
        tree.purge_unreachable(&referenced)
    }

    /// Clear the dirty flag after the document was written out.
    pub fn mark_saved(&mut self) {
        self.state.dirty = false;
    }

    /// Forget all history and reset state, for project close or new.
    pub fn reset(&mut self) {
        self.stack.clear();
        self.state = EditorState::default();
    }

    fn refresh(&mut self) {
        self.state.undo_available = self.stack.can_undo();
        self.state.redo_available = self.stack.can_redo();
        self.state.next_undo_description = self.stack.peek_undo_description().unwrap_or_default();
        self.state.next_redo_description = self.stack.peek_redo_description().unwrap_or_default();
    }
}
