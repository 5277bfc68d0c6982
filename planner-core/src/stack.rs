use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::commands::Command;
use crate::error::CommandError;
use crate::models::{NodeId, Tree};

/// Maximum number of commands retained in the undo history.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

/// Bounded undo history plus redo history.
///
/// Executing a fresh command clears the redo history; the undo history
/// drops its oldest entries once it grows past `max_depth`.
pub struct CommandStack {
    undo_history: VecDeque<Box<dyn Command>>,
    redo_history: Vec<Box<dyn Command>>,
    max_depth: usize,
    /// Commands discarded since the last [`CommandStack::take_dropped`].
    dropped: usize,
}

impl Default for CommandStack {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl CommandStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_history: VecDeque::new(),
            redo_history: Vec::new(),
            max_depth: max_depth.max(1),
            dropped: 0,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Run `command` and record it. A failing command is not recorded and
    /// leaves both histories untouched.
    pub fn execute(&mut self, mut command: Box<dyn Command>, tree: &mut Tree) -> Result<(), CommandError> {
        command.execute(tree)?;
        self.record(command);
        Ok(())
    }

    /// Record a command that has already been executed successfully.
    pub fn record(&mut self, command: Box<dyn Command>) {
        debug!("Executed '{}'", command.description());
        self.undo_history.push_back(command);
        self.dropped += self.redo_history.len();
        self.redo_history.clear();
        while self.undo_history.len() > self.max_depth {
            self.undo_history.pop_front();
            self.dropped += 1;
        }
    }

    pub fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        let Some(mut command) = self.undo_history.pop_back() else {
            return Ok(());
        };
        if let Err(err) = command.undo(tree) {
            self.undo_history.push_back(command);
            return Err(err);
        }
        debug!("Undid '{}'", command.description());
        self.redo_history.push(command);
        Ok(())
    }

    pub fn redo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        let Some(mut command) = self.redo_history.pop() else {
            return Ok(());
        };
        if let Err(err) = command.execute(tree) {
            self.redo_history.push(command);
            return Err(err);
        }
        debug!("Redid '{}'", command.description());
        self.undo_history.push_back(command);
        Ok(())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_history.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_history.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_history.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_history.len()
    }

    pub fn peek_undo_description(&self) -> Option<String> {
        self.undo_history.back().map(|c| c.description())
    }

    pub fn peek_redo_description(&self) -> Option<String> {
        self.redo_history.last().map(|c| c.description())
    }

    /// Nodes listed by any command still in either history.
    pub fn referenced_nodes(&self) -> HashSet<NodeId> {
        self.undo_history
            .iter()
            .chain(self.redo_history.iter())
            .flat_map(|c| c.nodes())
            .collect()
    }

    /// Number of commands discarded since the last call, resetting the count.
    pub fn take_dropped(&mut self) -> usize {
        std::mem::take(&mut self.dropped)
    }

    /// Drop both histories, e.g. when switching projects.
    pub fn clear(&mut self) {
        self.dropped += self.undo_history.len() + self.redo_history.len();
        self.undo_history.clear();
        self.redo_history.clear();
    }
}
