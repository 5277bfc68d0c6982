//! Line-oriented editing shell over an [`EditSession`].
//!
//! Each input line is parsed with clap as if it were a command line. Nodes are
//! addressed by their preorder number as printed by `tree`.

use std::io::{BufRead, Write};

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use planner_core::models::{MilestoneStatus, NodeId, NodeKind, NodeSnapshot};
use planner_core::{DropPosition, EditSession};

use crate::tree_render::render_numbered;

#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    /// Print the tree with node numbers
    Tree,
    /// Show the editable fields of a node
    Show { node: usize },
    /// Add a child under a node
    Add {
        parent: usize,
        #[arg(value_parser = parse_kind)]
        kind: NodeKind,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Delete a node and its subtree
    Rm { node: usize },
    /// Move a node before, after or into a target
    Mv {
        node: usize,
        target: usize,
        #[arg(value_enum, default_value = "into")]
        position: Placement,
    },
    /// Rename a node
    Rename {
        node: usize,
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// Set the status of a feature milestone
    Status {
        node: usize,
        milestone: usize,
        #[arg(value_parser = parse_status)]
        status: MilestoneStatus,
    },
    /// Put a feature into a work package ("-" for none)
    Assign { node: usize, work_package: String },
    /// Copy a node to the clipboard
    Copy { node: usize },
    /// Cut a node to the clipboard
    Cut { node: usize },
    /// Paste the clipboard under a node
    Paste { target: usize },
    /// Undo the last command
    Undo,
    /// Redo the last undone command
    Redo,
    /// Show dirty flag and undo/redo availability
    State,
    /// Mark the document as saved
    Save,
    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Before,
    After,
    Into,
}

impl From<Placement> for DropPosition {
    fn from(placement: Placement) -> Self {
        match placement {
            Placement::Before => DropPosition::Before,
            Placement::After => DropPosition::After,
            Placement::Into => DropPosition::Into,
        }
    }
}

fn parse_kind(s: &str) -> Result<NodeKind, String> {
    NodeKind::from_str(&s.to_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = NodeKind::ALL.iter().map(|k| k.as_str()).collect();
        format!("unknown kind '{}' (expected one of {})", s, known.join(", "))
    })
}

fn parse_status(s: &str) -> Result<MilestoneStatus, String> {
    MilestoneStatus::from_str(&s.to_lowercase())
        .ok_or_else(|| format!("unknown status '{}' (expected not_started, in_progress or done)", s))
}

/// Result of running one shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

pub struct Shell {
    session: EditSession,
}

impl Shell {
    pub fn new(session: EditSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Read lines from `input` until EOF or `quit`, writing replies to `output`.
    ///
    /// Errors from individual lines are printed and the loop continues.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<()> {
        write!(output, "> ").context("Failed to write prompt")?;
        output.flush().context("Failed to flush output")?;

        for line in input.lines() {
            let line = line.context("Failed to read input")?;
            match self.run_line(&line) {
                Ok(Outcome::Quit) => break,
                Ok(Outcome::Continue(reply)) => {
                    if !reply.is_empty() {
                        writeln!(output, "{}", reply.trim_end()).context("Failed to write reply")?;
                    }
                }
                Err(e) => {
                    writeln!(output, "error: {:#}", e).context("Failed to write reply")?;
                }
            }
            write!(output, "> ").context("Failed to write prompt")?;
            output.flush().context("Failed to flush output")?;
        }

        writeln!(output).context("Failed to write output")?;
        Ok(())
    }

    /// Parse and run a single line.
    pub fn run_line(&mut self, line: &str) -> Result<Outcome> {
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.is_empty() {
            return Ok(Outcome::Continue(String::new()));
        }

        let command = match ShellLine::try_parse_from(words) {
            Ok(parsed) => parsed.command,
            // Help output and usage errors both come back as clap errors
            Err(e) => return Ok(Outcome::Continue(e.render().to_string())),
        };

        self.dispatch(command)
    }

    fn dispatch(&mut self, command: ShellCommand) -> Result<Outcome> {
        let reply = match command {
            ShellCommand::Tree => render_numbered(self.session.tree()),
            ShellCommand::Show { node } => {
                let id = self.resolve(node)?;
                let tree = self.session.tree();
                let snapshot = NodeSnapshot::capture(tree, id)?;
                let node = tree.node(id)?;
                let mut reply = format!(
                    "{} ({}, progress {:.0}%)\n",
                    node.name,
                    node.kind(),
                    node.progress * 100.0
                );
                reply.push_str(
                    &serde_json::to_string_pretty(&snapshot.fields)
                        .context("Failed to serialize node")?,
                );
                for (i, milestone) in node.milestones().iter().enumerate() {
                    reply.push_str(&format!("\n  [{}] {}: {}", i, milestone.name, milestone.status.as_str()));
                }
                reply
            }
            ShellCommand::Add { parent, kind, name } => {
                let parent = self.resolve(parent)?;
                let name = name.join(" ");
                let id = self.session.add_child(parent, kind, name.as_str())?;
                format!("Added {} '{}' as #{}", kind, name, self.number_of(id)?)
            }
            ShellCommand::Rm { node } => {
                let id = self.resolve(node)?;
                if self.session.delete(id)? {
                    "Deleted".to_string()
                } else {
                    "The root cannot be deleted".to_string()
                }
            }
            ShellCommand::Mv {
                node,
                target,
                position,
            } => {
                let dragged = self.resolve(node)?;
                let target = self.resolve(target)?;
                self.session.drop_node(dragged, target, position.into())?;
                format!("Moved to #{}", self.number_of(dragged)?)
            }
            ShellCommand::Rename { node, name } => {
                let id = self.resolve(node)?;
                if self.session.rename(id, name.join(" "))? {
                    "Renamed".to_string()
                } else {
                    "Nothing changed".to_string()
                }
            }
            ShellCommand::Status {
                node,
                milestone,
                status,
            } => {
                let id = self.resolve(node)?;
                self.session.set_milestone_status(id, milestone, status)?;
                let progress = self.session.tree().node(id)?.progress;
                format!("Progress {:.0}%", progress * 100.0)
            }
            ShellCommand::Assign { node, work_package } => {
                let id = self.resolve(node)?;
                let target = match work_package.as_str() {
                    "-" => None,
                    name => Some(name),
                };
                if self.session.assign_work_package(id, target)? {
                    "Assigned".to_string()
                } else {
                    "Nothing changed".to_string()
                }
            }
            ShellCommand::Copy { node } => {
                let id = self.resolve(node)?;
                self.session.copy(id)?;
                "Copied".to_string()
            }
            ShellCommand::Cut { node } => {
                let id = self.resolve(node)?;
                if self.session.cut(id)? {
                    "Cut".to_string()
                } else {
                    "The root cannot be cut".to_string()
                }
            }
            ShellCommand::Paste { target } => {
                let target = self.resolve(target)?;
                let pasted = self.session.paste(target)?;
                format!("Pasted as #{}", self.number_of(pasted)?)
            }
            ShellCommand::Undo => {
                let description = self.session.state().next_undo_description.clone();
                if description.is_empty() {
                    "Nothing to undo".to_string()
                } else {
                    self.session.undo()?;
                    format!("Undid: {}", description)
                }
            }
            ShellCommand::Redo => {
                let description = self.session.state().next_redo_description.clone();
                if description.is_empty() {
                    "Nothing to redo".to_string()
                } else {
                    self.session.redo()?;
                    format!("Redid: {}", description)
                }
            }
            ShellCommand::State => {
                let state = self.session.state();
                format!(
                    "dirty: {}\nundo: {}\nredo: {}",
                    if state.dirty { "yes" } else { "no" },
                    or_dash(&state.next_undo_description),
                    or_dash(&state.next_redo_description),
                )
            }
            ShellCommand::Save => {
                self.session.mark_saved();
                "Saved".to_string()
            }
            ShellCommand::Quit => return Ok(Outcome::Quit),
        };

        for event in self.session.drain_events() {
            tracing::debug!(?event, "Tree changed");
        }

        Ok(Outcome::Continue(reply))
    }

    /// Map a preorder number to the node it currently denotes.
    fn resolve(&self, number: usize) -> Result<NodeId> {
        let tree = self.session.tree();
        tree.descendants(tree.root())
            .get(number)
            .copied()
            .ok_or_else(|| anyhow!("No node #{}", number))
    }

    fn number_of(&self, id: NodeId) -> Result<usize> {
        let tree = self.session.tree();
        tree.descendants(tree.root())
            .iter()
            .position(|n| *n == id)
            .ok_or_else(|| anyhow!("Node is not in the tree"))
    }
}

fn or_dash(description: &str) -> &str {
    if description.is_empty() {
        "-"
    } else {
        description
    }
}
