//! Mutation engine for typed portfolio hierarchies.
//!
//! # Layers
//!
//! - [`models`]: the node arena ([`models::Tree`]), level data and
//!   [`models::NodeSnapshot`].
//! - [`rules`] and [`move_index`]: pure validity checks and index
//!   resolution for structural edits.
//! - [`commands`]: reversible operations over a tree.
//! - [`stack::CommandStack`]: bounded undo/redo histories.
//! - [`service::CommandExecutionService`]: the single entry point that keeps
//!   dirty and undo/redo state in sync with the stack.
//! - [`session::EditSession`]: one open document, validating requests and
//!   routing them through its service.
//!
//! Everything runs synchronously on the caller's thread; none of these types
//! are shared across threads.

pub mod commands;
pub mod error;
pub mod models;
pub mod move_index;
pub mod rules;
pub mod service;
pub mod session;
pub mod stack;

pub use error::{CommandError, EditError, TreeError};
pub use rules::HierarchyMode;
pub use service::{CommandExecutionService, EditorState};
pub use session::{Clipboard, ClipboardOrigin, DropPosition, EditSession};
pub use stack::{CommandStack, DEFAULT_UNDO_DEPTH};
