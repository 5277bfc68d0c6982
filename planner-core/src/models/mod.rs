//! Node model for portfolio hierarchies.
//!
//! # Levels
//!
//! A document is a [`Tree`] of six fixed levels, outermost first:
//! `Portfolio` → `Program` → `Project` → `Area` → `Capability` → `Feature`.
//! `Program` nests, and both `Portfolio` and `Program` may hold projects
//! directly. The remaining levels each accept exactly one child kind
//! (see [`crate::rules`]).
//!
//! # Level data
//!
//! - [`NodeData::Project`]: a short prefix code and the [`WorkPackage`]s
//!   that group its features.
//! - [`NodeData::Area`] / [`NodeData::Capability`]: owner initials.
//! - [`NodeData::Feature`]: a sequence id unique within the document and an
//!   ordered list of [`Milestone`]s.
//!
//! [`NodeSnapshot`] captures the editable part of any node for undoable edits.

mod node;
mod snapshot;
mod tree;

pub use node::*;
pub use snapshot::*;
pub use tree::*;
