//! Command-line front end for the portfolio editor.
//!
//! The mutation engine lives in `planner_core`; this crate adds configuration,
//! tree rendering and the interactive shell.

pub mod config;
pub mod sample;
pub mod shell;
pub mod tree_render;
