//! changewatch CLI library.
//!
//! Argument definitions and command handlers for the `changewatch` binary.

pub mod cli;
pub mod commands;
