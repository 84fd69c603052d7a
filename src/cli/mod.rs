//! Command-line interface for record-catalog.
//!
//! Resolves releases, prints track lists and cover art, and maintains the
//! metadata cache.

mod commands;

pub use commands::{Cli, exit_code, run_command};
