//! Record Catalog - resolves albums to MusicBrainz releases and caches their
//! track lists and cover art.
//!
//! Lookups go cache-first against a local SQLite database; only misses reach
//! MusicBrainz and the Cover Art Archive.

pub mod cache;
pub mod cli;
pub mod config;
pub mod db;
pub mod enrichment;
pub mod error;
#[cfg(test)]
pub mod test_utils;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Log directive used when RUST_LOG is unset
const DEFAULT_LOG_DIRECTIVE: &str = "record_catalog=info";

fn main() -> ExitCode {
    let args = cli::Cli::parse();

    // Initialize logging (stderr, so command output stays clean)
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(DEFAULT_LOG_DIRECTIVE))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli::run_command(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            cli::exit_code(&e)
        }
    }
}
