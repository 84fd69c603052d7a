//! CLI command definitions and dispatch.
//!
//! Each group of subcommands lives in its own submodule:
//! - `lookup`: Release resolution, track lists and cover art
//! - `cache`: Cache maintenance (purge, stats, background sweep)
//! - `settings`: Config file inspection and creation

mod cache;
mod lookup;
mod settings;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::runtime::Runtime;

use crate::cache::SqliteSnapshotStore;
use crate::config::{self, Config};
use crate::db;
use crate::enrichment::{MetadataError, MetadataService, MusicBrainzProvider};
use crate::error::{Error, Result, ResultExt};

pub use cache::{cmd_purge, cmd_stats, cmd_sweep};
pub use lookup::{cmd_cover, cmd_resolve, cmd_tracks};
pub use settings::{cmd_config_init, cmd_config_show};

/// Record Catalog CLI
#[derive(Parser, Debug)]
#[command(author, version, about = "Resolve and cache MusicBrainz release metadata", long_about = None)]
pub struct Cli {
    /// Cache database path (overrides the config file)
    #[arg(long, global = true, env = "RECORD_CATALOG_DB")]
    pub db: Option<PathBuf>,

    /// Config file path (defaults to the OS config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for lookup commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve an artist/album pair to a MusicBrainz release ID
    Resolve {
        /// Artist name
        #[arg(short, long)]
        artist: String,
        /// Album title
        #[arg(short = 'l', long)]
        album: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the track list of a release
    Tracks {
        /// MusicBrainz release ID
        mbid: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the front cover of a release
    Cover {
        /// MusicBrainz release ID
        mbid: String,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Delete expired cache entries
    Purge,
    /// Show cache statistics
    Stats,
    /// Purge expired entries periodically until interrupted
    Sweep,
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write a config file with default settings
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the specified CLI command.
pub fn run_command(cli: &Cli) -> anyhow::Result<()> {
    // Config commands never touch the cache or the network
    if let Commands::Config { action } = &cli.command {
        return match action {
            ConfigAction::Show => cmd_config_show(&load_settings(cli)?),
            ConfigAction::Init { force } => cmd_config_init(cli.config.as_deref(), *force),
        };
    }

    let settings = load_settings(cli)?;
    let rt = Runtime::new()?;

    match &cli.command {
        Commands::Resolve {
            artist,
            album,
            format,
        } => cmd_resolve(&rt, &settings, artist, album, *format),
        Commands::Tracks { mbid, format } => cmd_tracks(&rt, &settings, mbid, *format),
        Commands::Cover { mbid, format } => cmd_cover(&rt, &settings, mbid, *format),
        Commands::Purge => cmd_purge(&rt, &settings),
        Commands::Stats => cmd_stats(&rt, &settings),
        Commands::Sweep => cmd_sweep(&rt, &settings),
        Commands::Config { .. } => Ok(()),
    }
}

/// Process exit status for a failed command.
pub fn exit_code(err: &anyhow::Error) -> ExitCode {
    ExitCode::from(exit_status(err))
}

/// 2 for bad input, 3 for cache or provider trouble worth retrying, 1 otherwise.
fn exit_status(err: &anyhow::Error) -> u8 {
    let metadata = err.chain().find_map(|cause| {
        cause
            .downcast_ref::<MetadataError>()
            .or_else(|| cause.downcast_ref::<Error>().and_then(Error::metadata_error))
    });

    match metadata {
        Some(e) if e.is_client_error() => 2,
        Some(e) if e.is_transient() => 3,
        _ => 1,
    }
}

// ============================================================================
// Shared helper functions
// ============================================================================

/// Load the config file, then layer environment and flag overrides on top.
pub(crate) fn load_settings(cli: &Cli) -> anyhow::Result<Config> {
    let mut settings = match &cli.config {
        Some(path) => config::load_from(path),
        None => config::load(),
    };
    settings.apply_env();
    if let Some(db) = &cli.db {
        settings.cache.database = db.clone();
    }
    settings.validate()?;
    Ok(settings)
}

/// Open (and migrate) the cache database.
pub(crate) async fn open_store(settings: &Config) -> Result<SqliteSnapshotStore> {
    let url = db::db_url(Some(&settings.cache.database));
    let pool = db::init_db(&url)
        .await
        .with_context(format!("opening cache at {}", settings.cache.database.display()))?;
    Ok(SqliteSnapshotStore::new(pool))
}

/// Wire the store and the MusicBrainz provider into a service.
pub(crate) fn build_service(settings: &Config, store: SqliteSnapshotStore) -> Result<MetadataService> {
    let provider = MusicBrainzProvider::from_config(
        settings.musicbrainz_config(),
        &settings.provider.coverart_url,
    )
    .with_context("building metadata provider")?;

    Ok(MetadataService::new(
        Arc::new(store),
        Arc::new(provider),
        settings.service_config(),
    ))
}
