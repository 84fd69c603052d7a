//! Application-wide error types.
//!
//! Library modules use specific error types via `thiserror` (most notably
//! [`MetadataError`]), while the binary uses `anyhow` at the top level.
//!
//! # Example
//!
//! ```ignore
//! use record_catalog::error::{Result, ResultExt};
//!
//! async fn open(url: &str) -> Result<SqlitePool> {
//!     init_db(url).await.with_context("opening metadata cache")
//! }
//! ```

use crate::config::ConfigError;
use crate::enrichment::MetadataError;

/// Application-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Database setup error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Metadata resolution error
    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Add context to an error.
    pub fn context(self, ctx: impl Into<String>) -> Self {
        Self::WithContext {
            context: ctx.into(),
            source: Box::new(self),
        }
    }

    /// The metadata failure underneath any context layers, if there is one.
    pub fn metadata_error(&self) -> Option<&MetadataError> {
        match self {
            Self::Metadata(e) => Some(e),
            Self::WithContext { source, .. } => source.metadata_error(),
            _ => None,
        }
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn with_context(self, ctx: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Io(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, sqlx::Error> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Database(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, MetadataError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Metadata(e).context(ctx))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, ConfigError> {
    fn with_context(self, ctx: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Config(e).context(ctx))
    }
}
