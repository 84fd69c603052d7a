//! Configuration system using TOML files.
//!
//! Config is stored in the OS-standard config directory:
//! - Windows: %APPDATA%\record-catalog\config.toml
//! - macOS: ~/Library/Application Support/record-catalog/config.toml
//! - Linux: ~/.config/record-catalog/config.toml
//!
//! Every field has a default, so a missing or partial file is fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::SweeperConfig;
use crate::enrichment::ServiceConfig;
use crate::enrichment::musicbrainz::{self, MusicBrainzConfig};

/// Environment variable that overrides `provider.musicbrainz_url`
pub const MUSICBRAINZ_URL_ENV: &str = "MUSICBRAINZ_URL";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata cache settings
    pub cache: CacheConfig,

    /// External metadata provider settings
    pub provider: ProviderConfig,
}

/// Metadata cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// SQLite database file
    pub database: PathBuf,

    /// Lifetime of a cached release snapshot, in seconds
    pub ttl_secs: u64,

    /// How often the sweeper purges expired snapshots, in seconds
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(crate::db::DEFAULT_DB_NAME),
            ttl_secs: 7 * 24 * 60 * 60,
            sweep_interval_secs: 60 * 60,
        }
    }
}

/// MusicBrainz / Cover Art Archive settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub musicbrainz_url: String,

    pub coverart_url: String,

    /// MusicBrainz rejects requests without a descriptive User-Agent
    pub user_agent: String,

    /// Per-call timeout, in seconds
    pub timeout_secs: u64,

    /// Minimum spacing between MusicBrainz requests, in milliseconds
    pub min_request_interval_ms: u64,

    /// Lowest search score (0-100) accepted as a match
    pub min_score: u8,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            musicbrainz_url: musicbrainz::DEFAULT_BASE_URL.to_string(),
            coverart_url: crate::enrichment::coverart::DEFAULT_BASE_URL.to_string(),
            user_agent: musicbrainz::USER_AGENT.to_string(),
            timeout_secs: 10,
            min_request_interval_ms: 1000,
            min_score: 90,
        }
    }
}

impl Config {
    /// Reject settings that would make the cache or provider unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache.ttl_secs == 0 {
            return Err(ConfigError::Invalid("cache.ttl_secs must be positive".into()));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.sweep_interval_secs must be positive".into(),
            ));
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "provider.timeout_secs must be positive".into(),
            ));
        }
        if self.provider.min_score > 100 {
            return Err(ConfigError::Invalid(
                "provider.min_score must be between 0 and 100".into(),
            ));
        }
        if self.provider.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("provider.user_agent is required".into()));
        }
        Ok(())
    }

    /// Apply environment overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(MUSICBRAINZ_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!("Using MusicBrainz URL from {}", MUSICBRAINZ_URL_ENV);
                self.provider.musicbrainz_url = url;
            }
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            ttl: Duration::from_secs(self.cache.ttl_secs),
            provider_timeout: Duration::from_secs(self.provider.timeout_secs),
        }
    }

    pub fn sweeper_config(&self) -> SweeperConfig {
        SweeperConfig {
            sweep_interval: Duration::from_secs(self.cache.sweep_interval_secs),
        }
    }

    pub fn musicbrainz_config(&self) -> MusicBrainzConfig {
        MusicBrainzConfig {
            base_url: self.provider.musicbrainz_url.clone(),
            user_agent: self.provider.user_agent.clone(),
            timeout: Duration::from_secs(self.provider.timeout_secs),
            min_interval: Duration::from_millis(self.provider.min_request_interval_ms),
            min_score: u32::from(self.provider.min_score),
        }
    }
}

// ============================================================================
// Config File Operations
// ============================================================================

/// Get the config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("record-catalog"))
}

/// Get the full path to the config file
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Load configuration from the default location
///
/// Returns default config if file doesn't exist or can't be parsed.
/// Logs warnings but doesn't fail - we always return a usable config.
pub fn load() -> Config {
    match config_path() {
        Some(path) => load_from(&path),
        None => {
            tracing::warn!("Could not determine config directory, using defaults");
            Config::default()
        }
    }
}

/// Load configuration from a specific file, falling back to defaults.
pub fn load_from(path: &Path) -> Config {
    if !path.exists() {
        tracing::debug!("No config file found at {:?}, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::error!("Failed to parse config file {:?}: {}", path, e);
                tracing::warn!("Using default configuration");
                Config::default()
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file {:?}: {}", path, e);
            Config::default()
        }
    }
}

/// Save configuration to the default location
pub fn save(config: &Config) -> Result<(), ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    save_to(config, &path)
}

/// Save configuration to a specific file
///
/// Creates the parent directory if it doesn't exist.
pub fn save_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir(dir.to_path_buf(), e))?;
    }

    let contents = toml::to_string_pretty(config).map_err(ConfigError::Serialize)?;

    // Write atomically (write to temp, then rename)
    let temp_path = path.with_extension("toml.tmp");
    std::fs::write(&temp_path, &contents).map_err(|e| ConfigError::Write(temp_path.clone(), e))?;
    std::fs::rename(&temp_path, path)
        .map_err(|e| ConfigError::Rename(temp_path, path.to_path_buf(), e))?;

    tracing::info!("Saved config to {:?}", path);
    Ok(())
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to create config directory {0}: {1}")]
    CreateDir(PathBuf, std::io::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),

    #[error("Failed to write config to {0}: {1}")]
    Write(PathBuf, std::io::Error),

    #[error("Failed to rename temp file {0} to {1}: {2}")]
    Rename(PathBuf, PathBuf, std::io::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[provider]"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let toml = r#"
[cache]
ttl_secs = 60
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.cache.ttl_secs, 60);
        assert_eq!(config.cache.sweep_interval_secs, 3600);
        assert_eq!(config.cache.database, PathBuf::from("record_catalog.db"));
        assert_eq!(config.provider.timeout_secs, 10);
        assert_eq!(config.provider.min_score, 90);
        assert_eq!(config.provider.musicbrainz_url, "https://musicbrainz.org/ws/2");
    }

    #[test]
    fn test_validate_rejects_zero_ttl() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.provider.timeout_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_bad_score() {
        let mut config = Config::default();
        config.provider.min_score = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_derived_configs() {
        let mut config = Config::default();
        config.cache.ttl_secs = 120;
        config.provider.timeout_secs = 3;
        config.provider.min_request_interval_ms = 250;

        let service = config.service_config();
        assert_eq!(service.ttl, Duration::from_secs(120));
        assert_eq!(service.provider_timeout, Duration::from_secs(3));

        let mb = config.musicbrainz_config();
        assert_eq!(mb.min_interval, Duration::from_millis(250));
        assert_eq!(mb.min_score, 90);

        assert_eq!(config.sweeper_config().sweep_interval, Duration::from_secs(3600));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.cache.database = PathBuf::from("/var/lib/catalog.db");
        config.provider.min_score = 75;
        save_to(&config, &path).unwrap();

        let loaded = load_from(&path);
        assert_eq!(loaded.cache.database, PathBuf::from("/var/lib/catalog.db"));
        assert_eq!(loaded.provider.min_score, 75);
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_load_missing_or_broken_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let missing = load_from(&dir.path().join("absent.toml"));
        assert_eq!(missing.cache.ttl_secs, 604800);

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[cache\nttl_secs = ").unwrap();
        assert_eq!(load_from(&broken).cache.ttl_secs, 604800);
    }
}
