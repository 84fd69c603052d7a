//! Config file commands.

use std::path::{Path, PathBuf};

use crate::config::{self, Config, ConfigError};

/// Print the effective configuration as TOML
pub fn cmd_config_show(settings: &Config) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(settings)?);
    Ok(())
}

/// Write a default config file
pub fn cmd_config_init(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => config::config_path().ok_or(ConfigError::NoConfigDir)?,
    };

    if target.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", target.display());
    }

    match path {
        Some(p) => config::save_to(&Config::default(), p)?,
        None => config::save(&Config::default())?,
    }
    println!("Wrote default config to {}", target.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        cmd_config_init(Some(&path), false).unwrap();
        let loaded = config::load_from(&path);
        assert_eq!(loaded.cache.ttl_secs, Config::default().cache.ttl_secs);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\nttl_secs = 5\n").unwrap();

        assert!(cmd_config_init(Some(&path), false).is_err());
        assert_eq!(config::load_from(&path).cache.ttl_secs, 5);

        cmd_config_init(Some(&path), true).unwrap();
        assert_eq!(config::load_from(&path).cache.ttl_secs, 604_800);
    }
}
