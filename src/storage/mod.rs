pub mod config;

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use config::{Config, ConfigStorage, GeneralConfig, LoggingConfig, TomlConfigStorage};

/// Ensure XDG data and config directories exist
/// Returns (data_dir, config_dir)
///
/// XDG Base Directory Specification:
/// - Data: $XDG_DATA_HOME/mdembed (default: ~/.local/share/mdembed)
/// - Config: $XDG_CONFIG_HOME/mdembed (default: ~/.config/mdembed)
pub fn ensure_directories() -> Result<(PathBuf, PathBuf)> {
    let home = env::var("HOME").context("HOME environment variable not set")?;
    let home_path = PathBuf::from(home);

    let data_dir = if let Ok(xdg_data) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("mdembed")
    } else {
        home_path.join(".local/share/mdembed")
    };

    let config_dir = if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("mdembed")
    } else {
        home_path.join(".config/mdembed")
    };

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

    log::debug!("Data directory: {:?}", data_dir);
    log::debug!("Config directory: {:?}", config_dir);

    Ok((data_dir, config_dir))
}

/// Load `mdembed.toml` from `config_dir`, creating it if missing
/// Returns the config and the storage it was loaded from
pub fn load_config(config_dir: &Path) -> Result<(Config, TomlConfigStorage)> {
    let storage = TomlConfigStorage::new(config_dir.join("mdembed.toml"));
    let config = storage.load()?;
    Ok((config, storage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_uses_given_dir() {
        let dir = TempDir::new().unwrap();

        let (config, storage) = load_config(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(storage.path(), &dir.path().join("mdembed.toml"));
        assert!(storage.path().exists());
    }
}
