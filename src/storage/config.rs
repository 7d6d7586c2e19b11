use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::embed::EmbedConfig;
use crate::image::ImageFormat;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Settings handed to each conversion
    pub fn embed_config(&self) -> EmbedConfig {
        EmbedConfig {
            max_file_size: self.general.max_file_size_bytes,
            allowed_formats: self.general.allowed_extensions.clone(),
        }
    }

    /// Minimum time between two copies
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.general.min_interval_ms)
    }
}

/// General configuration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Maximum image size in bytes (larger images are left as links)
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,

    /// Image extensions eligible for embedding
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<ImageFormat>,

    /// Minimum milliseconds between copies (0 disables the limit)
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,

    /// Vault root used when --vault is not given
    /// Defaults to the note's own folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_root: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            max_file_size_bytes: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
            min_interval_ms: default_min_interval_ms(),
            vault_root: None,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write a rotating log file in the data directory
    #[serde(default = "default_file_logging")]
    pub file_logging: bool,

    /// Minimum level written to the log file
    #[serde(default = "default_file_level")]
    pub file_level: String,

    /// Minimum level echoed to stderr
    #[serde(default = "default_stderr_level")]
    pub stderr_level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            file_logging: default_file_logging(),
            file_level: default_file_level(),
            stderr_level: default_stderr_level(),
        }
    }
}

// Default value functions for serde
fn default_max_file_size() -> u64 {
    10_485_760 // 10MB
}

fn default_allowed_extensions() -> Vec<ImageFormat> {
    ImageFormat::ALL.to_vec()
}

fn default_min_interval_ms() -> u64 {
    500
}

fn default_file_logging() -> bool {
    true
}

fn default_file_level() -> String {
    "info".to_string()
}

fn default_stderr_level() -> String {
    "warn".to_string()
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        use anyhow::Context;
        use std::fs;

        // If file doesn't exist, create default and return it
        if !self.path.exists() {
            log::info!(
                "Config file not found at {:?}, creating default configuration",
                self.path
            );
            self.create_default()?;
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::info!("Loaded configuration from {:?}", self.path);
        log::debug!(
            "Config: max_file_size_bytes={}, {} allowed extensions, min_interval_ms={}",
            config.general.max_file_size_bytes,
            config.general.allowed_extensions.len(),
            config.general.min_interval_ms
        );

        Ok(config)
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        use anyhow::Context;
        use std::fs;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../../mdembed.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::info!("Created default configuration at {:?}", self.path);

        Ok(())
    }
}
