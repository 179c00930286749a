//! CLI configuration loading and management.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wot_core::{DiscoveryConfig, LayoutConfig};

/// Full configuration for the `wot` CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WotConfig {
    /// Profile discovery limits.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Trust graph layout.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the data directory.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./wot-data")
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl WotConfig {
    /// Read `path`, or the defaults when no file exists yet.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))
    }

    /// Apply command-line overrides on top of the file.
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, log_level: Option<String>) -> Self {
        if let Some(data_dir) = data_dir {
            self.storage.data_dir = data_dir;
        }
        if let Some(level) = log_level {
            self.logging.level = level;
        }
        self
    }

    /// Check discovery and layout bounds and that the log level parses.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.discovery.validate()?;
        self.layout.validate()?;
        tracing_subscriber::EnvFilter::try_new(&self.logging.level)
            .with_context(|| format!("invalid log level '{}'", self.logging.level))?;
        Ok(())
    }

    /// RocksDB directory under the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.storage.data_dir.join("db")
    }
}
