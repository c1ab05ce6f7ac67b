//! Application configuration loaded from `config.toml`.
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [engine]
//! max_results = 20
//!
//! [engine.sources.wikipedia]
//! rate_limit_per_sec = 2.0
//! max_results = 10
//! ```

use std::path::{Path, PathBuf};

use factryl_search::EngineConfig;
use serde::{Deserialize, Serialize};

use crate::error::{FactrylError, Result};

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is not set, e.g. `"info"` or
    /// `"factryl=debug,factryl_search=trace"`.
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub file_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "factryl=info,factryl_search=info".into(),
            file_dir: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactrylConfig {
    /// Aggregation engine settings, handed to the core unchanged.
    pub engine: EngineConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

impl FactrylConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// engine section fails validation.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| FactrylError::Config(e.to_string()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load from `path` when it exists, otherwise return the defaults.
    ///
    /// # Errors
    ///
    /// Same as [`FactrylConfig::from_file`] for an existing file.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| FactrylError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `<config dir>/factryl/config.toml`.
    pub fn default_config_path() -> PathBuf {
        crate::paths::config_dir().join("config.toml")
    }
}
