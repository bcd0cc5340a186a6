//! Configuration file plumbing.
//!
//! Each crate owns the config struct for its own tunables; this module only
//! provides the shared logging section and the JSON load/save helpers the
//! engine-level config is built on.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{FramelensError, FramelensResult};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FRAMELENS_CONFIG";

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "framelens=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Standard config file location.
///
/// `$FRAMELENS_CONFIG` wins; otherwise `$XDG_CONFIG_HOME/framelens/config.json`
/// with the usual `~/.config` fallback.
pub fn config_file_path() -> PathBuf {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(explicit);
    }
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("framelens").join("config.json")
}

/// Read and parse a JSON config file.
pub fn read_json_config<T: DeserializeOwned>(path: &Path) -> FramelensResult<T> {
    if !path.exists() {
        return Err(FramelensError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content)
        .map_err(|e| FramelensError::config(format!("{}: {e}", path.display())))
}

/// Load a config file, falling back to defaults when it is missing or broken.
pub fn load_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    match read_json_config(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Failed to load config at {:?}: {}", path, e);
            T::default()
        }
    }
}

/// Write a config as pretty JSON, creating parent directories.
pub fn write_json_config<T: Serialize>(path: &Path, config: &T) -> FramelensResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}
