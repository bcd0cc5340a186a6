//! Engine-wide configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use framelens_camera::{CameraConfig, JitterConfig};
use framelens_classifier::ClassifierConfig;
use framelens_common::{
    config_file_path, load_or_default, read_json_config, write_json_config, FramelensResult,
    LoggingConfig,
};

/// All tunables of a [`FrameEngine`](crate::FrameEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub classifier: ClassifierConfig,
    pub camera: CameraConfig,
    pub jitter: JitterConfig,

    /// Minimum interval between debug summaries, in milliseconds.
    pub report_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            classifier: ClassifierConfig::default(),
            camera: CameraConfig::default(),
            jitter: JitterConfig::default(),
            report_interval_ms: 5_000,
        }
    }
}

impl EngineConfig {
    /// Load from the standard location, or defaults if missing or invalid.
    pub fn load() -> Self {
        load_or_default(&config_file_path())
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> FramelensResult<Self> {
        read_json_config(path)
    }

    /// Save to the standard location.
    pub fn save(&self) -> FramelensResult<()> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> FramelensResult<()> {
        write_json_config(path, self)
    }
}
