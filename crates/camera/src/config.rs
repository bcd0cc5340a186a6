//! Camera and jitter tunables.

use serde::{Deserialize, Serialize};

use framelens_common::{FramelensError, FramelensResult};

/// Configuration for camera discovery and caching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Matrix pairs scoring below this are never a camera.
    pub accept_threshold: f32,

    /// The scanner stops refining once its best hit reaches this score.
    pub fast_accept: f32,

    /// A new camera may score at most this much below the cached one.
    pub hysteresis_margin: f32,

    /// Aggregate delta under which the tight stability bonus applies.
    pub stability_tight_delta: f32,
    pub stability_tight_bonus: f32,

    /// Aggregate delta under which the loose stability bonus applies.
    pub stability_loose_delta: f32,
    pub stability_loose_bonus: f32,

    /// Largest plausible view translation component, in world units.
    pub world_scale: f32,

    /// Scan strides in bytes, coarsest first.
    pub scan_strides: Vec<usize>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            accept_threshold: 0.6,
            fast_accept: 0.6,
            hysteresis_margin: 0.1,
            stability_tight_delta: 0.1,
            stability_tight_bonus: 0.15,
            stability_loose_delta: 1.0,
            stability_loose_bonus: 0.05,
            world_scale: 10_000.0,
            scan_strides: vec![256, 64, 16, 4],
        }
    }
}

impl CameraConfig {
    /// Check a user-supplied stride ladder: word-aligned, coarsest first.
    ///
    /// The scanner itself tolerates bad ladders; this is for config edges
    /// that should tell the user instead.
    pub fn validate_strides(&self) -> FramelensResult<()> {
        if self.scan_strides.is_empty() {
            return Err(FramelensError::scan("stride ladder is empty"));
        }
        if let Some(bad) = self.scan_strides.iter().find(|&&s| s == 0 || s % 4 != 0) {
            return Err(FramelensError::scan(format!(
                "stride {bad} is not a positive multiple of 4"
            )));
        }
        if let Some(pair) = self.scan_strides.windows(2).find(|w| w[0] <= w[1]) {
            return Err(FramelensError::scan(format!(
                "strides must shrink pass to pass, got {} then {}",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }
}

/// Configuration for jitter smoothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JitterConfig {
    /// Per-axis deviation from the moving average that marks a sample as an outlier.
    pub outlier_threshold: f32,

    /// Weight of the newest sample in the moving average.
    pub smoothing_factor: f32,

    /// Consecutive invalid frames after which the engine reports idle.
    pub idle_frames: u32,
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            outlier_threshold: 0.5,
            smoothing_factor: 0.3,
            idle_frames: 30,
        }
    }
}
