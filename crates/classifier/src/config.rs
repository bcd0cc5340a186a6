//! Classifier tunables.
//!
//! The defaults were tuned against a small set of titles; none of them are
//! derivable from first principles, so all of them are overridable.

use serde::{Deserialize, Serialize};

/// Configuration for the resource classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum base score for a handle to be tracked for a role.
    pub min_role_score: f32,

    /// Width/height below this disqualify a resource for every tracked role.
    pub min_dimension: u32,

    /// Candidates not seen for longer than this many frames are evicted.
    pub stale_age_frames: u64,

    /// Best picks get `stale_age_frames * best_age_multiplier` before eviction.
    pub best_age_multiplier: u64,

    /// A best pick whose handle has not been seen for this many frames is dropped.
    pub best_retention_frames: u64,

    /// Collection size that triggers a batch trim.
    pub hard_cap: usize,

    /// Entries kept (highest adjusted score first) after a trim.
    pub retain_after_trim: usize,

    /// A challenger must beat the current best by more than this to take over.
    pub promote_margin: f32,

    /// Added to the hinted role's base score when the caller supplies a hint.
    pub role_hint_bonus: f32,

    /// Recency and frequency bonuses.
    pub bonus: BonusConfig,

    /// Matching against the expected viewport size.
    pub viewport: ViewportMatchConfig,
}

/// Bonuses layered on top of the structural base score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusConfig {
    /// A candidate seen within this many frames earns `recency_bonus`.
    pub recency_window_frames: u64,
    pub recency_bonus: f32,

    /// Upper bound of the observation-count bonus.
    pub max_frequency_bonus: f32,

    /// Observation count at which the frequency bonus saturates.
    pub frequency_saturation: u32,
}

/// Width/height ratio matching against the expected output viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportMatchConfig {
    /// Ratio tolerance for "same size" and for "uniform scale" agreement.
    pub tolerance: f32,

    /// Smallest uniform render scale still treated as an intermediate target.
    pub min_scale: f32,

    pub exact_bonus: f32,
    pub scaled_bonus: f32,
    pub mismatch_penalty: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            min_role_score: 0.5,
            min_dimension: 64,
            stale_age_frames: 120,
            best_age_multiplier: 2,
            best_retention_frames: 1200,
            hard_cap: 500,
            retain_after_trim: 200,
            promote_margin: 1e-3,
            role_hint_bonus: 0.15,
            bonus: BonusConfig::default(),
            viewport: ViewportMatchConfig::default(),
        }
    }
}

impl Default for BonusConfig {
    fn default() -> Self {
        Self {
            recency_window_frames: 3,
            recency_bonus: 0.15,
            max_frequency_bonus: 0.1,
            frequency_saturation: 30,
        }
    }
}

impl Default for ViewportMatchConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            min_scale: 0.33,
            exact_bonus: 0.2,
            scaled_bonus: 0.1,
            mismatch_penalty: 0.3,
        }
    }
}

impl ClassifierConfig {
    /// Age budget before a best pick's candidate entry is evicted.
    pub fn best_stale_age(&self) -> u64 {
        self.stale_age_frames
            .saturating_mul(self.best_age_multiplier.max(1))
    }
}
