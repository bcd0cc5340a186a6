//! Per-frame sub-pixel jitter extraction.
//!
//! Three tiers, tried in order of trust:
//!
//! 1. **Pattern**: an explicit offset supplied by the caller.
//! 2. **CbvExtraction**: the offset terms of the current projection divided
//!    by its focal terms.
//! 3. **FrameDelta**: the change in those offset terms since the previous
//!    projection, divided by the current focal terms.
//!
//! A value is usable only if it is finite, strictly inside `(-1, 1)` on both
//! axes, and not `(0, 0)`. Usable values are checked against a moving
//! average and replaced by it when they deviate too far on either axis.

use serde::Serialize;

use framelens_frame_model::Mat4;

use crate::config::JitterConfig;
use crate::matrix_score::derive_jitter;

/// Which tier produced a sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JitterSource {
    #[default]
    None,
    Pattern,
    CbvExtraction,
    FrameDelta,
}

/// The jitter reported for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct JitterSample {
    pub x: f32,
    pub y: f32,
    pub source: JitterSource,
    pub valid: bool,
}

/// Signals available this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JitterInput {
    pub pattern: Option<(f32, f32)>,
    pub projection: Option<Mat4>,
}

#[derive(Debug, Clone)]
pub struct JitterEngine {
    config: JitterConfig,
    last: JitterSample,
    ema: Option<(f32, f32)>,
    previous_offsets: Option<(f32, f32)>,
    consecutive_invalid: u32,
    outliers: u64,
}

impl JitterEngine {
    pub fn new(config: JitterConfig) -> Self {
        Self {
            config,
            last: JitterSample::default(),
            ema: None,
            previous_offsets: None,
            consecutive_invalid: 0,
            outliers: 0,
        }
    }

    /// Run one frame.
    pub fn update(&mut self, input: JitterInput) -> JitterSample {
        let raw = self.extract(&input);

        if let Some(proj) = &input.projection {
            self.previous_offsets = Some((proj[8], proj[9]));
        }

        let Some((x, y, source)) = raw else {
            self.consecutive_invalid = self.consecutive_invalid.saturating_add(1);
            if self.consecutive_invalid == self.config.idle_frames {
                tracing::debug!(frames = self.consecutive_invalid, "Jitter idle");
            }
            self.last.valid = false;
            return self.last;
        };

        let (x, y) = self.reject_outlier(x, y);
        self.blend(x, y);

        if self.consecutive_invalid >= self.config.idle_frames {
            tracing::debug!(source = ?source, "Jitter resumed");
        }
        self.consecutive_invalid = 0;
        self.last = JitterSample {
            x,
            y,
            source,
            valid: true,
        };
        self.last
    }

    /// Most recent sample.
    pub fn last(&self) -> JitterSample {
        self.last
    }

    /// Current moving average, once a valid sample has been seen.
    pub fn ema(&self) -> Option<(f32, f32)> {
        self.ema
    }

    pub fn consecutive_invalid(&self) -> u32 {
        self.consecutive_invalid
    }

    /// True after `idle_frames` consecutive frames without usable jitter,
    /// e.g. a menu or cutscene rendered without temporal AA.
    pub fn is_idle(&self) -> bool {
        self.consecutive_invalid >= self.config.idle_frames
    }

    pub fn outliers(&self) -> u64 {
        self.outliers
    }

    /// Drop smoothing and frame-delta history.
    pub fn reset(&mut self) {
        self.last = JitterSample::default();
        self.ema = None;
        self.previous_offsets = None;
        self.consecutive_invalid = 0;
    }

    fn extract(&self, input: &JitterInput) -> Option<(f32, f32, JitterSource)> {
        if let Some((x, y)) = input.pattern.filter(|&(x, y)| is_usable(x, y)) {
            return Some((x, y, JitterSource::Pattern));
        }

        let proj = input.projection.as_ref()?;
        if let Some((x, y)) = derive_jitter(proj).filter(|&(x, y)| is_usable(x, y)) {
            return Some((x, y, JitterSource::CbvExtraction));
        }

        let (prev_x, prev_y) = self.previous_offsets?;
        if proj[0] == 0.0 || proj[5] == 0.0 {
            return None;
        }
        let x = (proj[8] - prev_x) / proj[0];
        let y = (proj[9] - prev_y) / proj[5];
        is_usable(x, y).then_some((x, y, JitterSource::FrameDelta))
    }

    fn reject_outlier(&mut self, x: f32, y: f32) -> (f32, f32) {
        let Some((ex, ey)) = self.ema else {
            return (x, y);
        };
        let threshold = self.config.outlier_threshold;
        if (x - ex).abs() > threshold || (y - ey).abs() > threshold {
            self.outliers += 1;
            tracing::trace!(x, y, ema_x = ex, ema_y = ey, "Jitter outlier replaced");
            (ex, ey)
        } else {
            (x, y)
        }
    }

    fn blend(&mut self, x: f32, y: f32) {
        let alpha = self.config.smoothing_factor;
        self.ema = Some(match self.ema {
            None => (x, y),
            Some((ex, ey)) => (ex + alpha * (x - ex), ey + alpha * (y - ey)),
        });
    }
}

impl Default for JitterEngine {
    fn default() -> Self {
        Self::new(JitterConfig::default())
    }
}

fn is_usable(x: f32, y: f32) -> bool {
    x.is_finite() && y.is_finite() && x.abs() < 1.0 && y.abs() < 1.0 && (x != 0.0 || y != 0.0)
}
