//! Single-slot camera cache with hysteresis.
//!
//! Temporal consistency is the strongest signal that a pair is the real
//! camera and not a look-alike. Observations close to the cached pair earn a
//! stability bonus; anything scoring more than `hysteresis_margin` below the
//! cached score is ignored.

use serde::Serialize;

use framelens_frame_model::matrix::{abs_delta_sum, IDENTITY};
use framelens_frame_model::{DiscoveryMethod, Mat4};

use crate::config::CameraConfig;
use crate::locator::Located;
use crate::matrix_score::{canonicalize, derive_jitter, score_oriented};

/// The cached camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraCandidate {
    pub view: Mat4,
    pub proj: Mat4,
    pub jitter_x: f32,
    pub jitter_y: f32,
    /// Plausibility score of the pair, without stability bonus.
    pub score: f32,
    /// Frame the pair was observed in.
    pub frame: u64,
    pub method: DiscoveryMethod,
    pub valid: bool,
}

impl Default for CameraCandidate {
    fn default() -> Self {
        Self {
            view: IDENTITY,
            proj: IDENTITY,
            jitter_x: 0.0,
            jitter_y: 0.0,
            score: 0.0,
            frame: 0,
            method: DiscoveryMethod::default(),
            valid: false,
        }
    }
}

/// Diagnostic counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CameraStats {
    pub score: f32,
    /// Accepted updates since construction.
    pub updates: u64,
    pub rejected: u64,
    /// Frame of the cached observation.
    pub frame: u64,
}

#[derive(Debug)]
pub struct CameraCache {
    config: CameraConfig,
    current: CameraCandidate,
    updates: u64,
    rejected: u64,
    announced: bool,
}

impl CameraCache {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            current: CameraCandidate::default(),
            updates: 0,
            rejected: 0,
            announced: false,
        }
    }

    /// Offer an observation. Returns true if it replaced the cached camera.
    pub fn update(
        &mut self,
        view: &Mat4,
        proj: &Mat4,
        jitter_x: f32,
        jitter_y: f32,
        method: DiscoveryMethod,
        frame: u64,
    ) -> bool {
        let (score, orientation) = score_oriented(view, proj, self.config.world_scale);
        if score < self.config.accept_threshold {
            self.rejected += 1;
            tracing::trace!(score, method = ?method, "Camera candidate below threshold");
            return false;
        }
        let (view, proj) = canonicalize(view, proj, orientation);

        if self.current.valid {
            let adjusted = score + self.stability_bonus(&view, &proj);
            if adjusted < self.current.score - self.config.hysteresis_margin {
                self.rejected += 1;
                tracing::trace!(
                    score,
                    adjusted,
                    cached = self.current.score,
                    "Camera candidate inside hysteresis band"
                );
                return false;
            }
        }

        self.current = CameraCandidate {
            view,
            proj,
            jitter_x,
            jitter_y,
            score,
            frame,
            method,
            valid: true,
        };
        self.updates += 1;

        if !self.announced {
            self.announced = true;
            tracing::info!(score, frame, method = ?method, "Camera found");
        }
        true
    }

    /// Offer a located pair, deriving jitter from its projection.
    pub fn update_located(&mut self, located: &Located, frame: u64) -> bool {
        let (jx, jy) = derive_jitter(&located.hit.proj).unwrap_or((0.0, 0.0));
        self.update(
            &located.hit.view,
            &located.hit.proj,
            jx,
            jy,
            located.method,
            frame,
        )
    }

    /// Bonus for an observation close to the cached pair.
    pub fn stability_bonus(&self, view: &Mat4, proj: &Mat4) -> f32 {
        if !self.current.valid {
            return 0.0;
        }
        let delta = abs_delta_sum(view, &self.current.view) + abs_delta_sum(proj, &self.current.proj);
        if delta < self.config.stability_tight_delta {
            self.config.stability_tight_bonus
        } else if delta < self.config.stability_loose_delta {
            self.config.stability_loose_bonus
        } else {
            0.0
        }
    }

    pub fn snapshot(&self) -> CameraCandidate {
        self.current
    }

    pub fn is_valid(&self) -> bool {
        self.current.valid
    }

    pub fn stats(&self) -> CameraStats {
        CameraStats {
            score: self.current.score,
            updates: self.updates,
            rejected: self.rejected,
            frame: self.current.frame,
        }
    }

    /// Forget the cached camera. The next plausible observation is accepted as-is.
    pub fn invalidate(&mut self) {
        self.current.valid = false;
    }
}

impl Default for CameraCache {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}
