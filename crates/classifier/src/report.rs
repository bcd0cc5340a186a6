//! Diagnostic snapshot of the classifier state.

use std::fmt;

use serde::Serialize;

use framelens_frame_model::{PixelFormat, ResourceHandle, Role};

use crate::classifier::{BestPick, ClassifierStats};
use crate::store::Candidate;

/// Snapshot of every tracked role, suitable for logging or JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifierReport {
    pub frame: u64,
    pub expected_viewport: Option<(u32, u32)>,
    pub roles: Vec<RoleReport>,
    pub exposure: Option<ExposureReport>,
    pub stats: ClassifierStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoleReport {
    pub role: Role,
    pub candidates: usize,
    pub best: Option<BestPick>,
    /// Frames since the best pick was last registered.
    pub best_age: Option<u64>,
    /// Highest-scoring candidates, best first.
    pub top: Vec<Candidate>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExposureReport {
    pub handle: ResourceHandle,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub age: u64,
}

impl fmt::Display for ClassifierReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {}", self.frame)?;
        if let Some((w, h)) = self.expected_viewport {
            write!(f, " (viewport {w}x{h})")?;
        }
        writeln!(f)?;

        for role in &self.roles {
            write!(f, "  {:<14} {:>4} candidates", role.role.as_str(), role.candidates)?;
            match (&role.best, role.best_age) {
                (Some(best), Some(age)) => writeln!(
                    f,
                    ", best {} score {:.3} (seen {}x, age {})",
                    best.handle, best.score, best.seen_count, age
                )?,
                _ => writeln!(f, ", no best")?,
            }
            for c in &role.top {
                writeln!(
                    f,
                    "    {:<12} {:>5}x{:<5} {:<18} base {:.3} adj {:.3} seen {}",
                    c.handle.to_string(),
                    c.descriptor.width,
                    c.descriptor.height,
                    format!("{:?}", c.descriptor.format),
                    c.base_score,
                    c.adjusted_score,
                    c.seen_count
                )?;
            }
        }

        match &self.exposure {
            Some(e) => writeln!(
                f,
                "  exposure       {} {}x{} {:?} (age {})",
                e.handle, e.width, e.height, e.format, e.age
            )?,
            None => writeln!(f, "  exposure       none")?,
        }

        write!(
            f,
            "  registrations {}, duplicates {}, rejected {}, trims {}, evictions {}",
            self.stats.registrations,
            self.stats.duplicates,
            self.stats.rejected,
            self.stats.trims,
            self.stats.evictions
        )
    }
}
