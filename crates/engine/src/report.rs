//! Engine-wide diagnostic report.

use std::fmt;

use serde::Serialize;

use framelens_camera::{CameraCandidate, CameraStats, JitterSample, LocatorStats};
use framelens_classifier::ClassifierReport;

/// Human-readable dump of every subsystem. Not a stable machine format.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReport {
    pub frame: u64,
    /// Wall-clock time the engine was created, RFC 3339.
    pub started_at: String,
    pub frames_per_second: Option<f64>,
    pub classifier: ClassifierReport,
    pub camera: CameraCandidate,
    pub camera_stats: CameraStats,
    pub locator: LocatorStats,
    pub jitter: JitterSample,
    pub jitter_idle: bool,
    pub jitter_outliers: u64,
}

impl fmt::Display for EngineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.frames_per_second {
            Some(fps) => writeln!(f, "=== FrameLens @ frame {} ({fps:.1} fps) ===", self.frame)?,
            None => writeln!(f, "=== FrameLens @ frame {} ===", self.frame)?,
        }
        writeln!(f, "started {}", self.started_at)?;
        writeln!(f, "{}", self.classifier)?;

        if self.camera.valid {
            writeln!(
                f,
                "camera: score {:.3} via {:?} at frame {} ({} updates, {} rejected)",
                self.camera.score,
                self.camera.method,
                self.camera.frame,
                self.camera_stats.updates,
                self.camera_stats.rejected
            )?;
            writeln!(
                f,
                "  position row [{:.2}, {:.2}, {:.2}], focal [{:.3}, {:.3}]",
                self.camera.view[12],
                self.camera.view[13],
                self.camera.view[14],
                self.camera.proj[0],
                self.camera.proj[5]
            )?;
        } else {
            writeln!(
                f,
                "camera: none ({} updates, {} rejected)",
                self.camera_stats.updates, self.camera_stats.rejected
            )?;
        }
        writeln!(
            f,
            "  lookups: {} cached, {} scans, {} tagged, {} misses",
            self.locator.cached_hits,
            self.locator.full_scans,
            self.locator.tagged_hits,
            self.locator.misses
        )?;

        write!(
            f,
            "jitter: ({:+.4}, {:+.4}) {:?}{}{}, {} outliers",
            self.jitter.x,
            self.jitter.y,
            self.jitter.source,
            if self.jitter.valid { "" } else { " (invalid)" },
            if self.jitter_idle { " idle" } else { "" },
            self.jitter_outliers
        )
    }
}
