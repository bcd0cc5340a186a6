//! Strided search for camera matrix pairs in raw memory.
//!
//! A candidate is 32 consecutive `f32`s: a view matrix followed by its
//! projection. The scanner walks the source with a coarse-to-fine stride
//! ladder and stops refining as soon as a pass produces a hit at or above
//! the fast-accept score. Each finer pass skips offsets a coarser pass
//! already evaluated.
//!
//! Every read is preceded by a region lookup. Unreadable regions are jumped
//! over to the next region boundary, re-aligned to the current stride.

use serde::Serialize;

use framelens_frame_model::Mat4;

use crate::config::CameraConfig;
use crate::matrix_score::{canonicalize, score_oriented, Orientation};
use crate::memory::MemorySource;

const MATRIX_BYTES: usize = 16 * std::mem::size_of::<f32>();

/// Bytes occupied by one view/projection pair.
pub const PAIR_BYTES: usize = 2 * MATRIX_BYTES;

/// Best camera pair found in a source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScanHit {
    /// View matrix in canonical row-major layout.
    pub view: Mat4,
    /// Projection matrix in canonical row-major layout.
    pub proj: Mat4,
    pub score: f32,
    /// Byte offset of the view matrix.
    pub offset: usize,
    /// Layout the pair was stored in.
    pub orientation: Orientation,
}

/// Work done by one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Offsets scored.
    pub offsets_visited: u64,
    /// Stride passes run.
    pub passes: u32,
    /// Unreadable regions jumped over.
    pub regions_skipped: u64,
}

/// Multi-stride camera scanner.
#[derive(Debug, Clone)]
pub struct MemoryScanner {
    strides: Vec<usize>,
    fast_accept: f32,
    accept_threshold: f32,
    world_scale: f32,
}

impl MemoryScanner {
    pub fn new(config: &CameraConfig) -> Self {
        let mut strides: Vec<usize> = config
            .scan_strides
            .iter()
            .copied()
            .filter(|&s| s > 0)
            .collect();
        if strides.is_empty() {
            strides.push(4);
        }
        Self {
            strides,
            fast_accept: config.fast_accept,
            accept_threshold: config.accept_threshold,
            world_scale: config.world_scale,
        }
    }

    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Best plausible camera in `source`, if any clears the acceptance threshold.
    pub fn find_best_camera(&self, source: &dyn MemorySource) -> Option<ScanHit> {
        self.scan(source).0
    }

    /// Like [`find_best_camera`](Self::find_best_camera), also returning scan statistics.
    pub fn scan(&self, source: &dyn MemorySource) -> (Option<ScanHit>, ScanStats) {
        let mut stats = ScanStats::default();
        let mut best: Option<ScanHit> = None;

        for (pass, &stride) in self.strides.iter().enumerate() {
            let coarser = &self.strides[..pass];
            stats.passes += 1;

            let mut offset = 0usize;
            while offset.saturating_add(PAIR_BYTES) <= source.len() {
                if coarser.iter().any(|&c| offset % c == 0) {
                    offset += stride;
                    continue;
                }

                let Some(region) = source.region_at(offset) else {
                    break;
                };
                if !region.readable {
                    stats.regions_skipped += 1;
                    offset = align_up(region.end.max(offset + 1), stride);
                    continue;
                }

                if let Some(hit) = self.score_at(source, offset) {
                    stats.offsets_visited += 1;
                    if best.map_or(true, |b| hit.score > b.score) {
                        best = Some(hit);
                    }
                }
                offset += stride;
            }

            if best.is_some_and(|b| b.score >= self.fast_accept) {
                break;
            }
        }

        let best = best.filter(|b| b.score >= self.accept_threshold);
        tracing::trace!(
            passes = stats.passes,
            visited = stats.offsets_visited,
            skipped = stats.regions_skipped,
            found = best.is_some(),
            "Memory scan finished"
        );
        (best, stats)
    }

    /// Score the pair at exactly `offset`, gated by the acceptance threshold.
    pub fn evaluate_at(&self, source: &dyn MemorySource, offset: usize) -> Option<ScanHit> {
        self.score_at(source, offset)
            .filter(|hit| hit.score >= self.accept_threshold)
    }

    fn score_at(&self, source: &dyn MemorySource, offset: usize) -> Option<ScanHit> {
        let bytes = source.read(offset, PAIR_BYTES)?;
        let view: Mat4 = bytemuck::pod_read_unaligned(&bytes[..MATRIX_BYTES]);
        let proj: Mat4 = bytemuck::pod_read_unaligned(&bytes[MATRIX_BYTES..PAIR_BYTES]);

        let (score, orientation) = score_oriented(&view, &proj, self.world_scale);
        let (view, proj) = canonicalize(&view, &proj, orientation);
        Some(ScanHit {
            view,
            proj,
            score,
            offset,
            orientation,
        })
    }
}

impl Default for MemoryScanner {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

fn align_up(value: usize, align: usize) -> usize {
    value.div_ceil(align).saturating_mul(align)
}
