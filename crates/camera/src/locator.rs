//! Camera lookup with per-region offset memory.
//!
//! A camera usually lives at the same offset of the same region frame after
//! frame. The locator re-reads that offset first and only falls back to a
//! full strided scan when the remembered location no longer holds a
//! plausible pair.

use std::collections::HashMap;

use serde::Serialize;

use framelens_frame_model::DiscoveryMethod;

use crate::config::CameraConfig;
use crate::memory::{MemorySource, SliceSource};
use crate::scanner::{MemoryScanner, ScanHit};

/// A camera pair and how it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub hit: ScanHit,
    pub method: DiscoveryMethod,
}

/// Lookup counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LocatorStats {
    pub cached_hits: u64,
    pub full_scans: u64,
    pub tagged_hits: u64,
    pub misses: u64,
}

#[derive(Debug, Clone)]
pub struct CameraLocator {
    scanner: MemoryScanner,
    known: HashMap<u64, usize>,
    stats: LocatorStats,
}

impl CameraLocator {
    pub fn new(config: &CameraConfig) -> Self {
        Self {
            scanner: MemoryScanner::new(config),
            known: HashMap::new(),
            stats: LocatorStats::default(),
        }
    }

    pub fn scanner(&self) -> &MemoryScanner {
        &self.scanner
    }

    /// Find the camera in a memory region identified by `region_id`.
    pub fn locate(&mut self, region_id: u64, source: &dyn MemorySource) -> Option<Located> {
        if let Some(&offset) = self.known.get(&region_id) {
            if let Some(hit) = self.scanner.evaluate_at(source, offset) {
                self.stats.cached_hits += 1;
                return Some(Located {
                    hit,
                    method: DiscoveryMethod::CachedLocation,
                });
            }
            tracing::trace!(region_id, offset, "Cached camera location went stale");
        }

        self.stats.full_scans += 1;
        match self.scanner.find_best_camera(source) {
            Some(hit) => {
                if self.known.insert(region_id, hit.offset) != Some(hit.offset) {
                    tracing::debug!(
                        region_id,
                        offset = hit.offset,
                        score = hit.score,
                        orientation = ?hit.orientation,
                        "Camera located by scan"
                    );
                }
                Some(Located {
                    hit,
                    method: DiscoveryMethod::FullScan,
                })
            }
            None => {
                self.known.remove(&region_id);
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Evaluate a tagged constant buffer at a known offset.
    pub fn locate_tagged(&mut self, blob: &[u8], offset: usize) -> Option<Located> {
        let hit = self.scanner.evaluate_at(&SliceSource::new(blob), offset);
        match hit {
            Some(hit) => {
                self.stats.tagged_hits += 1;
                Some(Located {
                    hit,
                    method: DiscoveryMethod::TaggedBuffer,
                })
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Remembered offset for a region.
    pub fn known_offset(&self, region_id: u64) -> Option<usize> {
        self.known.get(&region_id).copied()
    }

    pub fn forget(&mut self, region_id: u64) {
        self.known.remove(&region_id);
    }

    pub fn clear(&mut self) {
        self.known.clear();
    }

    pub fn stats(&self) -> LocatorStats {
        self.stats
    }
}

impl Default for CameraLocator {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelens_frame_model::matrix::{look_to, perspective};
    use framelens_frame_model::Mat4;

    fn blob(len: usize, offset: usize) -> Vec<u8> {
        let view: Mat4 = look_to([0.0, 1.7, 0.0], 1.2, 0.0);
        let proj = perspective(65f32.to_radians(), 1.6, 0.1, 800.0);
        let mut words = vec![0.0f32; len / 4];
        words[offset / 4..offset / 4 + 16].copy_from_slice(&view);
        words[offset / 4 + 16..offset / 4 + 32].copy_from_slice(&proj);
        bytemuck::cast_slice(&words).to_vec()
    }

    #[test]
    fn test_second_lookup_uses_cached_offset() {
        let bytes = blob(8192, 4096);
        let mut locator = CameraLocator::default();

        let first = locator.locate(7, &SliceSource::new(&bytes)).unwrap();
        assert_eq!(first.method, DiscoveryMethod::FullScan);
        assert_eq!(locator.known_offset(7), Some(4096));

        let second = locator.locate(7, &SliceSource::new(&bytes)).unwrap();
        assert_eq!(second.method, DiscoveryMethod::CachedLocation);
        assert_eq!(locator.stats().full_scans, 1);
        assert_eq!(locator.stats().cached_hits, 1);
    }

    #[test]
    fn test_moved_camera_triggers_rescan() {
        let mut locator = CameraLocator::default();
        locator.locate(1, &SliceSource::new(&blob(8192, 512))).unwrap();

        let moved = blob(8192, 2048);
        let found = locator.locate(1, &SliceSource::new(&moved)).unwrap();
        assert_eq!(found.method, DiscoveryMethod::FullScan);
        assert_eq!(found.hit.offset, 2048);
        assert_eq!(locator.known_offset(1), Some(2048));
    }

    #[test]
    fn test_miss_forgets_region() {
        let mut locator = CameraLocator::default();
        locator.locate(3, &SliceSource::new(&blob(4096, 256))).unwrap();
        assert!(locator.locate(3, &SliceSource::new(&[0u8; 4096])).is_none());
        assert_eq!(locator.known_offset(3), None);
        assert_eq!(locator.stats().misses, 1);
    }

    #[test]
    fn test_forget_forces_full_scan() {
        let bytes = blob(4096, 1024);
        let mut locator = CameraLocator::default();
        locator.locate(5, &SliceSource::new(&bytes)).unwrap();
        locator.forget(5);
        assert_eq!(locator.known_offset(5), None);

        let again = locator.locate(5, &SliceSource::new(&bytes)).unwrap();
        assert_eq!(again.method, DiscoveryMethod::FullScan);
        assert_eq!(locator.stats().full_scans, 2);
    }

    #[test]
    fn test_tagged_lookup() {
        let bytes = blob(512, 64);
        let mut locator = CameraLocator::default();
        let found = locator.locate_tagged(&bytes, 64).unwrap();
        assert_eq!(found.method, DiscoveryMethod::TaggedBuffer);
        assert!(locator.locate_tagged(&bytes, 0).is_none());
    }
}
