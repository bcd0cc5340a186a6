//! FrameLens Camera
//!
//! Finds the scene camera and its per-frame jitter without engine cooperation:
//! - **Matrix scoring:** Geometric plausibility of view/projection pairs
//! - **Memory scanning:** Coarse-to-fine strided search over raw memory
//! - **Camera cache:** One stable camera with hysteresis
//! - **Jitter:** Tiered extraction with outlier rejection
//!
//! Nothing here owns memory it reads; sources are borrowed per call.

pub mod cache;
pub mod config;
pub mod jitter;
pub mod locator;
pub mod matrix_score;
pub mod memory;
pub mod scanner;

pub use cache::{CameraCache, CameraCandidate, CameraStats};
pub use config::{CameraConfig, JitterConfig};
pub use jitter::{JitterEngine, JitterInput, JitterSample, JitterSource};
pub use locator::{CameraLocator, Located, LocatorStats};
pub use matrix_score::{score_oriented, score_pair, Orientation, MAX_SCORE};
pub use memory::{MemorySource, Region, SegmentedSource, SliceSource};
pub use scanner::{MemoryScanner, ScanHit, ScanStats, PAIR_BYTES};
