//! FrameLens Classifier
//!
//! Decides which of the producer's buffers hold the scene color, depth,
//! motion vectors, and exposure value, using only structural descriptors:
//! - **Scoring:** Per-role heuristics over format, usage, and size
//! - **Candidate stores:** Bounded per-role collections with recency and frequency bonuses
//! - **Promotion:** Margin-gated best picks that survive brief invisibility
//!
//! Pure computation. Callers own synchronization and frame pacing.

pub mod classifier;
pub mod config;
pub mod report;
pub mod scoring;
pub mod store;

pub use classifier::{BestPick, ClassifierStats, ExposurePick, RegisterOutcome, ResourceClassifier};
pub use config::{BonusConfig, ClassifierConfig, ViewportMatchConfig};
pub use report::{ClassifierReport, ExposureReport, RoleReport};
pub use store::{Candidate, CandidateStore};
