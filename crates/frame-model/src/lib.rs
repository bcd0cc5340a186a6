//! FrameLens Frame Model
//!
//! Defines the data contracts between the upstream hooks and the
//! classification core:
//! - **Resources:** Opaque handles, structural descriptors, semantic roles
//! - **Matrices:** Row-major 4x4 camera matrices and their conventions
//! - **Traces:** JSONL recordings of per-frame observations for replay

pub mod matrix;
pub mod resource;
pub mod trace;

pub use matrix::Mat4;
pub use resource::*;
pub use trace::*;
