//! FrameLens Common Utilities
//!
//! Shared infrastructure for all FrameLens crates:
//! - Error types and result aliases
//! - Frame clock and rate limiting
//! - Ordered locks enforcing the global acquisition hierarchy
//! - Tracing/logging initialization
//! - Configuration file helpers

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod sync;

pub use clock::*;
pub use config::*;
pub use error::*;
pub use sync::{LockLevel, OrderedMutex, OrderedRwLock};
