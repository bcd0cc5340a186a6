//! Error types shared across FrameLens crates.
//!
//! The classification core itself never fails: malformed observations are
//! dropped at the point of entry. These errors only surface at the edges
//! (configuration files, replay traces, memory dumps, the CLI).

use std::path::PathBuf;

/// Top-level error type for FrameLens operations.
#[derive(Debug, thiserror::Error)]
pub enum FramelensError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// `event` is the 1-based position of the offending trace event.
    #[error("Trace error at event {event}: {message}")]
    Trace { event: usize, message: String },

    #[error("Scan error: {message}")]
    Scan { message: String },

    #[error("Memory map error: {message}")]
    Memory { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FramelensError.
pub type FramelensResult<T> = Result<T, FramelensError>;

impl FramelensError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn trace(event: usize, msg: impl Into<String>) -> Self {
        Self::Trace {
            event,
            message: msg.into(),
        }
    }

    pub fn scan(msg: impl Into<String>) -> Self {
        Self::Scan {
            message: msg.into(),
        }
    }

    pub fn memory(msg: impl Into<String>) -> Self {
        Self::Memory {
            message: msg.into(),
        }
    }
}
