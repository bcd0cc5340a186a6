//! Replay traces.
//!
//! A trace is a JSONL stream of the observations the upstream hooks would
//! deliver, one JSON object per line, in submission order. Lines that are
//! blank or start with `#` are ignored.

use serde::{Deserialize, Serialize};

use crate::matrix::Mat4;
use crate::resource::{ResourceDescriptor, ResourceHandle, Role};

/// How a camera observation was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// Strided scan over a memory region.
    FullScan,
    /// Re-read at the offset of a previous hit.
    CachedLocation,
    /// Known offset inside a tagged constant buffer.
    TaggedBuffer,
    /// Matrices handed over directly by the caller.
    #[default]
    Direct,
}

/// One observation in a replay trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    /// A buffer seen during this frame.
    Register {
        handle: ResourceHandle,
        descriptor: ResourceDescriptor,
        #[serde(default)]
        hint: Option<Role>,
    },

    /// Camera matrices handed over directly.
    Camera {
        view: Mat4,
        proj: Mat4,
        #[serde(default)]
        jitter: Option<(f32, f32)>,
    },

    /// A memory snapshot, as 32-bit float words.
    Memory {
        region: u64,
        words: Vec<f32>,
        /// Byte ranges `[start, end)` that must be treated as unreadable.
        #[serde(default)]
        unreadable: Vec<(usize, usize)>,
    },

    /// A tagged constant buffer with the camera pair at a known byte offset.
    Tagged { words: Vec<f32>, offset: usize },

    /// Per-frame jitter signals.
    Jitter {
        #[serde(default)]
        pattern: Option<(f32, f32)>,
        #[serde(default)]
        projection: Option<Mat4>,
    },

    /// Output resolution changed.
    Resize { width: u32, height: u32 },

    /// Soft reset of candidate collections.
    Clear,

    /// End of a render submission.
    Tick,
}

/// Failure to read a trace line.
#[derive(Debug, thiserror::Error)]
#[error("line {line}: {source}")]
pub struct TraceParseError {
    /// 1-based line number in the input.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Parse a JSONL trace.
pub fn parse_trace(jsonl: &str) -> Result<Vec<TraceEvent>, TraceParseError> {
    jsonl
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(line, text)| {
            serde_json::from_str(text).map_err(|source| TraceParseError { line, source })
        })
        .collect()
}

/// Serialize events to JSONL format.
pub fn serialize_trace(events: &[TraceEvent]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for event in events {
        output.push_str(&serde_json::to_string(event)?);
        output.push('\n');
    }
    Ok(output)
}
