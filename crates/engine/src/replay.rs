//! Drive a [`FrameEngine`] from a recorded trace.

use serde::Serialize;

use framelens_camera::SegmentedSource;
use framelens_common::{FramelensError, FramelensResult};
use framelens_frame_model::{DiscoveryMethod, TraceEvent};

use crate::engine::FrameEngine;

/// What a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    pub events: u64,
    pub frames: u64,
    pub registrations: u64,
    pub camera_updates: u64,
    pub camera_rejections: u64,
    pub valid_jitter_frames: u64,
}

/// Apply every event in order.
///
/// Only a malformed memory map is an error; everything the engine itself
/// rejects is counted and skipped.
pub fn replay(engine: &FrameEngine, events: &[TraceEvent]) -> FramelensResult<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for (index, event) in events.iter().enumerate() {
        summary.events += 1;
        match event {
            TraceEvent::Register {
                handle,
                descriptor,
                hint,
            } => {
                engine.register_resource(*handle, descriptor, *hint);
                summary.registrations += 1;
            }
            TraceEvent::Camera { view, proj, jitter } => {
                let accepted = engine.submit_camera(view, proj, *jitter, DiscoveryMethod::Direct);
                count_camera(&mut summary, accepted);
            }
            TraceEvent::Memory {
                region,
                words,
                unreadable,
            } => {
                let bytes: &[u8] = bytemuck::cast_slice(words);
                let source = SegmentedSource::with_unreadable(bytes, unreadable).map_err(|e| {
                    FramelensError::trace(index + 1, e.to_string())
                })?;
                let accepted = engine.submit_memory(*region, &source);
                count_camera(&mut summary, accepted);
            }
            TraceEvent::Tagged { words, offset } => {
                let accepted = engine.submit_tagged_buffer(bytemuck::cast_slice(words), *offset);
                count_camera(&mut summary, accepted);
            }
            TraceEvent::Jitter {
                pattern,
                projection,
            } => {
                if engine.update_jitter(*pattern, *projection).valid {
                    summary.valid_jitter_frames += 1;
                }
            }
            TraceEvent::Resize { width, height } => engine.on_resolution_change(*width, *height),
            TraceEvent::Clear => engine.clear_candidates(),
            TraceEvent::Tick => {
                engine.advance_frame();
                summary.frames += 1;
            }
        }
    }

    tracing::debug!(
        events = summary.events,
        frames = summary.frames,
        camera_updates = summary.camera_updates,
        "Replay finished"
    );
    Ok(summary)
}

fn count_camera(summary: &mut ReplaySummary, accepted: bool) {
    if accepted {
        summary.camera_updates += 1;
    } else {
        summary.camera_rejections += 1;
    }
}
