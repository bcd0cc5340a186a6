//! Replay a JSONL trace through a fresh frame engine.

use std::path::PathBuf;

use framelens_engine::{replay, EngineConfig, FrameEngine};
use framelens_frame_model::parse_trace;

pub fn run(config: &EngineConfig, trace: PathBuf, json: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&trace)
        .map_err(|e| anyhow::anyhow!("Failed to read trace {}: {e}", trace.display()))?;
    let events =
        parse_trace(&content).map_err(|e| anyhow::anyhow!("Failed to parse trace: {e}"))?;

    let engine = FrameEngine::new(config.clone());
    let summary = replay(&engine, &events)?;
    let report = engine.report();

    if json {
        let out = serde_json::json!({
            "summary": summary,
            "report": report,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Replayed {}", trace.display());
    println!(
        "  {} events, {} frames, {} registrations",
        summary.events, summary.frames, summary.registrations
    );
    println!(
        "  camera: {} accepted, {} rejected; jitter valid on {} calls",
        summary.camera_updates, summary.camera_rejections, summary.valid_jitter_frames
    );
    println!();
    println!("{report}");

    Ok(())
}
