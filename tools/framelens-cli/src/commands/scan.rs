//! Scan a raw memory dump for the best camera pair.

use std::path::PathBuf;

use framelens_camera::{MemoryScanner, SegmentedSource};
use framelens_engine::EngineConfig;

/// Parse `START:END` into a half-open byte range.
pub fn parse_range(s: &str) -> Result<(usize, usize), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{s}'"))?;
    let start = start
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad start '{start}': {e}"))?;
    let end = end
        .trim()
        .parse::<usize>()
        .map_err(|e| format!("bad end '{end}': {e}"))?;
    if end <= start {
        return Err(format!("empty range {start}:{end}"));
    }
    Ok((start, end))
}

pub fn run(
    config: &EngineConfig,
    dump: PathBuf,
    strides: Vec<usize>,
    unreadable: Vec<(usize, usize)>,
) -> anyhow::Result<()> {
    let bytes = std::fs::read(&dump)
        .map_err(|e| anyhow::anyhow!("Failed to read dump {}: {e}", dump.display()))?;

    let mut camera = config.camera.clone();
    if !strides.is_empty() {
        camera.scan_strides = strides;
    }
    camera.validate_strides()?;
    let scanner = MemoryScanner::new(&camera);
    let source = SegmentedSource::with_unreadable(&bytes, &unreadable)?;

    tracing::info!(
        bytes = bytes.len(),
        strides = ?scanner.strides(),
        "Scanning dump"
    );
    let (hit, stats) = scanner.scan(&source);

    println!("Scanned {} ({} bytes)", dump.display(), bytes.len());
    println!(
        "  {} offsets in {} passes, {} unreadable regions skipped",
        stats.offsets_visited, stats.passes, stats.regions_skipped
    );

    match hit {
        Some(hit) => {
            println!(
                "  camera at offset {:#x} ({:?}), score {:.3}",
                hit.offset, hit.orientation, hit.score
            );
            println!(
                "  position row [{:.3}, {:.3}, {:.3}]",
                hit.view[12], hit.view[13], hit.view[14]
            );
            println!(
                "  focal [{:.4}, {:.4}], jitter terms [{:.6}, {:.6}]",
                hit.proj[0], hit.proj[5], hit.proj[8], hit.proj[9]
            );
        }
        None => println!(
            "  no camera above the {:.2} acceptance threshold",
            camera.accept_threshold
        ),
    }

    Ok(())
}
