//! Write a synthetic memory dump with a plausible camera pair.

use std::path::PathBuf;

use framelens_camera::PAIR_BYTES;
use framelens_frame_model::matrix::{look_to, perspective, transpose, with_jitter};

pub fn run(
    output: PathBuf,
    size: usize,
    offset: usize,
    column_major: bool,
    jitter: Option<(f32, f32)>,
) -> anyhow::Result<()> {
    if offset % 4 != 0 {
        anyhow::bail!("offset {offset} is not 4-byte aligned");
    }
    if offset.checked_add(PAIR_BYTES).map_or(true, |end| end > size) {
        anyhow::bail!("a {PAIR_BYTES}-byte pair at offset {offset} does not fit in {size} bytes");
    }

    let mut view = look_to([12.0, 1.8, -40.0], 0.7, -0.05);
    let mut proj = perspective(70f32.to_radians(), 16.0 / 9.0, 0.1, 5000.0);
    if let Some((jx, jy)) = jitter {
        proj = with_jitter(&proj, jx, jy);
    }
    if column_major {
        view = transpose(&view);
        proj = transpose(&proj);
    }

    // A slowly varying background so the dump is not trivially empty.
    let mut words: Vec<f32> = (0..size / 4).map(|i| ((i % 97) as f32) * 0.25).collect();
    let at = offset / 4;
    words[at..at + 16].copy_from_slice(&view);
    words[at + 16..at + 32].copy_from_slice(&proj);

    std::fs::write(&output, bytemuck::cast_slice::<f32, u8>(&words))
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output.display()))?;

    println!(
        "Wrote {} bytes to {} (camera at {offset:#x}, {})",
        words.len() * 4,
        output.display(),
        if column_major { "column-major" } else { "row-major" }
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_near_usize_max_is_rejected() {
        let path = std::env::temp_dir().join("framelens_synth_overflow.bin");
        let err = run(path.clone(), 1024, usize::MAX - 3, false, None).unwrap_err();
        assert!(err.to_string().contains("does not fit"));
        assert!(!path.exists());
    }

    #[test]
    fn test_pair_must_fit_in_the_dump() {
        let path = std::env::temp_dir().join("framelens_synth_fit.bin");
        assert!(run(path.clone(), 1024, 1024 - PAIR_BYTES + 4, false, None).is_err());
        assert!(run(path.clone(), 1024, 6, false, None).is_err());

        run(path.clone(), 1024, 1024 - PAIR_BYTES, true, Some((0.001, -0.002))).unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 1024);
        let _ = std::fs::remove_file(&path);
    }
}
