//! Plausibility scoring for view/projection pairs.
//!
//! A pair is scored as the sum of the checks it passes. Three checks are
//! hard gates and return 0 on failure:
//!
//! 1. every element finite
//! 2. view homogeneous lane close to `(0, 0, 0, 1)`
//! 3. projection carries a perspective signature
//!
//! The rest are bonuses: field of view, translation magnitude, and
//! orthonormality of the rotation basis.

use serde::Serialize;

use framelens_frame_model::matrix::{basis_row, dot3, is_finite, transpose};
use framelens_frame_model::Mat4;

/// Highest score a pair can reach.
pub const MAX_SCORE: f32 = 1.2;

const LANE_TOLERANCE: f32 = 0.01;
const LANE_TIGHT_TOLERANCE: f32 = 1e-4;
const LANE_TIGHT_BONUS: f32 = 0.10;

const STRONG_PERSPECTIVE_BONUS: f32 = 0.30;
const WEAK_PERSPECTIVE_BONUS: f32 = 0.15;

// cot(fov/2) for fov in roughly [30°, 120°], with a wider band for x so
// ultrawide aspect ratios pass.
const FOCAL_Y_RANGE: (f32, f32) = (0.55, 3.8);
const FOCAL_X_RANGE: (f32, f32) = (0.1, 3.8);
const FOV_BONUS: f32 = 0.20;
// Roughly [60°, 90°].
const COMMON_FOCAL_Y_RANGE: (f32, f32) = (1.0, 1.75);
const COMMON_FOV_BONUS: f32 = 0.10;

const TRANSLATION_BONUS: f32 = 0.15;

const ORTHOGONAL_TOLERANCE: f32 = 0.05;
const ORTHOGONAL_BONUS: f32 = 0.20;
const UNIT_TOLERANCE: f32 = 0.05;
const UNIT_BONUS: f32 = 0.15;

/// Memory layout a pair was recognised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    RowMajor,
    /// Both matrices were stored transposed.
    ColumnMajor,
}

/// How a projection's perspective signature was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Perspective {
    Strong,
    Weak,
}

/// Score a pair as stored (row-major, row-vector convention).
pub fn score_pair(view: &Mat4, proj: &Mat4, world_scale: f32) -> f32 {
    if !is_finite(view) || !is_finite(proj) {
        return 0.0;
    }

    let Some(lane_deviation) = homogeneous_lane_deviation(view) else {
        return 0.0;
    };
    let mut score = 0.0;
    if lane_deviation < LANE_TIGHT_TOLERANCE {
        score += LANE_TIGHT_BONUS;
    }

    score += match classify_perspective(proj) {
        Some(Perspective::Strong) => STRONG_PERSPECTIVE_BONUS,
        Some(Perspective::Weak) => WEAK_PERSPECTIVE_BONUS,
        None => return 0.0,
    };

    let focal_x = proj[0].abs();
    let focal_y = proj[5].abs();
    if within(focal_y, FOCAL_Y_RANGE) && within(focal_x, FOCAL_X_RANGE) {
        score += FOV_BONUS;
        if within(focal_y, COMMON_FOCAL_Y_RANGE) {
            score += COMMON_FOV_BONUS;
        }
    }

    if view[12..15].iter().all(|t| t.abs() <= world_scale) {
        score += TRANSLATION_BONUS;
    }

    let basis = [basis_row(view, 0), basis_row(view, 1), basis_row(view, 2)];
    let orthogonal = [(0, 1), (0, 2), (1, 2)]
        .iter()
        .all(|&(a, b)| dot3(basis[a], basis[b]).abs() < ORTHOGONAL_TOLERANCE);
    if orthogonal {
        score += ORTHOGONAL_BONUS;
    }
    let unit = basis
        .iter()
        .all(|row| (dot3(*row, *row).sqrt() - 1.0).abs() < UNIT_TOLERANCE);
    if unit {
        score += UNIT_BONUS;
    }

    score
}

/// Score a pair in both layouts and keep the better one.
///
/// Ties resolve to [`Orientation::RowMajor`].
pub fn score_oriented(view: &Mat4, proj: &Mat4, world_scale: f32) -> (f32, Orientation) {
    let forward = score_pair(view, proj, world_scale);
    if forward >= MAX_SCORE {
        return (forward, Orientation::RowMajor);
    }
    let transposed = score_pair(&transpose(view), &transpose(proj), world_scale);
    if transposed > forward {
        (transposed, Orientation::ColumnMajor)
    } else {
        (forward, Orientation::RowMajor)
    }
}

/// Bring a pair into canonical row-major layout.
pub fn canonicalize(view: &Mat4, proj: &Mat4, orientation: Orientation) -> (Mat4, Mat4) {
    match orientation {
        Orientation::RowMajor => (*view, *proj),
        Orientation::ColumnMajor => (transpose(view), transpose(proj)),
    }
}

/// Sub-pixel offset baked into a projection, relative to its focal terms.
pub fn derive_jitter(proj: &Mat4) -> Option<(f32, f32)> {
    if proj[0] == 0.0 || proj[5] == 0.0 {
        return None;
    }
    let x = proj[8] / proj[0];
    let y = proj[9] / proj[5];
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Classify the perspective signature in elements 11 and 15.
pub fn classify_perspective(proj: &Mat4) -> Option<Perspective> {
    let w = proj[11].abs();
    let tail = proj[15].abs();
    if (w - 1.0).abs() < 0.01 && tail < 0.01 {
        Some(Perspective::Strong)
    } else if (0.5..=2.0).contains(&w) && tail < 0.1 {
        Some(Perspective::Weak)
    } else {
        None
    }
}

fn homogeneous_lane_deviation(view: &Mat4) -> Option<f32> {
    let deviation = [view[3], view[7], view[11], view[15] - 1.0]
        .iter()
        .fold(0.0f32, |acc, v| acc.max(v.abs()));
    (deviation <= LANE_TOLERANCE).then_some(deviation)
}

fn within(value: f32, (lo, hi): (f32, f32)) -> bool {
    value >= lo && value <= hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use framelens_frame_model::matrix::{look_to, perspective, with_jitter, IDENTITY};

    const WORLD: f32 = 10_000.0;

    fn camera() -> (Mat4, Mat4) {
        (
            look_to([12.0, 3.5, -40.0], 0.7, -0.2),
            perspective(70f32.to_radians(), 16.0 / 9.0, 0.1, 5000.0),
        )
    }

    #[test]
    fn test_good_camera_scores_max() {
        let (view, proj) = camera();
        let score = score_pair(&view, &proj, WORLD);
        assert!((score - MAX_SCORE).abs() < 1e-5, "score {score}");
    }

    #[test]
    fn test_non_finite_is_zero() {
        let (view, mut proj) = camera();
        proj[10] = f32::NAN;
        assert_eq!(score_pair(&view, &proj, WORLD), 0.0);
        let (mut view, proj) = camera();
        view[0] = f32::INFINITY;
        assert_eq!(score_pair(&view, &proj, WORLD), 0.0);
    }

    #[test]
    fn test_orthographic_is_zero() {
        let (view, mut proj) = camera();
        proj[11] = 0.0;
        proj[15] = 1.0;
        assert_eq!(score_pair(&view, &proj, WORLD), 0.0);
        assert_eq!(score_pair(&view, &IDENTITY, WORLD), 0.0);
    }

    #[test]
    fn test_broken_homogeneous_lane_is_zero() {
        let (mut view, proj) = camera();
        view[7] = 0.5;
        assert_eq!(score_pair(&view, &proj, WORLD), 0.0);
    }

    #[test]
    fn test_bonuses_are_independent() {
        let (mut view, proj) = camera();
        view[14] = WORLD * 2.0;
        let far = score_pair(&view, &proj, WORLD);
        assert!((MAX_SCORE - far - TRANSLATION_BONUS).abs() < 1e-5);

        let (view, _) = camera();
        let narrow = perspective(20f32.to_radians(), 16.0 / 9.0, 0.1, 5000.0);
        let score = score_pair(&view, &narrow, WORLD);
        assert!((MAX_SCORE - score - FOV_BONUS - COMMON_FOV_BONUS).abs() < 1e-5);
    }

    #[test]
    fn test_scaled_basis_loses_unit_bonus() {
        let (mut view, proj) = camera();
        for v in view.iter_mut().take(11) {
            *v *= 2.0;
        }
        view[3] = 0.0;
        view[7] = 0.0;
        let score = score_pair(&view, &proj, WORLD);
        assert!((MAX_SCORE - score - UNIT_BONUS).abs() < 1e-5, "score {score}");
    }

    #[test]
    fn test_transposed_pair_is_recognised() {
        let (view, proj) = camera();
        let (score, orientation) = score_oriented(&transpose(&view), &transpose(&proj), WORLD);
        assert_eq!(orientation, Orientation::ColumnMajor);
        assert!((score - MAX_SCORE).abs() < 1e-5);

        let (v, p) = canonicalize(&transpose(&view), &transpose(&proj), orientation);
        assert_eq!(v, view);
        assert_eq!(p, proj);
    }

    #[test]
    fn test_derive_jitter() {
        let proj = with_jitter(&IDENTITY, 0.02, -0.01);
        let (x, y) = derive_jitter(&proj).unwrap();
        assert!((x - 0.02).abs() < 1e-7);
        assert!((y + 0.01).abs() < 1e-7);

        let mut degenerate = IDENTITY;
        degenerate[5] = 0.0;
        assert_eq!(derive_jitter(&degenerate), None);
    }

    proptest::proptest! {
        #[test]
        fn prop_score_is_bounded(values in proptest::collection::vec(proptest::num::f32::ANY, 32)) {
            let mut view = [0.0f32; 16];
            let mut proj = [0.0f32; 16];
            view.copy_from_slice(&values[..16]);
            proj.copy_from_slice(&values[16..]);
            let (score, _) = score_oriented(&view, &proj, WORLD);
            proptest::prop_assert!(score.is_finite());
            proptest::prop_assert!((0.0..=MAX_SCORE + 1e-5).contains(&score));
        }
    }
}
