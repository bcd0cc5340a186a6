//! 4x4 matrix conventions for camera data.
//!
//! Matrices are stored row-major and applied to row vectors (`v * M`):
//!
//! - View translation lives in elements 12, 13, 14.
//! - The homogeneous lane of an affine matrix is elements 3, 7, 11, 15
//!   and reads `(0, 0, 0, 1)`.
//! - Projection focal terms are elements 0 (x) and 5 (y); sub-pixel jitter
//!   offsets sit in elements 8 and 9; the perspective signature is element
//!   11 (`±1`) with element 15 at `0`.
//!
//! Data laid out in the opposite (column-major) convention is handled by
//! scoring the transpose.

/// A 4x4 matrix, row-major.
pub type Mat4 = [f32; 16];

/// Identity matrix.
pub const IDENTITY: Mat4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Swap rows and columns.
pub fn transpose(m: &Mat4) -> Mat4 {
    let mut out = [0.0; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[col * 4 + row] = m[row * 4 + col];
        }
    }
    out
}

/// Whether every element is finite.
pub fn is_finite(m: &Mat4) -> bool {
    m.iter().all(|v| v.is_finite())
}

/// Sum of absolute per-element differences.
pub fn abs_delta_sum(a: &Mat4, b: &Mat4) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}

/// The first three components of row `index` (a basis vector for rows 0..3).
pub fn basis_row(m: &Mat4, index: usize) -> [f32; 3] {
    let base = index * 4;
    [m[base], m[base + 1], m[base + 2]]
}

pub fn dot3(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross3(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize3(v: [f32; 3]) -> [f32; 3] {
    let len = dot3(v, v).sqrt();
    if len <= f32::EPSILON {
        return v;
    }
    [v[0] / len, v[1] / len, v[2] / len]
}

/// Left-handed perspective projection.
///
/// `fov_y` is the vertical field of view in radians.
pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let ys = 1.0 / (fov_y * 0.5).tan();
    let xs = ys / aspect;
    let range = far / (far - near);
    [
        xs, 0.0, 0.0, 0.0, //
        0.0, ys, 0.0, 0.0, //
        0.0, 0.0, range, 1.0, //
        0.0, 0.0, -near * range, 0.0,
    ]
}

/// Add a sub-pixel offset (in clip units) to a projection.
pub fn with_jitter(proj: &Mat4, jitter_x: f32, jitter_y: f32) -> Mat4 {
    let mut out = *proj;
    out[8] += jitter_x;
    out[9] += jitter_y;
    out
}

/// View matrix for a camera at `position` looking along `yaw`/`pitch` (radians).
pub fn look_to(position: [f32; 3], yaw: f32, pitch: f32) -> Mat4 {
    let forward = normalize3([
        pitch.cos() * yaw.sin(),
        pitch.sin(),
        pitch.cos() * yaw.cos(),
    ]);
    let right = normalize3(cross3([0.0, 1.0, 0.0], forward));
    let up = cross3(forward, right);

    [
        right[0],
        up[0],
        forward[0],
        0.0,
        right[1],
        up[1],
        forward[1],
        0.0,
        right[2],
        up[2],
        forward[2],
        0.0,
        -dot3(position, right),
        -dot3(position, up),
        -dot3(position, forward),
        1.0,
    ]
}
