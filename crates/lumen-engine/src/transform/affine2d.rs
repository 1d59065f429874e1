//! 2D affine transforms as 3×3 column-major matrices.

use super::Mat3;

/// Builds "scale, then rotate, then translate" as one matrix.
///
/// `rotation_degrees` is counter-clockwise in a y-up frame (clockwise on a
/// y-down canvas). Layout:
///
/// ```text
/// [ s·cosθ,  s·sinθ, 0,     // column 0
///  -s·sinθ,  s·cosθ, 0,     // column 1
///   pos_x,   pos_y,  1 ]    // column 2
/// ```
pub fn build_transform(pos_x: f32, pos_y: f32, rotation_degrees: f32, scale: f32) -> Mat3 {
    let (sin, cos) = rotation_degrees.to_radians().sin_cos();

    let a = scale * cos;
    let b = scale * sin;

    Mat3::from_cols_array(&[a, b, 0.0, -b, a, 0.0, pos_x, pos_y, 1.0])
}

/// Returns the transform that applies `first`, then `second`.
///
/// This is the product `second · first`; the argument order reads in
/// application order, the product order does not. Swapping them reverses the
/// meaning of every composed transform downstream.
#[inline]
pub fn compose(first: Mat3, second: Mat3) -> Mat3 {
    second * first
}
