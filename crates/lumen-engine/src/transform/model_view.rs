//! 3D model-view(-projection) construction.
//!
//! View space follows the mesh viewer's camera: the eye sits at the origin
//! looking down +Z, so objects are pushed away with a positive Z translation
//! and projections divide by `w = z`.

use crate::coords::Vec3;

use super::{Mat3, Mat4};

/// Half-extent the default framing reserves around the object (√3, the
/// half-diagonal of a unit cube, rounded up).
const FRAMING_RADIUS: f32 = 1.74;
const FRAMING_MIN_NEAR: f32 = 0.001;
const FRAMING_FOV_Y_DEGREES: f32 = 60.0;

/// Elementary rotation about X (radians).
///
/// Column-major `[1,0,0,0, 0,c,-s,0, 0,s,c,0, 0,0,0,1]`: +Y turns toward
/// -Z, the convention the mesh viewer's drag controls are built around. This
/// is `glam`'s `from_rotation_x` with the angle negated.
pub fn rotation_x(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    Mat4::from_cols_array(&[
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, -s, 0.0, //
        0.0, s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Elementary rotation about Y (radians), right-handed: +Z turns toward +X.
#[inline]
pub fn rotation_y(angle: f32) -> Mat4 {
    Mat4::from_rotation_y(angle)
}

/// Builds `Translation · (Ry · Rx)`: rotate about X, then about Y, then
/// translate.
///
/// The rotation order is fixed; swapping it changes what a drag on the
/// viewer does.
pub fn build_model_view(translation: Vec3, rotation_x_angle: f32, rotation_y_angle: f32) -> Mat4 {
    let rotation = rotation_y(rotation_y_angle) * rotation_x(rotation_x_angle);
    Mat4::from_translation(translation) * rotation
}

/// Builds `Projection · Translation · (Ry · Rx)`.
pub fn build_model_view_projection(
    projection: Mat4,
    translation: Vec3,
    rotation_x_angle: f32,
    rotation_y_angle: f32,
) -> Mat4 {
    projection * build_model_view(translation, rotation_x_angle, rotation_y_angle)
}

/// Inverse-transpose of the model view's upper-left 3×3.
///
/// Normals must go through this matrix, not the model view itself, to stay
/// perpendicular to surfaces under non-uniform scale. A singular block (e.g.
/// a zero scale) falls back to the plain 3×3.
pub fn normal_matrix(model_view: &Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(*model_view);
    let det = upper.determinant();
    if det == 0.0 || !det.is_finite() {
        log::warn!("normal_matrix: model view is singular; using its 3x3 block as-is");
        return upper;
    }
    upper.inverse().transpose()
}

/// Perspective projection for a camera looking down +Z.
///
/// Maps `z = near` to depth 0 and `z = far` to depth 1 (wgpu's clip range)
/// with `w = z`. `fov_y` is in radians.
pub fn perspective(aspect: f32, fov_y: f32, near: f32, far: f32) -> Mat4 {
    let s = 1.0 / (fov_y * 0.5).tan();
    let depth = far / (far - near);

    Mat4::from_cols_array(&[
        s / aspect, 0.0, 0.0, 0.0, //
        0.0, s, 0.0, 0.0, //
        0.0, 0.0, depth, 1.0, //
        0.0, 0.0, -near * depth, 0.0,
    ])
}

/// 60° perspective whose clip planes hug an object of radius ~1.74 placed
/// `distance` units in front of the camera.
pub fn framing_projection(aspect: f32, distance: f32) -> Mat4 {
    let near = (distance - FRAMING_RADIUS).max(FRAMING_MIN_NEAR);
    let far = distance + FRAMING_RADIUS;
    perspective(aspect, FRAMING_FOV_Y_DEGREES.to_radians(), near, far)
}
