//! Transform matrices on top of `glam`.
//!
//! Storage is column-major everywhere: element `(row, col)` of a 3×3 lives at
//! `col * 3 + row`, of a 4×4 at `col * 4 + row`. This is the layout WGSL
//! uniforms expect, so matrices upload without transposition.
//!
//! Composition order matters: `a * b` applies `b` first, then `a`.

mod affine2d;
mod model_view;

pub use affine2d::{build_transform, compose};
pub use glam::{Mat3, Mat4};
pub use model_view::{
    build_model_view, build_model_view_projection, framing_projection, normal_matrix,
    perspective, rotation_x, rotation_y,
};
