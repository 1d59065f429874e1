//! Vector, color and viewport types shared by the math, shading and render
//! modules. Vectors are `glam`'s.
//!
//! Conventions:
//! - 3D view space is right-handed with the camera looking down +Z
//!   (the shading model's fixed view vector is `(0, 0, 1)`)
//! - 2D coordinates are plain pixels; the 2D transform builder does not
//!   impose an origin

mod color;
mod viewport;

pub use color::ColorRgba;
pub use glam::{Vec2, Vec3, Vec3Swizzles, Vec4};
pub use viewport::Viewport;
