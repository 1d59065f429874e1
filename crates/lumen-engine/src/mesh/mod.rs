//! Non-indexed triangle meshes.
//!
//! Attributes are flat `f32` arrays: 3 per position, 2 per texture
//! coordinate, 3 per normal. Every three consecutive vertices form one
//! triangle; no other topology is modeled.

mod data;
pub mod primitives;

pub use data::Mesh;
