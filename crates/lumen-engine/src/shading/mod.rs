//! Shading model of the mesh drawer.
//!
//! `render/shaders/mesh.wgsl` runs this arithmetic on the GPU; the functions
//! here are the CPU mirror, used to reason about and test per-draw state
//! without a device. Keep the two in lockstep.

mod config;
mod light;
mod model;

pub use config::ShadingConfig;
pub use light::Light;
pub use model::{
    diffuse, shade, specular, uv_gradient, DrawUniforms, VertexOutput, AMBIENT, DIFFUSE_WEIGHT,
    SPECULAR_COLOR, SPECULAR_GAIN, VIEW_DIR,
};
