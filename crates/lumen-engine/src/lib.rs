//! Lumen engine crate.
//!
//! Three independent pieces live here:
//! - `raster`: "over" compositing of RGBA8 images
//! - `transform`: column-major 2D/3D transform matrices
//! - `render` + `shading`: a textured, lit mesh drawer on top of wgpu
//!
//! The platform + GPU runtime pieces (`device`, `window`, `core`, `input`,
//! `time`) host the mesh drawer in a window or offscreen.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod transform;
pub mod raster;
pub mod mesh;
pub mod shading;
pub mod render;
