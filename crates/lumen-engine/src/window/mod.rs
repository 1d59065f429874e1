//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and a single Window, and wires them to the GPU
//! layer.

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
pub use winit::dpi::LogicalSize;
