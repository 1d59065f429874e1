//! GPU rendering subsystem.
//!
//! Renderers own their GPU resources (pipelines, buffers, textures) and
//! record into a caller-provided encoder via `RenderTarget`.
//!
//! Convention:
//! - Geometry arrives in model space; the caller supplies the matrices.
//! - Every pass depth-tests against a `DEPTH_FORMAT` attachment.

mod common;
mod ctx;
mod mesh_drawer;
mod texture;

pub use common::DEPTH_FORMAT;
pub(crate) use common::{clear_color_depth, create_depth_texture};
pub use ctx::{RenderCtx, RenderTarget};
pub use mesh_drawer::MeshDrawer;
pub use texture::{mip_chain, mip_level_count};
