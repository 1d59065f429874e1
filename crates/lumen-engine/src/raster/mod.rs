//! CPU raster images and "over" compositing.
//!
//! Images are straight-alpha RGBA8, row-major, 4 bytes per pixel. The
//! compositor writes into the background in place and only reads the
//! foreground; the borrow checker keeps the two buffers distinct.

mod composite;
mod buffer;

pub use composite::{composite, Offset};
pub use buffer::RasterImage;
