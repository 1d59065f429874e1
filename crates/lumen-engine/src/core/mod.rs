//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the
//! applications built on it, plus the per-frame context they receive.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
