//! # Tasking Demos
//!
//! Sample workloads instrumented with the debug meter.
//!
//! ## Available Demos
//!
//! - `animation_demo` - Skinned models animated across worker threads, with
//!   the per-frame meter overlay rebuilt every frame

pub mod animation;

/// Demos library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
