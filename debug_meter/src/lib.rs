//! Debug meters for the tasking animation sample.
//!
//! Times named regions of work per logical thread context and turns the last
//! complete frame into colored bars for an on-screen overlay. Recording is
//! allocation-free and lock-free with frame-level latency.
//!
//! # Architecture
//!
//! - [`Profiler`]: owns fixed-size rings for every context and frame slot
//! - [`ContextId`]: one per worker lane, acquired once at startup
//! - [`FrameTimeline`]: normalized intervals of the last complete frame,
//!   produced by [`Profiler::reduce`]
//! - [`OverlayBatch`]: triangle-list geometry for an external renderer
//!
//! # Usage
//!
//! ```ignore
//! // Setup (once)
//! let profiler = Profiler::new(MeterConfig::default())?;
//! let lanes = profiler.acquire_all_contexts();
//! let animate = profiler.label("Animate Models");
//! let mut batch = OverlayBatch::new(OverlayLayout::default(), 1024);
//!
//! // Each frame, on the render thread, after joining all workers:
//! profiler.reset_frame();
//!
//! // On worker `i` (one context per worker):
//! {
//!     meter_scope!(profiler, lanes[i], animate);
//!     // ... work ...
//! }
//!
//! // At render time:
//! batch.rebuild(&profiler.reduce());
//! renderer.draw_triangles(batch.as_bytes(), batch.draw_vertex_count());
//! ```

mod clock;
mod color;
mod config;
mod error;
mod label;
mod overlay;
mod profiler;
mod reducer;
mod ring;
mod rotation;
mod stats;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use color::MeterColor;
pub use config::{
    DEFAULT_CAPACITY, DEFAULT_CONTEXTS, DEFAULT_FRAME_SLOTS, DEFAULT_LABEL_CAPACITY,
    DEFAULT_REPORT_INTERVAL, MAX_CONTEXTS, MeterConfig,
};
pub use error::MeterError;
pub use label::{LabelId, UNNAMED_LABEL};
pub use overlay::{
    OverlayBatch, OverlayLayout, OverlayQuad, OverlayVertex, VERTICES_PER_QUAD, build_quads,
};
pub use profiler::{ContextId, MeterScope, MeterToken, Profiler, thread_ordinal};
pub use reducer::{FrameTimeline, NormalizedInterval, TimelineLane};
pub use ring::TimedInterval;
pub use rotation::SlotState;
pub use stats::LabelTotal;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
