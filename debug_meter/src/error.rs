//! Error types for meter setup.
//!
//! Recording, rotation and reduction have no failure path; only building a
//! [`Profiler`](crate::Profiler) and acquiring contexts can fail.

use thiserror::Error;

/// Errors that can occur while configuring a profiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeterError {
    /// Ring capacity must be a power of two (and at least 2) so index
    /// masking matches modulo.
    #[error("ring capacity {0} is not a power of two >= 2")]
    CapacityNotPowerOfTwo(usize),
    /// Frame slot count must be a power of two (and at least 2).
    #[error("frame slot count {0} is not a power of two >= 2")]
    InvalidFrameSlots(usize),
    /// Context count out of range.
    #[error("context count {0} is outside 1..={}", crate::config::MAX_CONTEXTS)]
    InvalidContextCount(usize),
    /// Every context slot has already been handed out.
    #[error("all {max} meter contexts are in use")]
    ContextsExhausted {
        /// Number of contexts the profiler was built with.
        max: usize,
    },
}
