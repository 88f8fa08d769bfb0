//! Timestamp sources for meters.
//!
//! Only relative durations are ever computed from ticks; absolute values are
//! never persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// A monotonic high-resolution tick counter.
pub trait Clock: Send + Sync {
    /// Current tick count. Must never decrease.
    fn now(&self) -> u64;

    /// Ticks per second.
    fn frequency(&self) -> u64;

    /// Convert a tick delta to milliseconds.
    fn ticks_to_millis(&self, ticks: u64) -> f64 {
        let frequency = self.frequency();
        if frequency == 0 {
            return 0.0;
        }
        ticks as f64 * 1000.0 / frequency as f64
    }
}

/// Nanosecond ticks measured from the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }

    fn frequency(&self) -> u64 {
        1_000_000_000
    }
}

/// A clock whose ticks are set explicitly.
///
/// Used for deterministic tests and for replaying captured timings.
#[derive(Debug)]
pub struct ManualClock {
    ticks: AtomicU64,
    frequency: u64,
}

impl ManualClock {
    /// Create a clock at tick 0 with the given frequency.
    pub fn new(frequency: u64) -> Self {
        Self {
            ticks: AtomicU64::new(0),
            frequency,
        }
    }

    /// Jump to an absolute tick value.
    pub fn set(&self, ticks: u64) {
        self.ticks.store(ticks, Ordering::Release);
    }

    /// Move forward by `delta` ticks.
    pub fn advance(&self, delta: u64) {
        self.ticks.fetch_add(delta, Ordering::AcqRel);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_000_000_000)
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    fn frequency(&self) -> u64 {
        self.frequency
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_never_decreases() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::new(1000);
        assert_eq!(clock.now(), 0);
        clock.set(100);
        clock.advance(50);
        assert_eq!(clock.now(), 150);
        assert_eq!(clock.ticks_to_millis(500), 500.0);
    }

    #[test]
    fn test_zero_frequency_millis() {
        let clock = ManualClock::new(0);
        assert_eq!(clock.ticks_to_millis(10), 0.0);
    }
}
