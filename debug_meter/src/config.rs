//! Profiler sizing and reporting configuration.

use crate::error::MeterError;

/// Upper bound on the number of meter contexts a profiler can own.
pub const MAX_CONTEXTS: usize = 64;

/// Default number of contexts (one per worker lane).
pub const DEFAULT_CONTEXTS: usize = 4;

/// Default number of frame slot generations.
pub const DEFAULT_FRAME_SLOTS: usize = 4;

/// Default ring capacity per context per frame slot.
pub const DEFAULT_CAPACITY: usize = 8192;

/// Default number of distinct region labels.
pub const DEFAULT_LABEL_CAPACITY: usize = 256;

/// Default number of frames between label total reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 1000;

/// Sizing for a [`Profiler`](crate::Profiler).
///
/// All storage is allocated once from these values when the profiler is
/// created. Nothing grows afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeterConfig {
    /// Number of independent timelines.
    pub contexts: usize,
    /// Number of frame slot generations. Power of two, at least 2.
    pub frame_slots: usize,
    /// Intervals per context per frame slot. Power of two, at least 2.
    pub capacity: usize,
    /// Maximum number of interned region labels, including the unnamed label.
    pub label_capacity: usize,
    /// Log accumulated label totals every N rotations. `None` disables it.
    pub report_interval: Option<u64>,
}

impl Default for MeterConfig {
    fn default() -> Self {
        Self {
            contexts: DEFAULT_CONTEXTS,
            frame_slots: DEFAULT_FRAME_SLOTS,
            capacity: DEFAULT_CAPACITY,
            label_capacity: DEFAULT_LABEL_CAPACITY,
            report_interval: Some(DEFAULT_REPORT_INTERVAL),
        }
    }
}

impl MeterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of contexts.
    pub fn with_contexts(mut self, contexts: usize) -> Self {
        self.contexts = contexts;
        self
    }

    /// Set the number of frame slot generations.
    pub fn with_frame_slots(mut self, frame_slots: usize) -> Self {
        self.frame_slots = frame_slots;
        self
    }

    /// Set the ring capacity per context.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Set the label table size.
    pub fn with_label_capacity(mut self, label_capacity: usize) -> Self {
        self.label_capacity = label_capacity;
        self
    }

    /// Set the report interval in frames.
    pub fn with_report_interval(mut self, report_interval: Option<u64>) -> Self {
        self.report_interval = report_interval.filter(|&n| n > 0);
        self
    }

    /// Check the invariants the ring arithmetic relies on.
    pub fn validate(&self) -> Result<(), MeterError> {
        if self.capacity < 2 || !self.capacity.is_power_of_two() {
            return Err(MeterError::CapacityNotPowerOfTwo(self.capacity));
        }
        if self.frame_slots < 2 || !self.frame_slots.is_power_of_two() {
            return Err(MeterError::InvalidFrameSlots(self.frame_slots));
        }
        if self.contexts == 0 || self.contexts > MAX_CONTEXTS {
            return Err(MeterError::InvalidContextCount(self.contexts));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = MeterConfig::default();
        assert_eq!(config.contexts, 4);
        assert_eq!(config.frame_slots, 4);
        assert_eq!(config.capacity, 8192);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_capacity_must_be_power_of_two() {
        let config = MeterConfig::new().with_capacity(1000);
        assert_eq!(
            config.validate(),
            Err(MeterError::CapacityNotPowerOfTwo(1000))
        );
        let config = MeterConfig::new().with_capacity(1);
        assert_eq!(config.validate(), Err(MeterError::CapacityNotPowerOfTwo(1)));
    }

    #[test]
    fn test_frame_slots_must_be_power_of_two() {
        assert_eq!(
            MeterConfig::new().with_frame_slots(3).validate(),
            Err(MeterError::InvalidFrameSlots(3))
        );
        assert_eq!(
            MeterConfig::new().with_frame_slots(1).validate(),
            Err(MeterError::InvalidFrameSlots(1))
        );
        assert!(MeterConfig::new().with_frame_slots(2).validate().is_ok());
    }

    #[test]
    fn test_context_bounds() {
        assert_eq!(
            MeterConfig::new().with_contexts(0).validate(),
            Err(MeterError::InvalidContextCount(0))
        );
        assert_eq!(
            MeterConfig::new().with_contexts(MAX_CONTEXTS + 1).validate(),
            Err(MeterError::InvalidContextCount(MAX_CONTEXTS + 1))
        );
    }

    #[test]
    fn test_zero_report_interval_disables_reports() {
        let config = MeterConfig::new().with_report_interval(Some(0));
        assert_eq!(config.report_interval, None);
    }
}
