//! Per-label time accumulated across completed frames.

use crate::clock::Clock;
use crate::label::LabelId;
use crate::ring::FrameSlot;

/// Accumulated time for one label.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelTotal {
    pub label: LabelId,
    pub name: &'static str,
    /// Sum of interval durations in clock ticks.
    pub ticks: u64,
    /// `ticks` converted with the clock frequency.
    pub millis: f64,
    /// Number of intervals that contributed.
    pub count: u64,
}

/// Running totals indexed by [`LabelId`].
///
/// Totals are summed over every context, so they are not normalized for the
/// number of lanes running in parallel.
#[derive(Debug, Default)]
pub(crate) struct LabelTotals {
    ticks: Vec<u64>,
    counts: Vec<u64>,
    frames: u64,
}

impl LabelTotals {
    pub fn new(label_capacity: usize) -> Self {
        Self {
            ticks: vec![0; label_capacity.max(1)],
            counts: vec![0; label_capacity.max(1)],
            frames: 0,
        }
    }

    /// Add every completed interval of a published slot.
    pub fn accumulate(&mut self, slot: &FrameSlot) {
        for ring in slot.contexts() {
            for interval in ring.completed() {
                let index = interval.label.index();
                if index < self.ticks.len() {
                    self.ticks[index] += interval.duration();
                    self.counts[index] += 1;
                }
            }
        }
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Labels with at least one recorded interval.
    pub fn totals(&self, names: &[&'static str], clock: &dyn Clock) -> Vec<LabelTotal> {
        self.ticks
            .iter()
            .zip(&self.counts)
            .enumerate()
            .filter(|&(_, (_, &count))| count > 0)
            .map(|(index, (&ticks, &count))| LabelTotal {
                label: LabelId(index as u32),
                name: names
                    .get(index)
                    .copied()
                    .unwrap_or(crate::label::UNNAMED_LABEL),
                ticks,
                millis: clock.ticks_to_millis(ticks),
                count,
            })
            .collect()
    }

    /// Log one line per label.
    pub fn log_report(&self, names: &[&'static str], clock: &dyn Clock) {
        log::info!("Meter totals after {} frames:", self.frames);
        for total in self.totals(names, clock) {
            log::info!(
                "{:8.2} ms, {} ({} regions)",
                total.millis,
                total.name,
                total.count
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::color::MeterColor;

    #[test]
    fn test_accumulate_by_label() {
        let slot = FrameSlot::new(2, 8);
        let ring = slot.context(0);
        ring.begin(0, MeterColor::DEFAULT, LabelId(1), 0);
        ring.end(40);
        ring.begin(50, MeterColor::DEFAULT, LabelId(1), 0);
        ring.end(60);
        let other = slot.context(1);
        other.begin(0, MeterColor::DEFAULT, LabelId(2), 1);
        other.end(5);

        let mut totals = LabelTotals::new(4);
        totals.accumulate(&slot);
        totals.accumulate(&slot);

        let clock = ManualClock::new(1000);
        let names = ["NAME ME", "Animate", "UI"];
        let report = totals.totals(&names, &clock);
        assert_eq!(report.len(), 2);
        assert_eq!(report[0].name, "Animate");
        assert_eq!(report[0].ticks, 100);
        assert_eq!(report[0].count, 4);
        assert_eq!(report[0].millis, 100.0);
        assert_eq!(report[1].ticks, 10);
        assert_eq!(totals.frames(), 2);
    }
}
