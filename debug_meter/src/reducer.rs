//! Reduction of a published frame into normalized timeline coordinates.
//!
//! The frame window runs from the earliest interval start to the latest
//! interval end over every context. Each interval is expressed as a start and
//! a duration in `[0, 1]` of that window, and each context gets a fixed lane
//! so the layout does not jump between frames.

use crate::clock::Clock;
use crate::color::MeterColor;
use crate::label::{LabelId, UNNAMED_LABEL};
use crate::profiler::{ContextId, Profiler};
use crate::ring::{FrameSlot, TimedInterval};

/// One interval mapped into the frame window.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedInterval {
    /// Offset from the frame start, in `[0, 1]`.
    pub start: f32,
    /// Fraction of the frame window covered, in `[0, 1]`.
    pub duration: f32,
    pub color: MeterColor,
    pub label: LabelId,
    pub name: &'static str,
    pub processor: u32,
    /// The interval as recorded.
    pub raw: TimedInterval,
}

impl NormalizedInterval {
    /// Normalized end coordinate.
    pub fn end(&self) -> f32 {
        self.start + self.duration
    }
}

/// All intervals of one context.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineLane {
    pub context: ContextId,
    /// Lane ordinal among [`FrameTimeline::lane_count`] lanes.
    pub lane: usize,
    pub intervals: Vec<NormalizedInterval>,
    /// Intervals lost to ring wraparound during the frame.
    pub overflowed: usize,
    /// Ring index of the last completed interval.
    pub last_index: Option<usize>,
}

impl TimelineLane {
    /// Top edge of this lane as a fraction of the overlay height.
    pub fn lane_offset(&self, lane_count: usize) -> f32 {
        if lane_count == 0 {
            return 0.0;
        }
        self.lane as f32 / lane_count as f32
    }
}

/// The reduced last complete frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameTimeline {
    /// Slot the timeline was read from.
    pub slot: usize,
    /// Earliest start tick over all contexts.
    pub frame_start: u64,
    /// Latest end tick over all contexts.
    pub frame_end: u64,
    /// Fixed lane count used for layout.
    pub lane_count: usize,
    pub lanes: Vec<TimelineLane>,
}

impl FrameTimeline {
    /// Length of the frame window in ticks.
    pub fn span(&self) -> u64 {
        self.frame_end.saturating_sub(self.frame_start)
    }

    /// Whether the window has zero length.
    pub fn is_degenerate(&self) -> bool {
        self.span() == 0
    }

    pub fn interval_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.intervals.len()).sum()
    }

    pub fn overflowed(&self) -> usize {
        self.lanes.iter().map(|lane| lane.overflowed).sum()
    }

    pub fn lane(&self, context: ContextId) -> Option<&TimelineLane> {
        self.lanes.iter().find(|lane| lane.context == context)
    }

    /// Window length in milliseconds.
    pub fn span_millis(&self, clock: &dyn Clock) -> f64 {
        clock.ticks_to_millis(self.span())
    }
}

/// Min start / max end over every completed interval of the slot.
fn frame_window(slot: &FrameSlot) -> Option<(u64, u64)> {
    slot.contexts()
        .iter()
        .flat_map(|ring| ring.completed())
        .fold(None, |window, interval| {
            let (start, end) = window.unwrap_or((interval.start, interval.end));
            Some((start.min(interval.start), end.max(interval.end)))
        })
}

fn normalize(offset: u64, span: u64) -> f32 {
    if span == 0 {
        return 0.0;
    }
    (offset as f64 / span as f64) as f32
}

/// Reduce one published slot.
pub(crate) fn reduce_slot(
    slot_index: usize,
    slot: &FrameSlot,
    names: &[&'static str],
) -> FrameTimeline {
    let (frame_start, frame_end) = frame_window(slot).unwrap_or_default();
    let span = frame_end.saturating_sub(frame_start);
    let lane_count = slot.contexts().len();

    let lanes = slot
        .contexts()
        .iter()
        .enumerate()
        .map(|(lane, ring)| TimelineLane {
            context: ContextId::from_lane(lane),
            lane,
            intervals: ring
                .completed()
                .map(|raw| NormalizedInterval {
                    start: normalize(raw.start.saturating_sub(frame_start), span),
                    duration: normalize(raw.duration(), span),
                    color: raw.color,
                    label: raw.label,
                    name: names.get(raw.label.index()).copied().unwrap_or(UNNAMED_LABEL),
                    processor: raw.processor,
                    raw,
                })
                .collect(),
            overflowed: ring.overflowed(),
            last_index: ring.last_index(),
        })
        .collect();

    FrameTimeline {
        slot: slot_index,
        frame_start,
        frame_end,
        lane_count,
        lanes,
    }
}

impl<C: Clock> Profiler<C> {
    /// Reduce the last complete frame.
    ///
    /// Reads only the readable slot, so it may run while recorders fill the
    /// writable slot. It must finish before the slot cycles back to
    /// writable, [`safety_margin`](Self::safety_margin) rotations later.
    pub fn reduce(&self) -> FrameTimeline {
        reduce_slot(
            self.last_complete_slot(),
            self.published(),
            &self.label_snapshot(),
        )
    }
}
