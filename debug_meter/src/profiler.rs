use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::clock::{Clock, MonotonicClock};
use crate::color::MeterColor;
use crate::config::MeterConfig;
use crate::error::MeterError;
use crate::label::{LabelId, LabelTable};
use crate::ring::{FrameSlot, TimedInterval};
use crate::rotation::{SlotRing, SlotState};
use crate::stats::{LabelTotal, LabelTotals};

static NEXT_THREAD_ORDINAL: AtomicU32 = AtomicU32::new(0);

thread_local! {
    static THREAD_ORDINAL: u32 = NEXT_THREAD_ORDINAL.fetch_add(1, Ordering::Relaxed);
}

/// Stable small integer identifying the calling thread.
///
/// Assigned on first use; recorded with every interval as its originating
/// processor.
pub fn thread_ordinal() -> u32 {
    THREAD_ORDINAL.with(|ordinal| *ordinal)
}

/// Handle to one of the profiler's independent timelines.
///
/// Obtain via [`Profiler::acquire_context`]. A context must only be recorded
/// into by one thread at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(u32);

impl ContextId {
    /// Lane ordinal of this context.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_lane(lane: usize) -> Self {
        Self(lane as u32)
    }
}

/// Value returned by [`Profiler::begin_region`].
///
/// Holds the ring index the region was written to. Region ends are paired
/// with begins in call order, not through the token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MeterToken(u32);

impl MeterToken {
    /// Returned while recording is disabled.
    pub const DISABLED: Self = Self(u32::MAX);

    pub fn is_disabled(self) -> bool {
        self == Self::DISABLED
    }

    /// Ring index of the region, `None` for [`MeterToken::DISABLED`].
    pub fn index(self) -> Option<usize> {
        (!self.is_disabled()).then_some(self.0 as usize)
    }
}

struct RotationState {
    slots: SlotRing,
    totals: LabelTotals,
}

/// Multi-context, multi-frame region timer.
///
/// Uses `N` frame slots (see [`SlotState`]):
/// - the writable slot receives [`begin_region`](Self::begin_region) /
///   [`end_region`](Self::end_region) calls from worker threads
/// - the readable slot holds the last complete frame, consumed by
///   [`reduce`](Self::reduce)
///
/// Call [`reset_frame`](Self::reset_frame) once per frame after every
/// recorder of the frame has finished (for example after joining the
/// frame's worker tasks). Recording never blocks or allocates; only
/// rotation takes a lock.
pub struct Profiler<C: Clock = MonotonicClock> {
    config: MeterConfig,
    clock: C,
    enabled: AtomicBool,
    slots: Box<[FrameSlot]>,
    current: AtomicUsize,
    last_complete: AtomicUsize,
    next_context: AtomicUsize,
    labels: LabelTable,
    rotation: Mutex<RotationState>,
}

impl Profiler<MonotonicClock> {
    /// Create a profiler timed by a [`MonotonicClock`].
    pub fn new(config: MeterConfig) -> Result<Self, MeterError> {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Profiler<C> {
    /// Create a profiler with an explicit clock.
    ///
    /// All ring storage is allocated here.
    pub fn with_clock(config: MeterConfig, clock: C) -> Result<Self, MeterError> {
        config.validate()?;

        let slots: Box<[FrameSlot]> = (0..config.frame_slots)
            .map(|_| FrameSlot::new(config.contexts, config.capacity))
            .collect();
        let slot_ring = SlotRing::new(config.frame_slots);

        log::debug!(
            "Profiler created: {} contexts, {} frame slots, {} entries per ring",
            config.contexts,
            config.frame_slots,
            config.capacity
        );

        Ok(Self {
            current: AtomicUsize::new(slot_ring.current()),
            last_complete: AtomicUsize::new(slot_ring.last_complete()),
            labels: LabelTable::new(config.label_capacity),
            rotation: Mutex::new(RotationState {
                slots: slot_ring,
                totals: LabelTotals::new(config.label_capacity),
            }),
            enabled: AtomicBool::new(true),
            next_context: AtomicUsize::new(0),
            slots,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &MeterConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Turn recording on or off.
    ///
    /// While disabled, begin/end calls return immediately without reading
    /// the clock or moving any cursor.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    /// Hand out the next free context. Contexts are never returned.
    pub fn acquire_context(&self) -> Result<ContextId, MeterError> {
        let max = self.config.contexts;
        let index = self
            .next_context
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < max).then_some(n + 1)
            })
            .map_err(|_| MeterError::ContextsExhausted { max })?;
        Ok(ContextId::from_lane(index))
    }

    /// Acquire every remaining context, in lane order.
    pub fn acquire_all_contexts(&self) -> Vec<ContextId> {
        std::iter::from_fn(|| self.acquire_context().ok()).collect()
    }

    /// Number of lanes (configured contexts).
    pub fn context_count(&self) -> usize {
        self.config.contexts
    }

    /// Intern a region name.
    pub fn label(&self, name: &'static str) -> LabelId {
        self.labels.intern(name)
    }

    pub fn label_name(&self, label: LabelId) -> &'static str {
        self.labels.name(label)
    }

    pub(crate) fn label_snapshot(&self) -> Vec<&'static str> {
        self.labels.snapshot()
    }

    /// Open a region on `context`.
    ///
    /// Regions on one context must be closed in the order they were opened.
    #[inline]
    pub fn begin_region(
        &self,
        context: ContextId,
        color: MeterColor,
        label: LabelId,
    ) -> MeterToken {
        if !self.is_enabled() {
            return MeterToken::DISABLED;
        }
        let slot = &self.slots[self.current.load(Ordering::Acquire)];
        let Some(ring) = slot.contexts().get(context.index()) else {
            return MeterToken::DISABLED;
        };
        let index = ring.begin(self.clock.now(), color, label, thread_ordinal());
        MeterToken(index as u32)
    }

    /// Close the oldest open region on `context`.
    ///
    /// The end time is written to the slot following the previous end on
    /// this context, independent of `token`. A disabled token is ignored.
    #[inline]
    pub fn end_region(&self, context: ContextId, token: MeterToken) {
        if !self.is_enabled() || token.is_disabled() {
            return;
        }
        let slot = &self.slots[self.current.load(Ordering::Acquire)];
        if let Some(ring) = slot.contexts().get(context.index()) {
            ring.end(self.clock.now());
        }
    }

    /// Open a region that closes when the returned guard is dropped.
    #[inline]
    pub fn scope(
        &self,
        context: ContextId,
        color: MeterColor,
        label: LabelId,
    ) -> MeterScope<'_, C> {
        MeterScope {
            profiler: self,
            context,
            token: self.begin_region(context, color, label),
        }
    }

    /// Rotate frame slots.
    ///
    /// Publishes the slot recorded so far as the last complete frame,
    /// clears the next slot for writing and seeds each of its contexts with
    /// a zero-length interval. Must not run concurrently with recorders.
    pub fn reset_frame(&self) {
        let mut rotation = self.rotation.lock();
        let (published, writable) = rotation.slots.rotate();

        self.slots[writable].clear();
        self.last_complete.store(published, Ordering::Release);
        self.current.store(writable, Ordering::Release);

        let published_slot = &self.slots[published];
        for (index, ring) in published_slot.contexts().iter().enumerate() {
            let lost = ring.overflowed();
            if lost > 0 {
                log::warn!(
                    "Meter context {} overflowed: {} intervals overwritten in one frame",
                    index,
                    lost
                );
            }
            let open = ring.depth();
            if open > 0 {
                log::warn!(
                    "Meter context {} ended the frame with {} open regions",
                    index,
                    open
                );
            }
        }

        rotation.totals.accumulate(published_slot);
        if let Some(interval) = self.config.report_interval {
            if rotation.totals.frames() % interval == 0 {
                rotation
                    .totals
                    .log_report(&self.labels.snapshot(), &self.clock);
            }
        }

        if self.is_enabled() {
            let now = self.clock.now();
            let processor = thread_ordinal();
            for ring in self.slots[writable].contexts() {
                ring.begin(now, MeterColor::SEED, LabelId::UNNAMED, processor);
                ring.end(now);
            }
        }

        log::trace!(
            "Meter rotation {}: slot {} readable ({} intervals), slot {} writable",
            rotation.slots.rotations(),
            published,
            published_slot.completed_len(),
            writable
        );
    }

    /// Stop recording and drop all recorded data.
    ///
    /// Accumulated label totals stay queryable and are logged one last time.
    pub fn shutdown(&self) {
        self.set_enabled(false);
        let rotation = self.rotation.lock();
        if rotation.totals.frames() > 0 {
            rotation
                .totals
                .log_report(&self.labels.snapshot(), &self.clock);
        }
        for slot in self.slots.iter() {
            slot.clear();
        }
        log::debug!(
            "Profiler shut down after {} rotations",
            rotation.slots.rotations()
        );
    }

    /// Index of the slot recorders currently write to.
    pub fn current_slot(&self) -> usize {
        self.current.load(Ordering::Acquire)
    }

    /// Index of the last complete (readable) slot.
    pub fn last_complete_slot(&self) -> usize {
        self.last_complete.load(Ordering::Acquire)
    }

    pub(crate) fn published(&self) -> &FrameSlot {
        &self.slots[self.last_complete_slot()]
    }

    pub fn slot_state(&self, slot: usize) -> SlotState {
        self.rotation.lock().slots.state(slot)
    }

    /// Number of [`reset_frame`](Self::reset_frame) calls so far.
    pub fn rotations(&self) -> u64 {
        self.rotation.lock().slots.rotations()
    }

    /// Rotations a published frame stays intact before recorders reuse it.
    pub fn safety_margin(&self) -> usize {
        self.rotation.lock().slots.safety_margin()
    }

    /// Intervals overwritten by ring wraparound in the last complete frame.
    pub fn overflow_count(&self) -> usize {
        self.published()
            .contexts()
            .iter()
            .map(|ring| ring.overflowed())
            .sum()
    }

    /// Highest ring index completed on `context` in the last complete frame.
    pub fn last_index(&self, context: ContextId) -> Option<usize> {
        self.published()
            .contexts()
            .get(context.index())
            .and_then(|ring| ring.last_index())
    }

    /// Raw intervals of `context` in the last complete frame, oldest first.
    pub fn completed_intervals(&self, context: ContextId) -> Vec<TimedInterval> {
        self.published()
            .contexts()
            .get(context.index())
            .map(|ring| ring.completed().collect())
            .unwrap_or_default()
    }

    /// `(start cursor, end cursor)` of `context` in the writable slot.
    pub fn cursors(&self, context: ContextId) -> (usize, usize) {
        let slot = &self.slots[self.current_slot()];
        slot.contexts()
            .get(context.index())
            .map(|ring| (ring.start_cursor(), ring.end_cursor()))
            .unwrap_or((0, 0))
    }

    /// Accumulated time per label over every completed frame.
    pub fn label_totals(&self) -> Vec<LabelTotal> {
        let rotation = self.rotation.lock();
        rotation.totals.totals(&self.labels.snapshot(), &self.clock)
    }
}

/// RAII guard for a region opened with [`Profiler::scope`].
pub struct MeterScope<'a, C: Clock> {
    profiler: &'a Profiler<C>,
    context: ContextId,
    token: MeterToken,
}

impl<C: Clock> MeterScope<'_, C> {
    pub fn token(&self) -> MeterToken {
        self.token
    }
}

impl<C: Clock> Drop for MeterScope<'_, C> {
    fn drop(&mut self) {
        self.profiler.end_region(self.context, self.token);
    }
}

/// Time the rest of the enclosing scope on a meter context.
///
/// ```ignore
/// let animate = profiler.label("Animate Models");
/// meter_scope!(profiler, context, animate);
/// meter_scope!(profiler, context, MeterColor::from_rgba(0, 255, 0, 128), animate);
/// ```
#[macro_export]
macro_rules! meter_scope {
    ($profiler:expr, $context:expr, $label:expr) => {
        let _meter_scope = $profiler.scope($context, $crate::MeterColor::DEFAULT, $label);
    };
    ($profiler:expr, $context:expr, $color:expr, $label:expr) => {
        let _meter_scope = $profiler.scope($context, $color, $label);
    };
}
