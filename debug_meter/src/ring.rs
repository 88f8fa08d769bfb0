//! Fixed-capacity timestamp rings.
//!
//! Each [`FrameSlot`] owns one [`ContextRing`] per context. A ring is written
//! by exactly one thread (the owner of the context) and read by the reducer
//! only after the slot has been published, so every access uses relaxed
//! atomics; ordering between writers and the reader is provided by the
//! caller's frame barrier.
//!
//! Cursors only ever increase within a frame. The physical index is always
//! `cursor & (capacity - 1)`, so once a frame records more than `capacity`
//! regions the oldest entries are silently overwritten.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicUsize, Ordering};

use crate::color::MeterColor;
use crate::label::LabelId;

/// A completed, timed region as stored in a ring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimedInterval {
    /// Tick at which the region began.
    pub start: u64,
    /// Tick at which the region ended.
    pub end: u64,
    /// Color/category tag.
    pub color: MeterColor,
    /// Interned region name.
    pub label: LabelId,
    /// Ordinal of the thread that opened the region.
    pub processor: u32,
}

impl TimedInterval {
    /// Elapsed ticks, zero if the timestamps are out of order.
    pub fn duration(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Default)]
struct RingEntry {
    start: AtomicU64,
    end: AtomicU64,
    color: AtomicU32,
    label: AtomicU32,
    processor: AtomicU32,
}

impl RingEntry {
    fn load(&self) -> TimedInterval {
        TimedInterval {
            start: self.start.load(Ordering::Relaxed),
            end: self.end.load(Ordering::Relaxed),
            color: MeterColor(self.color.load(Ordering::Relaxed)),
            label: LabelId(self.label.load(Ordering::Relaxed)),
            processor: self.processor.load(Ordering::Relaxed),
        }
    }

    fn zero(&self) {
        self.start.store(0, Ordering::Relaxed);
        self.end.store(0, Ordering::Relaxed);
        self.color.store(0, Ordering::Relaxed);
        self.label.store(0, Ordering::Relaxed);
        self.processor.store(0, Ordering::Relaxed);
    }
}

/// One context's timeline within one frame slot.
pub(crate) struct ContextRing {
    start_cursor: AtomicUsize,
    end_cursor: AtomicUsize,
    overflowed: AtomicUsize,
    entries: Box<[RingEntry]>,
    mask: usize,
}

impl ContextRing {
    /// `capacity` must be a power of two.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            start_cursor: AtomicUsize::new(0),
            end_cursor: AtomicUsize::new(0),
            overflowed: AtomicUsize::new(0),
            entries: (0..capacity).map(|_| RingEntry::default()).collect(),
            mask: capacity - 1,
        }
    }

    pub fn capacity(&self) -> usize {
        self.mask + 1
    }

    /// Claim the next slot and stamp its start. Returns the physical index.
    #[inline]
    pub fn begin(
        &self,
        ticks: u64,
        color: MeterColor,
        label: LabelId,
        processor: u32,
    ) -> usize {
        let raw = self.start_cursor.load(Ordering::Relaxed);
        self.start_cursor.store(raw.wrapping_add(1), Ordering::Relaxed);
        if raw > self.mask {
            self.overflowed.fetch_add(1, Ordering::Relaxed);
        }

        let index = raw & self.mask;
        let entry = &self.entries[index];
        entry.start.store(ticks, Ordering::Relaxed);
        entry.end.store(ticks, Ordering::Relaxed);
        entry.color.store(color.0, Ordering::Relaxed);
        entry.label.store(label.0, Ordering::Relaxed);
        entry.processor.store(processor, Ordering::Relaxed);
        index
    }

    /// Stamp the end of the oldest open region.
    ///
    /// Returns the physical index written, or `None` if there is no open
    /// region (the end cursor never passes the start cursor).
    #[inline]
    pub fn end(&self, ticks: u64) -> Option<usize> {
        let raw = self.end_cursor.load(Ordering::Relaxed);
        if raw >= self.start_cursor.load(Ordering::Relaxed) {
            return None;
        }
        self.end_cursor.store(raw.wrapping_add(1), Ordering::Relaxed);

        let index = raw & self.mask;
        self.entries[index].end.store(ticks, Ordering::Relaxed);
        Some(index)
    }

    pub fn start_cursor(&self) -> usize {
        self.start_cursor.load(Ordering::Relaxed)
    }

    pub fn end_cursor(&self) -> usize {
        self.end_cursor.load(Ordering::Relaxed)
    }

    /// Regions begun but not yet ended.
    pub fn depth(&self) -> usize {
        self.start_cursor().saturating_sub(self.end_cursor())
    }

    /// Number of begins that overwrote an earlier entry this frame.
    pub fn overflowed(&self) -> usize {
        self.overflowed.load(Ordering::Relaxed)
    }

    /// Physical index of the most recently completed interval.
    pub fn last_index(&self) -> Option<usize> {
        self.end_cursor().checked_sub(1).map(|raw| raw & self.mask)
    }

    /// Number of completed intervals still held by the ring.
    pub fn completed_len(&self) -> usize {
        self.end_cursor().min(self.capacity())
    }

    /// Completed intervals, oldest first.
    pub fn completed(&self) -> impl Iterator<Item = TimedInterval> + '_ {
        let end = self.end_cursor();
        let first = end - end.min(self.capacity());
        (first..end).map(move |raw| self.entries[raw & self.mask].load())
    }

    /// Read the entry at a physical index.
    #[cfg(test)]
    pub fn entry(&self, index: usize) -> TimedInterval {
        self.entries[index & self.mask].load()
    }

    /// Zero the cursors and every entry written since the last clear.
    pub fn clear(&self) {
        let used = self.start_cursor().max(self.end_cursor()).min(self.capacity());
        for entry in &self.entries[..used] {
            entry.zero();
        }
        self.start_cursor.store(0, Ordering::Relaxed);
        self.end_cursor.store(0, Ordering::Relaxed);
        self.overflowed.store(0, Ordering::Relaxed);
    }
}

/// One frame generation: a ring per context.
pub(crate) struct FrameSlot {
    contexts: Box<[ContextRing]>,
}

impl FrameSlot {
    pub fn new(contexts: usize, capacity: usize) -> Self {
        Self {
            contexts: (0..contexts).map(|_| ContextRing::new(capacity)).collect(),
        }
    }

    #[cfg(test)]
    pub fn context(&self, index: usize) -> &ContextRing {
        &self.contexts[index]
    }

    pub fn contexts(&self) -> &[ContextRing] {
        &self.contexts
    }

    /// Total completed intervals across contexts.
    pub fn completed_len(&self) -> usize {
        self.contexts.iter().map(ContextRing::completed_len).sum()
    }

    pub fn clear(&self) {
        for ring in self.contexts.iter() {
            ring.clear();
        }
    }
}
