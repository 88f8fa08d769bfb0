//! Frame slot lifecycle.
//!
//! Every slot is in exactly one [`SlotState`]. A rotation advances all slots
//! at once:
//!
//! ```text
//! Writable -> Readable -> Cooling(1) -> ... -> Cooling(N - 2) -> Writable
//! ```
//!
//! With `N` slots a slot is published as readable one rotation after it was
//! writable and is handed back to recorders `N - 1` rotations after that.

/// Lifecycle state of a frame slot.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// Recorders append to this slot.
    Writable,
    /// The last complete frame; the reducer reads it.
    Readable,
    /// Retired. The payload counts rotations since the slot stopped being
    /// readable.
    Cooling(u32),
}

impl SlotState {
    /// State after one more rotation in a ring of `slot_count` slots.
    pub fn next(self, slot_count: usize) -> Self {
        let last_cooling = slot_count.saturating_sub(2) as u32;
        match self {
            Self::Writable => Self::Readable,
            Self::Readable if last_cooling == 0 => Self::Writable,
            Self::Readable => Self::Cooling(1),
            Self::Cooling(k) if k >= last_cooling => Self::Writable,
            Self::Cooling(k) => Self::Cooling(k + 1),
        }
    }

    /// State of the slot `age` rotations behind the writable one.
    pub fn for_age(age: usize) -> Self {
        match age {
            0 => Self::Writable,
            1 => Self::Readable,
            k => Self::Cooling((k - 1) as u32),
        }
    }
}

/// Rotation bookkeeping for `N` frame slots.
#[derive(Debug, Clone)]
pub(crate) struct SlotRing {
    states: Vec<SlotState>,
    current: usize,
    rotations: u64,
}

impl SlotRing {
    /// Slot 0 starts writable; the slot before it is readable (and empty).
    pub fn new(slot_count: usize) -> Self {
        debug_assert!(slot_count >= 2);
        let states = (0..slot_count)
            .map(|slot| SlotState::for_age((slot_count - slot) % slot_count))
            .collect();
        Self {
            states,
            current: 0,
            rotations: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Index of the readable slot.
    pub fn last_complete(&self) -> usize {
        (self.current + self.len() - 1) & (self.len() - 1)
    }

    pub fn state(&self, slot: usize) -> SlotState {
        self.states[slot]
    }

    pub fn rotations(&self) -> u64 {
        self.rotations
    }

    /// Rotations a readable slot survives before recorders reuse it.
    pub fn safety_margin(&self) -> usize {
        self.len() - 1
    }

    /// Advance every slot. Returns `(published, writable)` slot indices.
    pub fn rotate(&mut self) -> (usize, usize) {
        let slot_count = self.len();
        for state in &mut self.states {
            *state = state.next(slot_count);
        }
        let published = self.current;
        self.current = (self.current + 1) & (slot_count - 1);
        self.rotations += 1;

        debug_assert_eq!(self.states[published], SlotState::Readable);
        debug_assert_eq!(self.states[self.current], SlotState::Writable);
        (published, self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_states() {
        let ring = SlotRing::new(4);
        assert_eq!(ring.state(0), SlotState::Writable);
        assert_eq!(ring.state(3), SlotState::Readable);
        assert_eq!(ring.state(2), SlotState::Cooling(1));
        assert_eq!(ring.state(1), SlotState::Cooling(2));
        assert_eq!(ring.last_complete(), 3);
    }

    #[test]
    fn test_rotation_advances_all_slots() {
        let mut ring = SlotRing::new(4);
        let (published, writable) = ring.rotate();
        assert_eq!((published, writable), (0, 1));
        assert_eq!(ring.state(0), SlotState::Readable);
        assert_eq!(ring.state(1), SlotState::Writable);
        assert_eq!(ring.state(2), SlotState::Cooling(2));
        assert_eq!(ring.state(3), SlotState::Cooling(1));
        assert_eq!(ring.last_complete(), 0);
    }

    #[test]
    fn test_exactly_one_writable_and_one_readable() {
        for slots in [2usize, 4, 8] {
            let mut ring = SlotRing::new(slots);
            for _ in 0..(slots * 3) {
                ring.rotate();
                let writable = (0..slots)
                    .filter(|&s| ring.state(s) == SlotState::Writable)
                    .count();
                let readable = (0..slots)
                    .filter(|&s| ring.state(s) == SlotState::Readable)
                    .count();
                assert_eq!((writable, readable), (1, 1));
                assert_ne!(ring.current(), ring.last_complete());
            }
        }
    }

    #[test]
    fn test_readable_slot_reused_after_margin() {
        let mut ring = SlotRing::new(4);
        let (published, _) = ring.rotate();
        let margin = ring.safety_margin();
        assert_eq!(margin, 3);

        for _ in 1..margin {
            ring.rotate();
            assert_ne!(ring.state(published), SlotState::Writable);
        }
        ring.rotate();
        assert_eq!(ring.state(published), SlotState::Writable);
    }

    #[test]
    fn test_two_slots_ping_pong() {
        let mut ring = SlotRing::new(2);
        ring.rotate();
        assert_eq!(ring.state(0), SlotState::Readable);
        assert_eq!(ring.state(1), SlotState::Writable);
        ring.rotate();
        assert_eq!(ring.state(0), SlotState::Writable);
        assert_eq!(ring.state(1), SlotState::Readable);
    }
}
