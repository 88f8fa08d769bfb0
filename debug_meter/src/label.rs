//! Interned region names.
//!
//! Recording stores a 32-bit [`LabelId`] per interval so the hot path never
//! touches strings. Names are registered up front through
//! [`Profiler::label`](crate::Profiler::label).

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

/// Name shown for regions recorded without a label.
pub const UNNAMED_LABEL: &str = "NAME ME";

/// Handle to an interned region name.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub(crate) u32);

impl LabelId {
    /// The label of regions recorded without a name.
    pub const UNNAMED: Self = Self(0);

    /// Table index of this label.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fixed-capacity string interner.
///
/// Best-effort: once full, new names resolve to [`LabelId::UNNAMED`].
pub(crate) struct LabelTable {
    names: RwLock<Vec<&'static str>>,
    capacity: usize,
    exhausted: AtomicBool,
}

impl LabelTable {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut names = Vec::with_capacity(capacity);
        names.push(UNNAMED_LABEL);
        Self {
            names: RwLock::new(names),
            capacity,
            exhausted: AtomicBool::new(false),
        }
    }

    /// Intern `name`, returning the existing id if it was seen before.
    pub fn intern(&self, name: &'static str) -> LabelId {
        if let Some(id) = Self::find(&self.names.read(), name) {
            return id;
        }

        let mut names = self.names.write();
        if let Some(id) = Self::find(&names, name) {
            return id;
        }
        if names.len() >= self.capacity {
            if !self.exhausted.swap(true, Ordering::Relaxed) {
                log::warn!(
                    "Meter label table full ({} entries); '{}' and later labels are unnamed",
                    self.capacity,
                    name
                );
            }
            return LabelId::UNNAMED;
        }
        names.push(name);
        LabelId((names.len() - 1) as u32)
    }

    /// Resolve an id. Unknown ids resolve to the unnamed label.
    pub fn name(&self, id: LabelId) -> &'static str {
        self.names
            .read()
            .get(id.index())
            .copied()
            .unwrap_or(UNNAMED_LABEL)
    }

    /// Copy of every registered name, indexed by [`LabelId::index`].
    pub fn snapshot(&self) -> Vec<&'static str> {
        self.names.read().clone()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    fn find(names: &[&'static str], name: &str) -> Option<LabelId> {
        names
            .iter()
            .position(|&n| n == name)
            .map(|i| LabelId(i as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_stable() {
        let table = LabelTable::new(8);
        let a = table.intern("Animate Models");
        let b = table.intern("Render UI");
        assert_ne!(a, b);
        assert_eq!(table.intern("Animate Models"), a);
        assert_eq!(table.name(a), "Animate Models");
        assert_eq!(table.name(LabelId::UNNAMED), UNNAMED_LABEL);
    }

    #[test]
    fn test_full_table_falls_back_to_unnamed() {
        let table = LabelTable::new(2);
        let a = table.intern("first");
        assert_eq!(a.index(), 1);
        assert_eq!(table.intern("second"), LabelId::UNNAMED);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_unknown_id_resolves_to_unnamed() {
        let table = LabelTable::new(4);
        assert_eq!(table.name(LabelId(99)), UNNAMED_LABEL);
    }
}
