/*!
 * Mutex Registry
 * Bounded pool of named mutexes
 */

use super::types::{MutexInfo, MutexSlot};

/// Fixed-capacity pool of named mutexes. A `None` slot is free; slots are
/// claimed by a lowest-free scan and reclaimed when their reference count
/// returns to zero.
#[derive(Debug)]
pub struct MutexRegistry {
    slots: Vec<Option<MutexSlot>>,
}

impl MutexRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
        }
    }

    /// Index of the active mutex with this name, if any.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|m| m.name == name))
    }

    /// Lowest free slot index.
    pub fn lowest_free(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub fn install(&mut self, index: usize, slot: MutexSlot) {
        debug_assert!(self.slots[index].is_none());
        self.slots[index] = Some(slot);
    }

    /// Free a slot, making its name creatable again.
    pub fn reclaim(&mut self, index: usize) {
        self.slots[index] = None;
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<&MutexSlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> Option<&mut MutexSlot> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Number of active mutexes.
    pub fn active(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn infos(&self) -> Vec<MutexInfo> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                slot.as_ref().map(|m| MutexInfo {
                    index,
                    name: m.name.clone(),
                    kind: m.kind,
                    owner: m.owner,
                    hold: m.hold,
                    refs: m.refs,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Pid;
    use crate::sync::types::MutexKind;

    fn slot(name: &str, owner: Pid) -> MutexSlot {
        MutexSlot {
            name: name.to_string(),
            kind: MutexKind::Recursive,
            owner,
            hold: 0,
            refs: 1,
        }
    }

    #[test]
    fn lowest_free_scan() {
        let mut registry = MutexRegistry::new(3);
        assert_eq!(registry.lowest_free(), Some(0));
        registry.install(0, slot("a", 1));
        registry.install(1, slot("b", 1));
        assert_eq!(registry.lowest_free(), Some(2));
        registry.reclaim(0);
        assert_eq!(registry.lowest_free(), Some(0));
    }

    #[test]
    fn find_sees_only_active_slots() {
        let mut registry = MutexRegistry::new(2);
        registry.install(1, slot("a", 1));
        assert_eq!(registry.find("a"), Some(1));
        registry.reclaim(1);
        assert_eq!(registry.find("a"), None);
    }

    #[test]
    fn capacity_zero_never_frees() {
        let registry = MutexRegistry::new(0);
        assert_eq!(registry.lowest_free(), None);
        assert_eq!(registry.active(), 0);
    }
}
