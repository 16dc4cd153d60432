/*!
 * Process Table
 * Fixed-capacity arena of process records
 */

use super::types::{Pcb, ProcessState};
use crate::core::types::Pid;

/// Fixed-capacity slot array. Slots are found by a lowest-free-index scan
/// (the tables are small and the policy keeps dispatch order
/// deterministic), reclaimed only at termination, and never compacted.
#[derive(Debug)]
pub struct ProcessTable {
    slots: Vec<Pcb>,
}

impl ProcessTable {
    pub fn new(capacity: usize, descriptor_slots: usize) -> Self {
        Self {
            slots: (0..capacity)
                .map(|pid| Pcb::new(pid as Pid, descriptor_slots))
                .collect(),
        }
    }

    /// Lowest free slot index, or `None` when the table is full. The slot
    /// only counts as taken once its state leaves `Unused`.
    #[must_use]
    pub fn allocate(&self) -> Option<Pid> {
        self.slots.iter().find(|pcb| pcb.is_unused()).map(|pcb| pcb.pid)
    }

    /// Reclaim a slot, making its pid reusable.
    pub fn free(&mut self, pid: Pid) {
        self.slots[pid as usize].reset();
    }

    #[inline]
    pub fn slot(&self, pid: Pid) -> &Pcb {
        &self.slots[pid as usize]
    }

    #[inline]
    pub fn slot_mut(&mut self, pid: Pid) -> &mut Pcb {
        &mut self.slots[pid as usize]
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently allocated.
    pub fn live(&self) -> usize {
        self.slots.iter().filter(|pcb| !pcb.is_unused()).count()
    }

    pub fn iter_live(&self) -> impl Iterator<Item = &Pcb> {
        self.slots.iter().filter(|pcb| !pcb.is_unused())
    }
}
