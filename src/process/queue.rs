/*!
 * Process Queues
 * FIFO queues threaded through the process-table arena
 */

use super::table::ProcessTable;
use crate::core::types::Pid;

/// FIFO queue over process-table slots.
///
/// Holds only a head/tail pair; the links live in each slot's `next`
/// field, so a process belongs to at most one queue at a time and a queue
/// never owns a process. Used for the ready queue, the sleeping list, and
/// the shared lock-wait queue. All mutating call sites run with the
/// interrupt level raised, so the operations never race themselves.
#[derive(Debug, Default)]
pub struct Queue {
    head: Option<Pid>,
    tail: Option<Pid>,
    len: usize,
}

impl Queue {
    pub const fn new() -> Self {
        Self {
            head: None,
            tail: None,
            len: 0,
        }
    }

    #[inline]
    pub fn head(&self) -> Option<Pid> {
        self.head
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Append at the tail. O(1).
    pub fn push_back(&mut self, table: &mut ProcessTable, pid: Pid) {
        debug_assert!(table.slot(pid).next.is_none() && self.tail != Some(pid));
        table.slot_mut(pid).next = None;
        match self.tail {
            Some(tail) => table.slot_mut(tail).next = Some(pid),
            None => self.head = Some(pid),
        }
        self.tail = Some(pid);
        self.len += 1;
    }

    /// Unlink and return the head. O(1).
    pub fn pop_front(&mut self, table: &mut ProcessTable) -> Option<Pid> {
        let pid = self.head?;
        self.head = table.slot(pid).next;
        if self.head.is_none() {
            self.tail = None;
        }
        table.slot_mut(pid).next = None;
        self.len -= 1;
        Some(pid)
    }

    /// Unlink an arbitrary member, repairing the tail pointer when the
    /// removed element was the tail. O(n); returns false when `pid` is
    /// not queued here.
    pub fn remove(&mut self, table: &mut ProcessTable, pid: Pid) -> bool {
        if self.head == Some(pid) {
            self.pop_front(table);
            return true;
        }
        let mut prev = match self.head {
            Some(head) => head,
            None => return false,
        };
        while let Some(cur) = table.slot(prev).next {
            if cur == pid {
                table.slot_mut(prev).next = table.slot(cur).next;
                if self.tail == Some(cur) {
                    self.tail = Some(prev);
                }
                table.slot_mut(cur).next = None;
                self.len -= 1;
                return true;
            }
            prev = cur;
        }
        false
    }

    pub fn contains(&self, table: &ProcessTable, pid: Pid) -> bool {
        self.pids(table).contains(&pid)
    }

    /// Members in queue order.
    pub fn pids(&self, table: &ProcessTable) -> Vec<Pid> {
        let mut out = Vec::with_capacity(self.len);
        let mut cursor = self.head;
        while let Some(pid) = cursor {
            out.push(pid);
            cursor = table.slot(pid).next;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::VecDeque;

    fn table(capacity: usize) -> ProcessTable {
        ProcessTable::new(capacity, 1)
    }

    #[test]
    fn fifo_order() {
        let mut t = table(4);
        let mut q = Queue::new();
        for pid in [2, 0, 3] {
            q.push_back(&mut t, pid);
        }
        assert_eq!(q.pids(&t), vec![2, 0, 3]);
        assert_eq!(q.pop_front(&mut t), Some(2));
        assert_eq!(q.pop_front(&mut t), Some(0));
        assert_eq!(q.pop_front(&mut t), Some(3));
        assert_eq!(q.pop_front(&mut t), None);
        assert!(q.is_empty());
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut t = table(4);
        let mut q = Queue::new();
        for pid in 0..4 {
            q.push_back(&mut t, pid);
        }
        assert!(q.remove(&mut t, 0)); // head
        assert!(q.remove(&mut t, 2)); // middle
        assert!(q.remove(&mut t, 3)); // tail: tail pointer must move back
        assert_eq!(q.pids(&t), vec![1]);
        // tail is valid again: appending lands after 1
        q.push_back(&mut t, 3);
        assert_eq!(q.pids(&t), vec![1, 3]);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut t = table(3);
        let mut q = Queue::new();
        q.push_back(&mut t, 1);
        assert!(!q.remove(&mut t, 2));
        assert_eq!(q.pids(&t), vec![1]);
    }

    #[test]
    fn remove_last_member_empties_queue() {
        let mut t = table(2);
        let mut q = Queue::new();
        q.push_back(&mut t, 1);
        assert!(q.remove(&mut t, 1));
        assert!(q.is_empty());
        q.push_back(&mut t, 0);
        assert_eq!(q.pids(&t), vec![0]);
    }

    proptest! {
        // Arbitrary push/pop/remove sequences track a reference deque.
        #[test]
        fn matches_reference_model(ops in prop::collection::vec((0u8..3, 0u8..8), 1..64)) {
            let mut t = table(8);
            let mut q = Queue::new();
            let mut model: VecDeque<Pid> = VecDeque::new();

            for (op, pick) in ops {
                match op {
                    0 => {
                        // push the lowest pid not currently queued
                        if let Some(pid) = (0..8u32).find(|pid| !model.contains(pid)) {
                            q.push_back(&mut t, pid);
                            model.push_back(pid);
                        }
                    }
                    1 => {
                        prop_assert_eq!(q.pop_front(&mut t), model.pop_front());
                    }
                    _ => {
                        if !model.is_empty() {
                            let index = pick as usize % model.len();
                            let pid = model.remove(index).unwrap();
                            prop_assert!(q.remove(&mut t, pid));
                        }
                    }
                }
                prop_assert_eq!(q.pids(&t), model.iter().copied().collect::<Vec<_>>());
                prop_assert_eq!(q.len(), model.len());
                prop_assert_eq!(q.head(), model.front().copied());
            }
        }
    }
}
