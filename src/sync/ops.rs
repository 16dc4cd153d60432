/*!
 * Mutex Operations
 * create / open / lock / unlock / close over the bounded registry
 */

use super::types::{MutexKind, MutexSlot};
use crate::core::errors::{KernelError, Resource};
use crate::core::types::{KernelResult, Pid};
use crate::hal::{Hal, IrqLevel};
use crate::kernel::Kernel;
use crate::process::scheduler::WaitQueue;
use crate::process::types::{Pending, ProcessState};
use crate::syscall::{Outcome, Syscall};
use log::{debug, info};

impl<H: Hal> Kernel<H> {
    /// Lowest free descriptor slot of a process.
    fn free_descriptor(&self, pid: Pid) -> Option<usize> {
        self.table
            .slot(pid)
            .descriptors
            .iter()
            .position(Option::is_none)
    }

    /// Registry index an open descriptor refers to.
    fn descriptor_target(&self, pid: Pid, handle: usize) -> KernelResult<usize> {
        self.table
            .slot(pid)
            .descriptors
            .get(handle)
            .copied()
            .flatten()
            .ok_or(KernelError::InvalidHandle(handle))
    }

    /// Move every lock/create waiter back to the ready-queue tail. Woken
    /// processes re-validate their whole predicate when dispatched, so
    /// waking more than can win is correct, just not minimal.
    pub(crate) fn wake_lock_waiters(&mut self) {
        while let Some(pid) = self.lock_wait.pop_front(&mut self.table) {
            self.table.slot_mut(pid).state = ProcessState::Ready;
            self.ready.push_back(&mut self.table, pid);
            info!("process {} woken to retry", pid);
        }
    }

    /// Create a named mutex. The creator gets a descriptor and the single
    /// reference; it does *not* hold the lock. When every registry slot is
    /// taken the caller waits and later re-runs the whole call: another
    /// waiter may have claimed the slot, or the name, first.
    pub(crate) fn sys_mutex_create(
        &mut self,
        name: String,
        kind: MutexKind,
    ) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        let handle = self
            .free_descriptor(pid)
            .ok_or(KernelError::ResourceExhausted(Resource::Descriptor))?;
        if self.registry.find(&name).is_some() {
            return Err(KernelError::Conflict(name));
        }
        let Some(index) = self.registry.lowest_free() else {
            info!("mutex table full: process {} waits for a slot", pid);
            return self.block_current(
                WaitQueue::LockWait,
                Pending::Retry(Syscall::MutexCreate { name, kind }),
            );
        };

        let prev = self.hal.set_irq_level(IrqLevel::Masked);
        self.registry.install(
            index,
            MutexSlot {
                name: name.clone(),
                kind,
                owner: pid,
                hold: 0,
                refs: 1,
            },
        );
        self.table.slot_mut(pid).descriptors[handle] = Some(index);
        self.hal.set_irq_level(prev);

        info!(
            "mutex {:?} ({:?}) created at slot {} by process {}, descriptor {}",
            name, kind, index, pid, handle
        );
        Ok(Outcome::Done(handle as i64))
    }

    /// Open an existing mutex by name, taking a new reference.
    pub(crate) fn sys_mutex_open(&mut self, name: &str) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        let handle = self
            .free_descriptor(pid)
            .ok_or(KernelError::ResourceExhausted(Resource::Descriptor))?;
        let index = self
            .registry
            .find(name)
            .ok_or_else(|| KernelError::NotFound(name.to_string()))?;

        let prev = self.hal.set_irq_level(IrqLevel::Masked);
        if let Some(slot) = self.registry.slot_mut(index) {
            slot.refs += 1;
        }
        self.table.slot_mut(pid).descriptors[handle] = Some(index);
        self.hal.set_irq_level(prev);

        info!(
            "mutex {:?} opened by process {}, descriptor {}",
            name, pid, handle
        );
        Ok(Outcome::Done(handle as i64))
    }

    /// Acquire a mutex. Contenders share one wait queue and are all woken
    /// on any release; the winner is whoever gets dispatched first and
    /// finds the mutex free when its retry re-evaluates the predicate.
    pub(crate) fn sys_mutex_lock(&mut self, handle: usize) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        let index = self.descriptor_target(pid, handle)?;
        {
            let Some(slot) = self.registry.slot_mut(index) else {
                return Err(KernelError::InvalidHandle(handle));
            };
            if slot.hold == 0 {
                slot.owner = pid;
                slot.hold = 1;
                info!("mutex {:?} locked by process {}", slot.name, pid);
                return Ok(Outcome::Done(0));
            }
            if slot.owner == pid {
                return match slot.kind {
                    MutexKind::Recursive => {
                        slot.hold += 1;
                        debug!("mutex {:?} re-locked, hold {}", slot.name, slot.hold);
                        Ok(Outcome::Done(0))
                    }
                    // Re-locking what you already hold would wait on
                    // yourself; reject instead of queueing.
                    MutexKind::NonRecursive => Err(KernelError::DeadlockDetected {
                        pid,
                        name: slot.name.clone(),
                    }),
                };
            }
            info!(
                "mutex {:?} held by process {}: process {} blocks",
                slot.name, slot.owner, pid
            );
        }
        self.block_current(
            WaitQueue::LockWait,
            Pending::Retry(Syscall::MutexLock { handle }),
        )
    }

    /// The release path never shipped in this protocol: unlock reports
    /// success without touching the registry. Ownership only ends via
    /// close or termination.
    pub(crate) fn sys_mutex_unlock(&mut self, handle: usize) -> KernelResult<Outcome> {
        debug!("mutex_unlock({}) is a no-op", handle);
        Ok(Outcome::Done(0))
    }

    /// Drop one reference. Closing the last descriptor the owner holds
    /// releases the lock; dropping the last reference anywhere reclaims
    /// the slot and frees the name. Either release wakes all waiters.
    pub(crate) fn sys_mutex_close(&mut self, handle: usize) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        self.close_descriptor(pid, handle)
    }

    pub(crate) fn close_descriptor(&mut self, pid: Pid, handle: usize) -> KernelResult<Outcome> {
        let index = self.descriptor_target(pid, handle)?;
        if self.registry.slot(index).is_none() {
            // stale entry: the registry slot went away under this handle
            self.table.slot_mut(pid).descriptors[handle] = None;
            return Err(KernelError::InvalidHandle(handle));
        }

        let prev = self.hal.set_irq_level(IrqLevel::Masked);
        self.table.slot_mut(pid).descriptors[handle] = None;
        let still_open = self
            .table
            .slot(pid)
            .descriptors
            .iter()
            .any(|d| *d == Some(index));

        let mut wake = false;
        let mut reclaim = false;
        if let Some(slot) = self.registry.slot_mut(index) {
            if slot.hold > 0 && slot.owner == pid && !still_open {
                // the owner's last descriptor is going away; the hold
                // cannot outlive it
                slot.hold = 0;
                wake = true;
                info!("mutex {:?} released by closing owner {}", slot.name, pid);
            }
            slot.refs -= 1;
            if slot.refs == 0 {
                reclaim = true;
            }
        }
        if reclaim {
            if let Some(slot) = self.registry.slot(index) {
                info!("mutex {:?} reclaimed from slot {}", slot.name, index);
            }
            self.registry.reclaim(index);
            wake = true;
        }
        if wake {
            self.wake_lock_waiters();
        }
        self.hal.set_irq_level(prev);
        Ok(Outcome::Done(0))
    }

    /// Close every descriptor a process still holds open. Used at
    /// termination so reference counts never leak.
    pub(crate) fn release_descriptors(&mut self, pid: Pid) {
        for handle in 0..self.table.slot(pid).descriptors.len() {
            if self.table.slot(pid).descriptors[handle].is_some() {
                let _ = self.close_descriptor(pid, handle);
            }
        }
    }
}
