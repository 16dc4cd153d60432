/*!
 * Process Types
 * The per-process kernel record and its public snapshot
 */

use crate::core::types::Pid;
use crate::hal::{Context, ImageHandle, StackHandle};
use crate::syscall::Syscall;
use serde::{Deserialize, Serialize};

/// Process state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// Slot is free.
    Unused,
    /// Queued for the processor.
    Ready,
    /// Currently running (in no queue).
    Running,
    /// Waiting for a sleep timer, a mutex, or a free mutex slot.
    Blocked,
    /// Finished; the slot is reclaimed immediately afterwards.
    Terminated,
}

/// Continuation of a system call that suspended its caller. Handled when
/// the process is next dispatched.
#[derive(Debug, Clone)]
pub(crate) enum Pending {
    /// Re-execute the call from scratch (the caller was woken and must
    /// re-validate its predicate).
    Retry(Syscall),
    /// The call already completed; deliver this result register value.
    Deliver(i64),
}

/// Per-process kernel record.
///
/// One slot of the process table. The `next` link threads the slot
/// through at most one FIFO queue at a time.
#[derive(Debug)]
pub struct Pcb {
    pub pid: Pid,
    pub state: ProcessState,
    pub context: Context,
    pub image: Option<ImageHandle>,
    pub stack: Option<StackHandle>,
    /// Ticks left to sleep; meaningful only while blocked for sleep.
    pub sleep_left: u64,
    /// Involuntary-reschedule marker. Cleared around voluntary blocking;
    /// no tick path sets it, so no involuntary switch ever happens.
    pub resched: bool,
    pub user_ticks: u64,
    pub system_ticks: u64,
    /// Open mutex descriptors: each slot is empty or a registry index.
    pub descriptors: Vec<Option<usize>>,
    pub(crate) next: Option<Pid>,
    pub(crate) pending: Option<Pending>,
}

impl Pcb {
    pub(crate) fn new(pid: Pid, descriptor_slots: usize) -> Self {
        Self {
            pid,
            state: ProcessState::Unused,
            context: Context::default(),
            image: None,
            stack: None,
            sleep_left: 0,
            resched: false,
            user_ticks: 0,
            system_ticks: 0,
            descriptors: vec![None; descriptor_slots],
            next: None,
            pending: None,
        }
    }

    /// Return the slot to its freshly-built state, keeping only the pid.
    pub(crate) fn reset(&mut self) {
        let slots = self.descriptors.len();
        *self = Pcb::new(self.pid, slots);
    }

    #[inline]
    #[must_use]
    pub const fn is_unused(&self) -> bool {
        matches!(self.state, ProcessState::Unused)
    }

    pub fn info(&self) -> ProcessInfo {
        ProcessInfo {
            pid: self.pid,
            state: self.state,
            sleep_left: self.sleep_left,
            user_ticks: self.user_ticks,
            system_ticks: self.system_ticks,
        }
    }
}

/// Public snapshot of one process-table slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ProcessInfo {
    pub pid: Pid,
    pub state: ProcessState,
    pub sleep_left: u64,
    pub user_ticks: u64,
    pub system_ticks: u64,
}
