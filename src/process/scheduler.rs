/*!
 * Scheduler
 * FIFO selection over the ready queue, with the idle halt loop
 */

use super::types::{Pending, ProcessState};
use crate::core::types::{KernelResult, Pid, Register};
use crate::hal::{Hal, IrqEvent, IrqLevel};
use crate::kernel::Kernel;
use log::info;

/// Which wait list a blocking process joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WaitQueue {
    Sleeping,
    LockWait,
}

impl<H: Hal> Kernel<H> {
    /// Head of the ready queue. While the queue is empty, lower the
    /// interrupt level so clock and device interrupts still arrive, halt
    /// until one does, handle it, and re-check: a tick may have readied a
    /// sleeper. Pure FIFO; no priorities, no aging.
    pub(crate) fn next_ready(&mut self) -> Pid {
        loop {
            if let Some(pid) = self.ready.head() {
                return pid;
            }
            info!("nothing ready: halting for an interrupt");
            let prev = self.hal.set_irq_level(IrqLevel::DeviceOnly);
            let event = self.hal.wait_for_interrupt();
            self.hal.set_irq_level(prev);
            match event {
                IrqEvent::Clock => self.on_clock_tick(),
                IrqEvent::Terminal => self.on_terminal(),
                IrqEvent::Software => self.on_software(),
            }
        }
    }

    /// Switch into the next ready process. `from` is the outgoing context
    /// to save, or `None` at boot and after a termination.
    ///
    /// The incoming process may carry the continuation of a call that
    /// suspended it: a completed result to deliver, or a call to
    /// re-execute from scratch (which may block it again).
    pub(crate) fn dispatch(&mut self, from: Option<Pid>) -> KernelResult<Pid> {
        let next = self.next_ready();
        self.ready.pop_front(&mut self.table);
        self.table.slot_mut(next).state = ProcessState::Running;
        self.current = Some(next);
        self.switches += 1;

        let restore = self.table.slot(next).context.clone();
        match from {
            Some(prev) => self
                .hal
                .context_switch(Some(&mut self.table.slot_mut(prev).context), &restore),
            None => self.hal.context_switch(None, &restore),
        }
        info!("context switch: {:?} -> {}", from, next);

        match self.table.slot_mut(next).pending.take() {
            Some(Pending::Deliver(value)) => self.hal.write_reg(0, value as Register),
            Some(Pending::Retry(call)) => {
                let reply = self.service_call(call);
                self.finish(reply)?;
            }
            None => {}
        }
        Ok(next)
    }

    /// Suspend the running process onto a wait list and switch away.
    /// Clears the involuntary-reschedule marker: the switch is happening
    /// voluntarily right now.
    pub(crate) fn block_current(
        &mut self,
        wait: WaitQueue,
        pending: Pending,
    ) -> KernelResult<crate::syscall::Outcome> {
        let pid = self.running_pid()?;
        {
            let pcb = self.table.slot_mut(pid);
            pcb.state = ProcessState::Blocked;
            pcb.resched = false;
            pcb.pending = Some(pending);
        }
        let prev = self.hal.set_irq_level(IrqLevel::Masked);
        self.ready.remove(&mut self.table, pid);
        match wait {
            WaitQueue::Sleeping => self.sleeping.push_back(&mut self.table, pid),
            WaitQueue::LockWait => self.lock_wait.push_back(&mut self.table, pid),
        }
        self.current = None;
        self.dispatch(Some(pid))?;
        self.hal.set_irq_level(prev);
        Ok(crate::syscall::Outcome::Blocked)
    }
}
