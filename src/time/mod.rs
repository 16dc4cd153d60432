/*!
 * Time Module
 * Clock tick handling, tick accounting, and timed sleep
 */

use crate::core::types::{Address, KernelResult};
use crate::hal::{Hal, IrqLevel};
use crate::kernel::Kernel;
use crate::process::scheduler::WaitQueue;
use crate::process::types::{Pending, ProcessState};
use crate::syscall::Outcome;
use log::{info, trace};

impl<H: Hal> Kernel<H> {
    /// Clock interrupt: count the tick, attribute it to the running
    /// process per the privilege mode it was interrupted in, and sweep
    /// the sleeping list. Never switches the running process; expired
    /// sleepers only join the ready-queue tail.
    pub fn on_clock_tick(&mut self) {
        self.ticks += 1;
        trace!("clock tick {}", self.ticks);

        if let Some(pid) = self.current {
            let user = self.hal.from_user_mode();
            let pcb = self.table.slot_mut(pid);
            if user {
                pcb.user_ticks += 1;
            } else {
                pcb.system_ticks += 1;
            }
        }

        // Sweep: hold the successor before unlinking, so waking an entry
        // cannot derail the walk. Same-tick expirations wake in list
        // order, which is insertion order.
        let mut cursor = self.sleeping.head();
        while let Some(pid) = cursor {
            let next = self.table.slot(pid).next;
            let expired = {
                let pcb = self.table.slot_mut(pid);
                pcb.sleep_left = pcb.sleep_left.saturating_sub(1);
                pcb.sleep_left == 0
            };
            if expired {
                self.sleeping.remove(&mut self.table, pid);
                self.table.slot_mut(pid).state = ProcessState::Ready;
                self.ready.push_back(&mut self.table, pid);
                info!("process {} sleep expired", pid);
            }
            cursor = next;
        }
    }

    /// Block the running process for `seconds` of wall time, measured in
    /// whole clock ticks. Delivers 0 when the timer expires and the
    /// process is dispatched again.
    pub(crate) fn sys_sleep(&mut self, seconds: u64) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        let ticks = seconds * u64::from(self.config.tick_hz);
        self.table.slot_mut(pid).sleep_left = ticks;
        info!("process {} sleeping {} ticks", pid, ticks);
        self.block_current(WaitQueue::Sleeping, Pending::Deliver(0))
    }

    /// Report ticks since boot; optionally store the caller's own
    /// user/system tick counters through the given user address.
    pub(crate) fn sys_process_times(&mut self, dest: Option<Address>) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        if let Some(addr) = dest {
            let (user, system) = {
                let pcb = self.table.slot(pid);
                (pcb.user_ticks, pcb.system_ticks)
            };
            let prev = self.hal.set_irq_level(IrqLevel::Masked);
            self.hal.write_user_words(addr, &[user, system]);
            self.hal.set_irq_level(prev);
        }
        Ok(Outcome::Done(self.ticks as i64))
    }
}
