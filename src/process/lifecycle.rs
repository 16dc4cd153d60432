/*!
 * Process Lifecycle
 * Creation and termination
 */

use super::types::ProcessState;
use crate::core::errors::{KernelError, Resource};
use crate::core::types::{Address, KernelResult};
use crate::hal::{Hal, IrqLevel};
use crate::kernel::Kernel;
use crate::syscall::Outcome;
use log::info;

impl<H: Hal> Kernel<H> {
    /// Create a process from a program reference: slot, memory image,
    /// stack, initial context, then Ready at the ready-queue tail.
    ///
    /// When the image cannot be built the slot is left exactly as found;
    /// nothing partial survives a failed create.
    pub(crate) fn sys_create_process(&mut self, program: &str) -> KernelResult<Outcome> {
        let pid = self
            .table
            .allocate()
            .ok_or(KernelError::ResourceExhausted(Resource::ProcessSlot))?;

        let (image, entry) = self
            .hal
            .build_image(program)
            .ok_or_else(|| KernelError::ImageUnavailable(program.to_string()))?;
        let stack = self.hal.alloc_stack(self.config.stack_size);
        let context = self
            .hal
            .init_context(image, stack, self.config.stack_size, entry);

        let prev = self.hal.set_irq_level(IrqLevel::Masked);
        {
            let pcb = self.table.slot_mut(pid);
            pcb.image = Some(image);
            pcb.stack = Some(stack);
            pcb.context = context;
            pcb.state = ProcessState::Ready;
        }
        self.ready.push_back(&mut self.table, pid);
        self.hal.set_irq_level(prev);

        info!("process {} created from {:?}", pid, program);
        Ok(Outcome::Done(i64::from(pid)))
    }

    /// Terminate the running process: release its image and stack, close
    /// its open mutex descriptors, reclaim the slot, and switch into the
    /// scheduler's next choice. The caller never resumes.
    pub(crate) fn sys_terminate(&mut self) -> KernelResult<Outcome> {
        let pid = self.running_pid()?;
        info!("process {} terminating", pid);

        if let Some(image) = self.table.slot_mut(pid).image.take() {
            self.hal.release_image(image);
        }
        self.release_descriptors(pid);

        let prev = self.hal.set_irq_level(IrqLevel::Masked);
        self.table.slot_mut(pid).state = ProcessState::Terminated;
        self.ready.remove(&mut self.table, pid);
        if let Some(stack) = self.table.slot_mut(pid).stack.take() {
            self.hal.release_stack(stack);
        }
        self.table.free(pid);
        self.current = None;
        self.dispatch(None)?;
        self.hal.set_irq_level(prev);
        Ok(Outcome::Switched)
    }

    pub(crate) fn sys_get_pid(&self) -> KernelResult<Outcome> {
        Ok(Outcome::Done(i64::from(self.running_pid()?)))
    }

    /// Copy a user buffer to the diagnostic console.
    pub(crate) fn sys_write(&mut self, buf: Address, len: usize) -> KernelResult<Outcome> {
        let bytes = self.hal.read_user_bytes(buf, len);
        self.hal.console_write(&bytes);
        Ok(Outcome::Done(0))
    }
}
