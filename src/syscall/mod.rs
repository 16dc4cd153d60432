/*!
 * Syscall Module
 * Tagged dispatch over the fixed service table
 */

pub mod types;

pub use types::{Outcome, ServiceId, Syscall, SERVICE_FAILURE};

use crate::core::types::KernelResult;
use crate::hal::Hal;
use crate::kernel::Kernel;

impl<H: Hal> Kernel<H> {
    /// Execute one decoded service call against the kernel state. This is
    /// also the retry entry for calls that blocked their caller.
    pub fn service_call(&mut self, call: Syscall) -> KernelResult<Outcome> {
        match call {
            Syscall::CreateProcess { program } => self.sys_create_process(&program),
            Syscall::TerminateProcess => self.sys_terminate(),
            Syscall::Write { buf, len } => self.sys_write(buf, len),
            Syscall::GetPid => self.sys_get_pid(),
            Syscall::Sleep { seconds } => self.sys_sleep(seconds),
            Syscall::ProcessTimes { dest } => self.sys_process_times(dest),
            Syscall::MutexCreate { name, kind } => self.sys_mutex_create(name, kind),
            Syscall::MutexOpen { name } => self.sys_mutex_open(&name),
            Syscall::MutexLock { handle } => self.sys_mutex_lock(handle),
            Syscall::MutexUnlock { handle } => self.sys_mutex_unlock(handle),
            Syscall::MutexClose { handle } => self.sys_mutex_close(handle),
        }
    }
}
