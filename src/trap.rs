/*!
 * Interrupt Dispatch
 * Exception, device, and system-call trap entry points
 */

use crate::core::errors::KernelError;
use crate::core::types::{KernelResult, Register};
use crate::hal::Hal;
use crate::kernel::Kernel;
use crate::syscall::{Outcome, Syscall, SERVICE_FAILURE};
use log::{debug, info, warn};
use std::fmt;

/// Faulting conditions a running context can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exception {
    Arithmetic,
    Memory,
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Exception::Arithmetic => "arithmetic exception",
            Exception::Memory => "memory exception",
        })
    }
}

impl<H: Hal> Kernel<H> {
    /// A fault in user mode terminates the faulting process and nothing
    /// else. A fault while kernel code is executing is unrecoverable for
    /// the whole system.
    pub fn on_exception(&mut self, kind: Exception) -> KernelResult<()> {
        if !self.hal.from_user_mode() {
            return Err(KernelError::FatalConfiguration(format!(
                "{kind} while kernel code was executing"
            )));
        }
        let pid = self.running_pid()?;
        warn!("{} in process {}: terminating it", kind, pid);
        self.sys_terminate()?;
        Ok(())
    }

    /// Terminal interrupt: drain one unit of input. No scheduling effect.
    pub fn on_terminal(&mut self) {
        match self.hal.read_terminal() {
            Some(byte) => info!("terminal input: {:?}", char::from(byte)),
            None => debug!("terminal interrupt with empty buffer"),
        }
    }

    /// Software interrupt: logged only. No scheduling effect.
    pub fn on_software(&mut self) {
        info!("software interrupt");
    }

    /// System-call trap: decode the service number and arguments from the
    /// register file, run the service, and write the result back.
    /// Unknown service numbers and undecodable arguments produce the
    /// generic failure result instead of faulting.
    pub fn on_syscall(&mut self) -> KernelResult<()> {
        match Syscall::decode(&self.hal) {
            Some(call) => {
                debug!("service {:?} from process {:?}", call.id(), self.current);
                let reply = self.service_call(call);
                self.finish(reply)
            }
            None => {
                warn!("unknown or undecodable service {}", self.hal.read_reg(0));
                self.hal.write_reg(0, SERVICE_FAILURE as Register);
                Ok(())
            }
        }
    }

    /// Write a service reply back to the caller. Recoverable errors
    /// become the failure result; only a fatal error escapes to the
    /// boundary. A blocked or switched-away caller gets its result when
    /// (and if) it is dispatched again.
    pub(crate) fn finish(&mut self, reply: KernelResult<Outcome>) -> KernelResult<()> {
        match reply {
            Ok(Outcome::Done(value)) => {
                self.hal.write_reg(0, value as Register);
                Ok(())
            }
            Ok(Outcome::Blocked) | Ok(Outcome::Switched) => Ok(()),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!("service failed: {}", err);
                self.hal.write_reg(0, SERVICE_FAILURE as Register);
                Ok(())
            }
        }
    }
}
