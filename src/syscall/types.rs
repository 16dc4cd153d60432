/*!
 * System Call Types
 * Fixed service numbering and the decoded call representation
 */

use crate::core::types::{Address, Register};
use crate::hal::Hal;
use crate::sync::MutexKind;
use serde::{Deserialize, Serialize};

/// Result register value reported for any failed or unknown service.
pub const SERVICE_FAILURE: i64 = -1;

/// Fixed service table numbering. Service numbers are part of the
/// user-kernel contract and never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceId {
    CreateProcess = 0,
    TerminateProcess = 1,
    Write = 2,
    GetPid = 3,
    Sleep = 4,
    ProcessTimes = 5,
    MutexCreate = 6,
    MutexOpen = 7,
    MutexLock = 8,
    MutexUnlock = 9,
    MutexClose = 10,
}

impl ServiceId {
    pub const COUNT: usize = 11;

    #[must_use]
    pub fn from_raw(raw: Register) -> Option<Self> {
        Some(match raw {
            0 => ServiceId::CreateProcess,
            1 => ServiceId::TerminateProcess,
            2 => ServiceId::Write,
            3 => ServiceId::GetPid,
            4 => ServiceId::Sleep,
            5 => ServiceId::ProcessTimes,
            6 => ServiceId::MutexCreate,
            7 => ServiceId::MutexOpen,
            8 => ServiceId::MutexLock,
            9 => ServiceId::MutexUnlock,
            10 => ServiceId::MutexClose,
            _ => return None,
        })
    }
}

/// A decoded system call.
///
/// The trap handler reads the service number from register 0 and the
/// arguments from registers 1-2 (string arguments indirect through user
/// memory), then dispatches on this value. A blocked call is stored back
/// on its caller and re-executed verbatim when the caller is dispatched
/// again.
#[derive(Debug, Clone, PartialEq)]
pub enum Syscall {
    CreateProcess { program: String },
    TerminateProcess,
    Write { buf: Address, len: usize },
    GetPid,
    Sleep { seconds: u64 },
    ProcessTimes { dest: Option<Address> },
    MutexCreate { name: String, kind: MutexKind },
    MutexOpen { name: String },
    MutexLock { handle: usize },
    MutexUnlock { handle: usize },
    MutexClose { handle: usize },
}

/// How a service call left its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Completed; this value goes to the caller's result register.
    Done(i64),
    /// The caller suspended; its continuation runs at next dispatch.
    Blocked,
    /// The caller is gone and control switched to the next process.
    Switched,
}

impl Syscall {
    /// Decode the pending trap from the register file. `None` for an
    /// out-of-range service number or an unreadable string argument; the
    /// trap handler turns that into a generic failure result.
    pub fn decode<H: Hal>(hal: &H) -> Option<Self> {
        let id = ServiceId::from_raw(hal.read_reg(0))?;
        Some(match id {
            ServiceId::CreateProcess => Syscall::CreateProcess {
                program: hal.read_user_str(hal.read_reg(1))?,
            },
            ServiceId::TerminateProcess => Syscall::TerminateProcess,
            ServiceId::Write => Syscall::Write {
                buf: hal.read_reg(1),
                len: hal.read_reg(2) as usize,
            },
            ServiceId::GetPid => Syscall::GetPid,
            ServiceId::Sleep => Syscall::Sleep {
                seconds: hal.read_reg(1),
            },
            ServiceId::ProcessTimes => Syscall::ProcessTimes {
                dest: match hal.read_reg(1) {
                    0 => None,
                    addr => Some(addr),
                },
            },
            ServiceId::MutexCreate => Syscall::MutexCreate {
                name: hal.read_user_str(hal.read_reg(1))?,
                kind: MutexKind::from_raw(hal.read_reg(2)),
            },
            ServiceId::MutexOpen => Syscall::MutexOpen {
                name: hal.read_user_str(hal.read_reg(1))?,
            },
            ServiceId::MutexLock => Syscall::MutexLock {
                handle: hal.read_reg(1) as usize,
            },
            ServiceId::MutexUnlock => Syscall::MutexUnlock {
                handle: hal.read_reg(1) as usize,
            },
            ServiceId::MutexClose => Syscall::MutexClose {
                handle: hal.read_reg(1) as usize,
            },
        })
    }

    #[must_use]
    pub fn id(&self) -> ServiceId {
        match self {
            Syscall::CreateProcess { .. } => ServiceId::CreateProcess,
            Syscall::TerminateProcess => ServiceId::TerminateProcess,
            Syscall::Write { .. } => ServiceId::Write,
            Syscall::GetPid => ServiceId::GetPid,
            Syscall::Sleep { .. } => ServiceId::Sleep,
            Syscall::ProcessTimes { .. } => ServiceId::ProcessTimes,
            Syscall::MutexCreate { .. } => ServiceId::MutexCreate,
            Syscall::MutexOpen { .. } => ServiceId::MutexOpen,
            Syscall::MutexLock { .. } => ServiceId::MutexLock,
            Syscall::MutexUnlock { .. } => ServiceId::MutexUnlock,
            Syscall::MutexClose { .. } => ServiceId::MutexClose,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::SimHal;

    #[test]
    fn service_numbers_are_stable() {
        for raw in 0..ServiceId::COUNT as Register {
            assert!(ServiceId::from_raw(raw).is_some());
        }
        assert_eq!(ServiceId::from_raw(11), None);
        assert_eq!(ServiceId::from_raw(Register::MAX), None);
    }

    #[test]
    fn decode_reads_string_arguments() {
        let mut hal = SimHal::new();
        hal.stage_str(0x40, "printer");
        hal.write_reg(0, 6);
        hal.write_reg(1, 0x40);
        hal.write_reg(2, 1);
        assert_eq!(
            Syscall::decode(&hal),
            Some(Syscall::MutexCreate {
                name: "printer".to_string(),
                kind: MutexKind::Recursive,
            })
        );
    }

    #[test]
    fn decode_fails_on_missing_string() {
        let mut hal = SimHal::new();
        hal.write_reg(0, 0);
        hal.write_reg(1, 0x99);
        assert_eq!(Syscall::decode(&hal), None);
    }

    #[test]
    fn times_null_pointer_means_no_store() {
        let mut hal = SimHal::new();
        hal.write_reg(0, 5);
        hal.write_reg(1, 0);
        assert_eq!(
            Syscall::decode(&hal),
            Some(Syscall::ProcessTimes { dest: None })
        );
    }
}
