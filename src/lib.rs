/*!
 * MiniOS Kernel Library
 *
 * A cooperative, single-processor kernel core: FIFO scheduling, process
 * lifecycle, tick-counted sleep, and a bounded named-mutex registry,
 * driven entirely through interrupt entry points. Hardware is consumed
 * through the narrow `hal::Hal` boundary; `hal::SimHal` provides a
 * deterministic in-process machine so the kernel boots and tests as a
 * normal library.
 */

pub mod core;
pub mod hal;
pub mod kernel;
pub mod process;
pub mod sync;
pub mod syscall;
pub mod time;
pub mod trap;

// Re-exports
pub use crate::core::{Address, KernelConfig, KernelError, KernelResult, Pid, Register, Resource};
pub use hal::{Hal, IrqEvent, IrqLevel, SimHal, Vector};
pub use kernel::{Kernel, KernelStats};
pub use process::{ProcessInfo, ProcessState};
pub use sync::{MutexInfo, MutexKind};
pub use syscall::{Outcome, ServiceId, Syscall, SERVICE_FAILURE};
pub use trap::Exception;
