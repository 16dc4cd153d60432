/*!
 * Limits
 * Default capacities for the fixed kernel tables
 */

/// Default number of process-table slots.
pub const MAX_PROCESSES: usize = 10;

/// Default number of slots in the named-mutex registry.
pub const MAX_MUTEXES: usize = 16;

/// Default number of mutex descriptors each process may hold open.
pub const DESCRIPTORS_PER_PROCESS: usize = 4;

/// Default per-process stack size in bytes.
pub const STACK_SIZE: usize = 4 * 1024;

/// Default clock interrupt frequency (ticks per second).
pub const TICK_HZ: u32 = 100;

/// Number of general-purpose registers exposed by the HAL.
pub const NUM_REGS: usize = 8;

/// Program started as the first process at boot.
pub const INIT_PROGRAM: &str = "init";
