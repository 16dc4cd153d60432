/*!
 * Core Types
 * Common types used across the kernel
 */

/// Process ID type: the index of the process's slot in the process table,
/// stable for as long as the slot stays allocated.
pub type Pid = u32;

/// Machine register contents, as read and written through the HAL.
pub type Register = u64;

/// User-space address, passed through registers for buffer arguments.
pub type Address = u64;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, super::errors::KernelError>;
