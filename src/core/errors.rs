/*!
 * Error Types
 * Centralized error handling with thiserror and serde support
 */

use super::types::Pid;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fixed table whose capacity ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    ProcessSlot,
    MutexSlot,
    Descriptor,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::ProcessSlot => "process slot",
            Resource::MutexSlot => "mutex slot",
            Resource::Descriptor => "mutex descriptor",
        })
    }
}

/// Kernel errors with serialization support
///
/// Everything except `FatalConfiguration` is reported back to the calling
/// process as a negative service result and is locally recoverable.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum KernelError {
    #[error("no free {0}")]
    ResourceExhausted(Resource),

    #[error("no active mutex named {0:?}")]
    NotFound(String),

    #[error("a mutex named {0:?} is already active")]
    Conflict(String),

    #[error("descriptor {0} does not refer to an open mutex")]
    InvalidHandle(usize),

    #[error("process {pid} already owns non-recursive mutex {name:?}")]
    DeadlockDetected { pid: Pid, name: String },

    #[error("no loadable image for program {0:?}")]
    ImageUnavailable(String),

    #[error("fatal: {0}")]
    FatalConfiguration(String),
}

impl KernelError {
    /// Whether the whole system must halt rather than report a failure
    /// result to the caller.
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, KernelError::FatalConfiguration(_))
    }
}
