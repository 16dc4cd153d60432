/*!
 * Mutex Types
 */

use crate::core::types::{Pid, Register};
use serde::{Deserialize, Serialize};

/// Whether the current owner may re-lock without blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutexKind {
    NonRecursive,
    Recursive,
}

impl MutexKind {
    /// Service-call encoding: 1 is recursive, anything else is not.
    #[must_use]
    pub fn from_raw(raw: Register) -> Self {
        if raw == 1 {
            MutexKind::Recursive
        } else {
            MutexKind::NonRecursive
        }
    }
}

/// One active mutex in the registry.
#[derive(Debug, Clone)]
pub struct MutexSlot {
    /// Unique among currently active mutexes.
    pub name: String,
    pub kind: MutexKind,
    /// Meaningful only while `hold > 0`.
    pub owner: Pid,
    /// 0 = free; a non-recursive mutex never exceeds 1.
    pub hold: u32,
    /// Open descriptors across all processes; the slot is reclaimable
    /// only at 0.
    pub refs: u32,
}

/// Public snapshot of one registry slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MutexInfo {
    pub index: usize,
    pub name: String,
    pub kind: MutexKind,
    pub owner: Pid,
    pub hold: u32,
    pub refs: u32,
}
