/*!
 * Kernel Configuration
 * Table capacities and clock frequency, fixed for the life of the kernel
 */

use super::errors::KernelError;
use super::limits;
use super::types::KernelResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Boot-time configuration. Tables are sized from these values once and
/// never resized afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct KernelConfig {
    pub max_processes: usize,
    pub max_mutexes: usize,
    pub descriptors_per_process: usize,
    pub stack_size: usize,
    pub tick_hz: u32,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_processes: limits::MAX_PROCESSES,
            max_mutexes: limits::MAX_MUTEXES,
            descriptors_per_process: limits::DESCRIPTORS_PER_PROCESS,
            stack_size: limits::STACK_SIZE,
            tick_hz: limits::TICK_HZ,
        }
    }
}

impl KernelConfig {
    /// Load configuration from a JSON file. Missing fields fall back to
    /// the defaults; an unreadable or malformed file is a boot failure.
    pub fn load(path: &Path) -> KernelResult<Self> {
        let data = fs::read_to_string(path).map_err(|err| {
            KernelError::FatalConfiguration(format!(
                "cannot read config {}: {err}",
                path.display()
            ))
        })?;
        serde_json::from_str(&data).map_err(|err| {
            KernelError::FatalConfiguration(format!(
                "malformed config {}: {err}",
                path.display()
            ))
        })
    }
}
