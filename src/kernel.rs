/*!
 * Kernel Aggregate
 * All shared kernel state, created once at boot and threaded through
 * every operation
 */

use crate::core::config::KernelConfig;
use crate::core::errors::KernelError;
use crate::core::limits::INIT_PROGRAM;
use crate::core::types::{KernelResult, Pid};
use crate::hal::{Hal, Vector};
use crate::process::queue::Queue;
use crate::process::table::ProcessTable;
use crate::process::types::ProcessInfo;
use crate::sync::registry::MutexRegistry;
use crate::sync::types::MutexInfo;
use log::info;
use serde::{Deserialize, Serialize};

/// The kernel: process table, the three FIFO queues, the mutex registry,
/// and the hardware boundary. One instance owns everything; there are no
/// ambient globals, so independent instances never share state.
#[derive(Debug)]
pub struct Kernel<H: Hal> {
    pub(crate) hal: H,
    pub(crate) config: KernelConfig,
    pub(crate) table: ProcessTable,
    pub(crate) ready: Queue,
    pub(crate) sleeping: Queue,
    /// Shared wait queue for both lock contention and create-slot
    /// contention; any release wakes everyone for re-validation.
    pub(crate) lock_wait: Queue,
    pub(crate) registry: MutexRegistry,
    pub(crate) current: Option<Pid>,
    pub(crate) ticks: u64,
    pub(crate) switches: u64,
}

/// Aggregate counters for monitoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct KernelStats {
    pub ticks: u64,
    pub context_switches: u64,
    pub live_processes: usize,
    pub active_mutexes: usize,
}

impl<H: Hal> Kernel<H> {
    /// Build a kernel with empty tables. No handlers are installed and no
    /// process exists yet; `boot` is the full bring-up path.
    pub fn new(hal: H, config: KernelConfig) -> Self {
        let table = ProcessTable::new(config.max_processes, config.descriptors_per_process);
        let registry = MutexRegistry::new(config.max_mutexes);
        Self {
            hal,
            config,
            table,
            ready: Queue::new(),
            sleeping: Queue::new(),
            lock_wait: Queue::new(),
            registry,
            current: None,
            ticks: 0,
            switches: 0,
        }
    }

    /// Bring the system up: install the interrupt vectors, initialize the
    /// clock and keyboard controllers, create the initial process, and
    /// switch into it from no prior context.
    pub fn boot(mut hal: H, config: KernelConfig) -> KernelResult<Self> {
        for vector in Vector::ALL {
            hal.install_vector(vector);
        }
        hal.init_clock(config.tick_hz);
        hal.init_keyboard();

        info!(
            "kernel starting: {} process slots, {} mutex slots, {} Hz clock",
            config.max_processes, config.max_mutexes, config.tick_hz
        );

        let mut kernel = Self::new(hal, config);
        kernel.sys_create_process(INIT_PROGRAM).map_err(|err| {
            KernelError::FatalConfiguration(format!("cannot start {INIT_PROGRAM:?}: {err}"))
        })?;
        kernel.dispatch(None)?;
        info!("boot complete: init running");
        Ok(kernel)
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Pid> {
        self.current
    }

    /// Ticks since boot.
    #[inline]
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn config(&self) -> &KernelConfig {
        &self.config
    }

    pub fn hal(&self) -> &H {
        &self.hal
    }

    pub fn hal_mut(&mut self) -> &mut H {
        &mut self.hal
    }

    /// The running process, or a fatal error when kernel code is entered
    /// with no process at all.
    pub(crate) fn running_pid(&self) -> KernelResult<Pid> {
        self.current.ok_or_else(|| {
            KernelError::FatalConfiguration("service entered with no running process".to_string())
        })
    }

    /// Snapshot of one table slot (including unused ones).
    pub fn process(&self, pid: Pid) -> Option<ProcessInfo> {
        if (pid as usize) < self.table.capacity() {
            Some(self.table.slot(pid).info())
        } else {
            None
        }
    }

    /// Snapshots of all allocated slots, in table order.
    pub fn processes(&self) -> Vec<ProcessInfo> {
        self.table.iter_live().map(|pcb| pcb.info()).collect()
    }

    pub fn ready_pids(&self) -> Vec<Pid> {
        self.ready.pids(&self.table)
    }

    pub fn sleeping_pids(&self) -> Vec<Pid> {
        self.sleeping.pids(&self.table)
    }

    pub fn lock_wait_pids(&self) -> Vec<Pid> {
        self.lock_wait.pids(&self.table)
    }

    pub fn mutexes(&self) -> Vec<MutexInfo> {
        self.registry.infos()
    }

    pub fn mutex_named(&self, name: &str) -> Option<MutexInfo> {
        self.mutexes().into_iter().find(|m| m.name == name)
    }

    pub fn stats(&self) -> KernelStats {
        KernelStats {
            ticks: self.ticks,
            context_switches: self.switches,
            live_processes: self.table.live(),
            active_mutexes: self.registry.active(),
        }
    }
}
