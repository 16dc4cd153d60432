/*!
 * MiniOS Kernel - Main Entry Point
 *
 * Boots the kernel on the simulated machine and drives a short scripted
 * workload through the system-call surface: process creation, console
 * output, mutex traffic, and timed sleep under a free-running clock.
 */

use std::error::Error;
use std::path::Path;

use log::{info, warn};
use minios_kernel::{Kernel, KernelConfig, MutexKind, Outcome, SimHal, Syscall};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::var("KERNEL_CONFIG_PATH") {
        Ok(path) => KernelConfig::load(Path::new(&path))?,
        Err(_) => KernelConfig::default(),
    };

    let mut hal = SimHal::new();
    hal.stage_bytes(0x2000, b"hello from init\n");
    hal.press_key(b'k');

    let mut kernel = Kernel::boot(hal, config)?;

    // init spawns a worker, greets the console, and synchronizes with it
    // through a shared mutex before sleeping a second.
    run(&mut kernel, Syscall::CreateProcess { program: "worker".into() });
    run(&mut kernel, Syscall::Write { buf: 0x2000, len: 16 });
    run(
        &mut kernel,
        Syscall::MutexCreate { name: "console".into(), kind: MutexKind::NonRecursive },
    );
    run(&mut kernel, Syscall::MutexLock { handle: 0 });
    run(&mut kernel, Syscall::ProcessTimes { dest: None });
    kernel.on_terminal();

    // sleeping hands the processor to the worker; the worker takes its
    // turn and terminates, and the clock runs until init wakes again.
    run(&mut kernel, Syscall::Sleep { seconds: 1 });
    run(&mut kernel, Syscall::GetPid);
    run(&mut kernel, Syscall::TerminateProcess);

    let stats = kernel.stats();
    info!(
        "workload done: {} ticks, {} context switches, {} live processes",
        stats.ticks, stats.context_switches, stats.live_processes
    );
    info!("console: {:?}", kernel.hal().console_text());
    Ok(())
}

fn run(kernel: &mut Kernel<SimHal>, call: Syscall) {
    match kernel.service_call(call.clone()) {
        Ok(Outcome::Done(value)) => info!("{:?} -> {}", call.id(), value),
        Ok(outcome) => info!("{:?} -> {:?}", call.id(), outcome),
        Err(err) => warn!("{:?} failed: {}", call.id(), err),
    }
}
