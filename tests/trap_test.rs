/*!
 * Interrupt Dispatch Tests
 * Register-level traps, fault containment, and tick attribution
 */

use minios_kernel::{
    Exception, Hal, Kernel, KernelConfig, KernelError, Outcome, ProcessState, SimHal, Syscall,
};
use pretty_assertions::assert_eq;

fn boot(config: KernelConfig) -> Kernel<SimHal> {
    let mut hal = SimHal::new();
    hal.set_halt_fuse(10_000);
    Kernel::boot(hal, config).expect("boot failed")
}

fn result_reg(kernel: &Kernel<SimHal>) -> i64 {
    kernel.hal().read_reg(0) as i64
}

#[test]
fn out_of_range_service_number_fails_generically() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().write_reg(0, 42);
    kernel.on_syscall().unwrap();
    assert_eq!(result_reg(&kernel), -1);
    assert_eq!(kernel.current(), Some(0), "no fault, no switch");
}

#[test]
fn undecodable_string_argument_fails_generically() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().write_reg(0, 6); // mutex_create
    kernel.hal_mut().write_reg(1, 0xdead); // nothing staged there
    kernel.on_syscall().unwrap();
    assert_eq!(result_reg(&kernel), -1);
}

#[test]
fn get_pid_round_trips_through_registers() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().write_reg(0, 3);
    kernel.on_syscall().unwrap();
    assert_eq!(result_reg(&kernel), 0);
}

#[test]
fn create_process_round_trips_through_registers() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().stage_str(0x100, "worker");
    kernel.hal_mut().write_reg(0, 0);
    kernel.hal_mut().write_reg(1, 0x100);
    kernel.on_syscall().unwrap();
    assert_eq!(result_reg(&kernel), 1);
    assert_eq!(kernel.process(1).unwrap().state, ProcessState::Ready);
}

#[test]
fn write_copies_a_user_buffer_to_the_console() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().stage_bytes(0x200, b"hola\n");
    kernel.hal_mut().write_reg(0, 2);
    kernel.hal_mut().write_reg(1, 0x200);
    kernel.hal_mut().write_reg(2, 5);
    kernel.on_syscall().unwrap();
    assert_eq!(result_reg(&kernel), 0);
    assert_eq!(kernel.hal().console_text(), "hola\n");
}

#[test]
fn failed_service_reports_failure_in_the_result_register() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().write_reg(0, 8); // mutex_lock
    kernel.hal_mut().write_reg(1, 2); // never opened
    kernel.on_syscall().unwrap();
    assert_eq!(result_reg(&kernel), -1);
}

#[test]
fn kernel_mode_fault_halts_the_whole_system() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal_mut().set_user_mode(false);

    let err = kernel.on_exception(Exception::Arithmetic).unwrap_err();
    assert!(matches!(err, KernelError::FatalConfiguration(_)));

    // not a per-process failure: nothing was terminated
    assert_eq!(kernel.processes().len(), 1);
    assert_eq!(kernel.current(), Some(0));
}

#[test]
fn user_mode_fault_terminates_only_the_faulting_process() {
    let mut kernel = boot(KernelConfig::default());
    kernel
        .service_call(Syscall::CreateProcess { program: "worker".into() })
        .unwrap();

    kernel.on_exception(Exception::Memory).unwrap();

    assert_eq!(kernel.process(0).unwrap().state, ProcessState::Unused);
    assert_eq!(kernel.current(), Some(1));
    assert_eq!(kernel.process(1).unwrap().state, ProcessState::Running);
}

#[test]
fn ticks_are_attributed_by_privilege_mode() {
    let mut kernel = boot(KernelConfig::default());

    for _ in 0..3 {
        kernel.on_clock_tick();
    }
    kernel.hal_mut().set_user_mode(false);
    for _ in 0..2 {
        kernel.on_clock_tick();
    }
    kernel.hal_mut().set_user_mode(true);

    let outcome = kernel
        .service_call(Syscall::ProcessTimes { dest: Some(0x500) })
        .unwrap();
    assert_eq!(outcome, Outcome::Done(5), "ticks since boot");
    assert_eq!(kernel.hal().user_words_at(0x500), Some([3u64, 2u64].as_slice()));
}

#[test]
fn terminal_interrupt_drains_one_key() {
    let mut kernel = boot(KernelConfig::default());
    kernel.hal().press_key(b'a');
    kernel.hal().press_key(b'b');

    kernel.on_terminal();

    assert_eq!(kernel.hal_mut().read_terminal(), Some(b'b'), "one unit drained");
    assert_eq!(kernel.current(), Some(0), "no scheduling effect");
}

#[test]
fn software_interrupt_has_no_scheduling_effect() {
    let mut kernel = boot(KernelConfig::default());
    kernel
        .service_call(Syscall::CreateProcess { program: "worker".into() })
        .unwrap();
    let ready = kernel.ready_pids();

    kernel.on_software();

    assert_eq!(kernel.current(), Some(0));
    assert_eq!(kernel.ready_pids(), ready);
}
