/*!
 * Hardware Abstraction Layer
 * The narrow collaborator boundary the kernel core is written against
 */

mod sim;

pub use sim::SimHal;

use crate::core::types::{Address, Register};

/// Opaque handle to a process memory image built by the HAL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(pub(crate) u32);

/// Opaque handle to an allocated stack region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackHandle(pub(crate) u32);

/// Saved execution context of a process. Owned by its process-table slot
/// and opaque to the kernel core; only the HAL reads or writes it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pc: u64,
    sp: u64,
}

/// Interrupt level, by what it still admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IrqLevel {
    /// Everything admitted.
    Open,
    /// Only clock and device interrupts admitted (idle wait).
    DeviceOnly,
    /// Nothing admitted (critical section).
    Masked,
}

/// Interrupt delivered while halted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqEvent {
    Clock,
    Terminal,
    Software,
}

/// Interrupt/trap vectors the kernel installs handlers for at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vector {
    ArithmeticFault,
    MemoryFault,
    Clock,
    Terminal,
    Syscall,
    Software,
}

impl Vector {
    pub const ALL: [Vector; 6] = [
        Vector::ArithmeticFault,
        Vector::MemoryFault,
        Vector::Clock,
        Vector::Terminal,
        Vector::Syscall,
        Vector::Software,
    ];
}

/// Hardware collaborator interface.
///
/// Everything the kernel core needs from the machine: memory-image
/// construction, stacks, context save/restore, registers and user memory
/// for argument passing, interrupt-level control, vector installation,
/// device initialization, the halt-until-interrupt idle primitive, the
/// privilege-mode query, and the diagnostic console.
pub trait Hal {
    /// Build a memory image for `program` and return its handle plus the
    /// entry point, or `None` when no such program can be loaded.
    fn build_image(&mut self, program: &str) -> Option<(ImageHandle, u64)>;
    fn release_image(&mut self, image: ImageHandle);

    fn alloc_stack(&mut self, size: usize) -> StackHandle;
    fn release_stack(&mut self, stack: StackHandle);

    /// Prepare the initial saved context for a fresh process.
    fn init_context(
        &mut self,
        image: ImageHandle,
        stack: StackHandle,
        stack_size: usize,
        entry: u64,
    ) -> Context;

    /// Save the running context into `save` (if any) and resume `restore`.
    /// `save` is `None` at boot and when the outgoing process is gone.
    fn context_switch(&mut self, save: Option<&mut Context>, restore: &Context);

    fn read_reg(&self, reg: usize) -> Register;
    fn write_reg(&mut self, reg: usize, value: Register);

    /// Read a NUL-free string argument from user memory.
    fn read_user_str(&self, addr: Address) -> Option<String>;
    fn read_user_bytes(&self, addr: Address, len: usize) -> Vec<u8>;
    fn write_user_words(&mut self, addr: Address, words: &[u64]);

    fn irq_level(&self) -> IrqLevel;
    /// Set the interrupt level, returning the previous one.
    fn set_irq_level(&mut self, level: IrqLevel) -> IrqLevel;

    fn install_vector(&mut self, vector: Vector);
    fn init_clock(&mut self, tick_hz: u32);
    fn init_keyboard(&mut self);

    /// Halt until an interrupt is delivered, returning it.
    fn wait_for_interrupt(&mut self) -> IrqEvent;

    /// Whether the interrupted context was running in user mode.
    fn from_user_mode(&self) -> bool;

    /// Drain one unit of terminal input, if any.
    fn read_terminal(&mut self) -> Option<u8>;

    /// Diagnostic sink.
    fn console_write(&mut self, bytes: &[u8]);
}
