/*!
 * Simulated HAL
 *
 * Deterministic in-process implementation of the hardware boundary.
 * Registers, user memory, and interrupt delivery are plain state the
 * embedding program (or a test) stages explicitly; the clock can free-run
 * so an idle kernel always makes progress. Device-facing buffers sit
 * behind locks because keys and console output arrive from outside the
 * kernel's thread of control.
 */

use super::{Context, Hal, ImageHandle, IrqEvent, IrqLevel, StackHandle, Vector};
use crate::core::limits::NUM_REGS;
use crate::core::types::{Address, Register};
use log::{debug, trace};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug)]
pub struct SimHal {
    regs: [Register; NUM_REGS],
    user_bytes: HashMap<Address, Vec<u8>>,
    user_words: HashMap<Address, Vec<u64>>,

    irq_level: IrqLevel,
    user_mode: bool,
    installed: Vec<Vector>,
    clock_hz: Option<u32>,
    keyboard_ready: bool,

    events: VecDeque<IrqEvent>,
    free_running_clock: bool,
    halts: u64,
    halt_fuse: Option<u64>,

    next_image: u32,
    live_images: u32,
    refused: HashSet<String>,
    next_stack: u32,
    live_stacks: u32,
    switches: u64,

    keys: Mutex<VecDeque<u8>>,
    console: Mutex<Vec<u8>>,
}

impl SimHal {
    pub fn new() -> Self {
        Self {
            regs: [0; NUM_REGS],
            user_bytes: HashMap::new(),
            user_words: HashMap::new(),
            irq_level: IrqLevel::Open,
            user_mode: true,
            installed: Vec::new(),
            clock_hz: None,
            keyboard_ready: false,
            events: VecDeque::new(),
            free_running_clock: true,
            halts: 0,
            halt_fuse: None,
            next_image: 0,
            live_images: 0,
            refused: HashSet::new(),
            next_stack: 0,
            live_stacks: 0,
            switches: 0,
            keys: Mutex::new(VecDeque::new()),
            console: Mutex::new(Vec::new()),
        }
    }

    /// Stage a string blob in user memory.
    pub fn stage_str(&mut self, addr: Address, text: &str) {
        self.user_bytes.insert(addr, text.as_bytes().to_vec());
    }

    /// Stage raw bytes in user memory.
    pub fn stage_bytes(&mut self, addr: Address, bytes: &[u8]) {
        self.user_bytes.insert(addr, bytes.to_vec());
    }

    /// Words the kernel wrote back to user memory at `addr`.
    pub fn user_words_at(&self, addr: Address) -> Option<&[u64]> {
        self.user_words.get(&addr).map(Vec::as_slice)
    }

    /// Make `build_image` fail for this program name.
    pub fn refuse_program(&mut self, program: &str) {
        self.refused.insert(program.to_string());
    }

    /// Set the privilege mode reported for interrupted contexts.
    pub fn set_user_mode(&mut self, user: bool) {
        self.user_mode = user;
    }

    /// Queue one unit of keyboard input (device side, hence `&self`).
    pub fn press_key(&self, key: u8) {
        self.keys.lock().push_back(key);
    }

    /// Everything written to the diagnostic console so far.
    pub fn console_text(&self) -> String {
        String::from_utf8_lossy(&self.console.lock()).into_owned()
    }

    /// Script the next interrupt delivered from a halt.
    pub fn script_event(&mut self, event: IrqEvent) {
        self.events.push_back(event);
    }

    /// With the free-running clock off, halting past the scripted events
    /// is a simulation error instead of an endless tick stream.
    pub fn set_free_running_clock(&mut self, on: bool) {
        self.free_running_clock = on;
    }

    /// Cap the number of halts before the simulation declares the system
    /// wedged. Unset, an idle kernel ticks forever like the real machine.
    pub fn set_halt_fuse(&mut self, fuse: u64) {
        self.halt_fuse = Some(fuse);
    }

    pub fn halts(&self) -> u64 {
        self.halts
    }

    pub fn live_images(&self) -> u32 {
        self.live_images
    }

    pub fn live_stacks(&self) -> u32 {
        self.live_stacks
    }

    pub fn context_switches(&self) -> u64 {
        self.switches
    }

    pub fn installed_vectors(&self) -> &[Vector] {
        &self.installed
    }

    pub fn clock_hz(&self) -> Option<u32> {
        self.clock_hz
    }
}

impl Default for SimHal {
    fn default() -> Self {
        Self::new()
    }
}

impl Hal for SimHal {
    fn build_image(&mut self, program: &str) -> Option<(ImageHandle, u64)> {
        if self.refused.contains(program) {
            debug!("image build refused for {:?}", program);
            return None;
        }
        let id = self.next_image;
        self.next_image += 1;
        self.live_images += 1;
        Some((ImageHandle(id), 0x1000 + u64::from(id) * 0x100))
    }

    fn release_image(&mut self, image: ImageHandle) {
        trace!("image {:?} released", image);
        self.live_images = self.live_images.saturating_sub(1);
    }

    fn alloc_stack(&mut self, size: usize) -> StackHandle {
        let id = self.next_stack;
        self.next_stack += 1;
        self.live_stacks += 1;
        trace!("stack {} of {} bytes allocated", id, size);
        StackHandle(id)
    }

    fn release_stack(&mut self, stack: StackHandle) {
        trace!("stack {:?} released", stack);
        self.live_stacks = self.live_stacks.saturating_sub(1);
    }

    fn init_context(
        &mut self,
        _image: ImageHandle,
        stack: StackHandle,
        stack_size: usize,
        entry: u64,
    ) -> Context {
        Context {
            pc: entry,
            sp: 0x8000_0000 + u64::from(stack.0) * stack_size as u64 + stack_size as u64,
        }
    }

    fn context_switch(&mut self, save: Option<&mut Context>, restore: &Context) {
        self.switches += 1;
        trace!(
            "context switch #{}: save={} restore pc={:#x}",
            self.switches,
            save.is_some(),
            restore.pc
        );
    }

    fn read_reg(&self, reg: usize) -> Register {
        self.regs[reg]
    }

    fn write_reg(&mut self, reg: usize, value: Register) {
        self.regs[reg] = value;
    }

    fn read_user_str(&self, addr: Address) -> Option<String> {
        let bytes = self.user_bytes.get(&addr)?;
        String::from_utf8(bytes.clone()).ok()
    }

    fn read_user_bytes(&self, addr: Address, len: usize) -> Vec<u8> {
        match self.user_bytes.get(&addr) {
            Some(bytes) => bytes.iter().copied().take(len).collect(),
            None => Vec::new(),
        }
    }

    fn write_user_words(&mut self, addr: Address, words: &[u64]) {
        self.user_words.insert(addr, words.to_vec());
    }

    fn irq_level(&self) -> IrqLevel {
        self.irq_level
    }

    fn set_irq_level(&mut self, level: IrqLevel) -> IrqLevel {
        std::mem::replace(&mut self.irq_level, level)
    }

    fn install_vector(&mut self, vector: Vector) {
        debug!("handler installed for {:?}", vector);
        self.installed.push(vector);
    }

    fn init_clock(&mut self, tick_hz: u32) {
        debug!("clock controller initialized at {} Hz", tick_hz);
        self.clock_hz = Some(tick_hz);
    }

    fn init_keyboard(&mut self) {
        debug!("keyboard controller initialized");
        self.keyboard_ready = true;
    }

    fn wait_for_interrupt(&mut self) -> IrqEvent {
        self.halts += 1;
        if let Some(fuse) = self.halt_fuse {
            assert!(
                self.halts <= fuse,
                "halted {} times with nothing runnable",
                self.halts
            );
        }
        if let Some(event) = self.events.pop_front() {
            return event;
        }
        debug_assert!(
            self.free_running_clock,
            "halted with no pending interrupt and the clock stopped"
        );
        IrqEvent::Clock
    }

    fn from_user_mode(&self) -> bool {
        self.user_mode
    }

    fn read_terminal(&mut self) -> Option<u8> {
        self.keys.lock().pop_front()
    }

    fn console_write(&mut self, bytes: &[u8]) {
        self.console.lock().extend_from_slice(bytes);
    }
}
