//! The LC-3 machine: state container plus the fetch/decode/dispatch engine.

use std::thread;
use std::time::{Duration, Instant};

use format_lc3_obj::ObjImage;

use crate::config::Lc3Config;
use crate::error::ExecError;
use crate::memory::{DEVICE_BASE, MemoryBus, USER_BASE};
use crate::registers::Registers;
use crate::{ops, os};

/// An LC-3 virtual machine.
///
/// All state — memory, registers, I/O buffers, the diagnostic call stack —
/// is owned by the instance and mutated only through [`Lc3::step`] (and the
/// load/feed methods between runs). There is no reset: a new logical run
/// takes a new instance or another [`Lc3::load_image`] call.
pub struct Lc3 {
    pub regs: Registers,
    pub(crate) mem: MemoryBus,
    halted: bool,
    /// Return addresses of in-flight subroutine calls. Auxiliary only:
    /// pushed by JSR/JSRR, popped by RET (JMP through R7).
    call_stack: Vec<u16>,
    config: Lc3Config,
}

impl Default for Lc3 {
    fn default() -> Self {
        Self::new(Lc3Config::default())
    }
}

impl Lc3 {
    /// Create a machine: memory zeroed or randomized per the config, then
    /// the supervisor image installed over the low region.
    #[must_use]
    pub fn new(config: Lc3Config) -> Self {
        let mut mem = MemoryBus::new(config.ignore_privilege, config.randomize, config.seed);
        os::install(mem.cells_mut());
        Self {
            regs: Registers::new(config.start_pc),
            mem,
            halted: false,
            call_stack: Vec::new(),
            config,
        }
    }

    // Execution controls

    /// Execute one instruction: fetch, decode, dispatch.
    ///
    /// The PC must lie in user space below the device region (the low bound
    /// is waived when privilege checks are off); otherwise the step fails
    /// with `OutOfBounds` before touching any state. Handler faults
    /// propagate unchanged; the fetch increment is never rolled back.
    pub fn step(&mut self) -> Result<(), ExecError> {
        let pc = self.regs.pc;
        if pc >= DEVICE_BASE || (!self.config.ignore_privilege && pc < USER_BASE) {
            return Err(ExecError::OutOfBounds { pc });
        }
        self.regs.ir = self.read_mem(pc)?;
        self.regs.pc = pc.wrapping_add(1);
        let opcode = self.regs.ir >> 12;
        ops::dispatch(self, opcode)
    }

    /// Step until halted or the instruction budget runs out. Exhausting the
    /// budget without halting fails with `RunawayProgram`, reporting the PC
    /// as of the last executed step.
    pub fn run(&mut self) -> Result<(), ExecError> {
        let mut remaining = self.config.execution_limit;
        while !self.halted {
            if remaining == 0 {
                return Err(ExecError::RunawayProgram { pc: self.regs.pc });
            }
            remaining -= 1;
            self.step()?;
        }
        Ok(())
    }

    /// Step once per configured tick interval until halted.
    ///
    /// A single deadline-based repeating timer paces the loop; there is no
    /// background thread, and [`Lc3::stop`] (or a HALT trap) cancels it at
    /// the next tick. Intended for interactive single-stepping, not
    /// throughput.
    pub fn run_tick(&mut self) -> Result<(), ExecError> {
        let period = Duration::from_millis(self.config.tick_rate);
        let mut deadline = Instant::now();
        while !self.halted {
            self.step()?;
            deadline += period;
            thread::sleep(deadline.saturating_duration_since(Instant::now()));
        }
        Ok(())
    }

    /// Halt the machine. Idempotent; pending tick loops observe the flag
    /// and stop. Does not undo the last completed step.
    pub fn stop(&mut self) {
        self.halted = true;
    }

    #[must_use]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    // Memory API (the single privilege-checked access path)

    /// Read through the memory access controller, wrapping any fault with
    /// the current PC/IR context.
    pub fn read_mem(&mut self, address: u16) -> Result<u16, ExecError> {
        let (pc, ir) = (self.regs.pc, self.regs.ir);
        self.mem
            .read(address)
            .map_err(|fault| ExecError::AccessViolation {
                address: fault.address,
                pc,
                ir,
            })
    }

    /// Write through the memory access controller.
    pub fn write_mem(&mut self, address: u16, value: u16) -> Result<(), ExecError> {
        let (pc, ir) = (self.regs.pc, self.regs.ir);
        self.mem
            .write(address, value)
            .map_err(|fault| ExecError::AccessViolation {
                address: fault.address,
                pc,
                ir,
            })
    }

    /// Raw backing-store read: no checks, no device side effects. For
    /// observation and tests.
    #[must_use]
    pub fn peek(&self, address: u16) -> u16 {
        self.mem.peek(address)
    }

    // Object image loading

    /// Write every segment of a parsed object image into memory through the
    /// access controller, so the same privilege rules apply as at run time:
    /// loading into supervisor-reserved or device space fails with
    /// `AccessViolation` unless checks are disabled.
    pub fn load_image(&mut self, image: &ObjImage) -> Result<(), ExecError> {
        for segment in image.segments() {
            let mut address = segment.origin;
            for &word in &segment.words {
                self.write_mem(address, word)?;
                address = address.wrapping_add(1);
            }
        }
        Ok(())
    }

    // I/O buffers (shared with the external input source / display)

    /// Queue characters for the keyboard device, in order.
    pub fn queue_input(&mut self, text: &str) {
        for c in text.chars() {
            self.mem.queue_input(c as u16);
        }
    }

    /// Characters not yet consumed by KBDR reads.
    #[must_use]
    pub fn input_pending(&self) -> usize {
        self.mem.input_pending()
    }

    /// The output log in write order.
    #[must_use]
    pub fn output(&self) -> &[char] {
        self.mem.output()
    }

    /// Drain the output log into a string.
    pub fn take_output(&mut self) -> String {
        self.mem.take_output()
    }

    // Diagnostic call stack

    #[must_use]
    pub fn call_stack(&self) -> &[u16] {
        &self.call_stack
    }

    #[must_use]
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }

    pub(crate) fn push_call(&mut self, return_address: u16) {
        self.call_stack.push(return_address);
    }

    pub(crate) fn pop_call(&mut self) {
        self.call_stack.pop();
    }
}
