//! Memory access controller: the 64K word store, privilege enforcement,
//! and memory-mapped device registers.
//!
//! Address map:
//! - `0x0000-0x2FFF`: supervisor-reserved (OS image, trap vector table)
//! - `0x3000-0xFDFF`: user space
//! - `0xFE00-0xFFFF`: device registers (only the four below exist)
//!
//! Every memory access in the machine — instruction fetch, loads, stores,
//! trap stack pushes, image loading — goes through [`MemoryBus`]. It is the
//! single enforcement point for the two-region protection model.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Words in the address space.
pub const MEM_SIZE: usize = 1 << 16;
/// First user-space address; everything below is supervisor-reserved.
pub const USER_BASE: u16 = 0x3000;
/// First device-register address.
pub const DEVICE_BASE: u16 = 0xFE00;

/// Keyboard status register: bit 15 set iff input is pending.
pub const KBSR: u16 = 0xFE00;
/// Keyboard data register: dequeues the next input character code.
pub const KBDR: u16 = 0xFE02;
/// Display status register: always reports ready.
pub const DSR: u16 = 0xFE04;
/// Display data register: writes append to the output log.
pub const DDR: u16 = 0xFE06;

const READY: u16 = 0x8000;

/// A blocked or unmapped access, carrying only the offending address.
/// The machine wraps it with PC/IR context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BusFault {
    pub address: u16,
}

/// The word store plus the device-register emulation layered over it.
pub(crate) struct MemoryBus {
    cells: [u16; MEM_SIZE],
    /// Pending input character codes, consumed FIFO by KBDR reads.
    input: VecDeque<u16>,
    /// Append-only output log, produced by DDR writes.
    output: Vec<char>,
    ignore_privilege: bool,
}

impl MemoryBus {
    pub fn new(ignore_privilege: bool, randomize: bool, seed: Option<u64>) -> Self {
        let mut cells = [0u16; MEM_SIZE];
        if randomize {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            for cell in &mut cells {
                *cell = rng.random();
            }
        }
        Self {
            cells,
            input: VecDeque::new(),
            output: Vec::new(),
            ignore_privilege,
        }
    }

    /// Read one word. Device registers are intercepted before the backing
    /// store; KBDR consumes from the input queue.
    pub fn read(&mut self, address: u16) -> Result<u16, BusFault> {
        self.check_region(address)?;
        match address {
            KBSR => Ok(if self.input.is_empty() { 0 } else { READY }),
            KBDR => Ok(self.input.pop_front().unwrap_or(0)),
            DSR => Ok(READY),
            _ => {
                self.check_device_hole(address)?;
                Ok(self.cells[usize::from(address)])
            }
        }
    }

    /// Write one word. DDR is intercepted; everything else lands in the
    /// backing store, subject to the same region checks as reads.
    pub fn write(&mut self, address: u16, value: u16) -> Result<(), BusFault> {
        self.check_region(address)?;
        if address == DDR {
            self.output
                .push(char::from_u32(u32::from(value)).unwrap_or(char::REPLACEMENT_CHARACTER));
            return Ok(());
        }
        self.check_device_hole(address)?;
        self.cells[usize::from(address)] = value;
        Ok(())
    }

    /// Raw backing-store read: no privilege checks, no device intercepts,
    /// no queue side effects. For observation and tests only.
    pub fn peek(&self, address: u16) -> u16 {
        self.cells[usize::from(address)]
    }

    pub fn cells_mut(&mut self) -> &mut [u16; MEM_SIZE] {
        &mut self.cells
    }

    pub fn queue_input(&mut self, code: u16) {
        self.input.push_back(code);
    }

    pub fn input_pending(&self) -> usize {
        self.input.len()
    }

    pub fn output(&self) -> &[char] {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        self.output.drain(..).collect()
    }

    /// Supervisor-region check. The device region has its own rule because
    /// the four device registers must stay reachable from user mode.
    fn check_region(&self, address: u16) -> Result<(), BusFault> {
        if !self.ignore_privilege && address < USER_BASE {
            return Err(BusFault { address });
        }
        Ok(())
    }

    /// No generic memory exists between the device registers: anything else
    /// at or above `DEVICE_BASE` is rejected unless checks are off.
    fn check_device_hole(&self, address: u16) -> Result<(), BusFault> {
        if !self.ignore_privilege && address >= DEVICE_BASE {
            return Err(BusFault { address });
        }
        Ok(())
    }
}
