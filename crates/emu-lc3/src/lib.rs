//! LC-3 16-bit instructional computer emulator.
//!
//! Models the machine at architectural (per-instruction) granularity:
//! 8 general registers, a 64K-word address space, the 16-opcode instruction
//! set, two-level privilege with a banked stack pointer, memory-mapped
//! keyboard/display registers, and the trap/RTI context-switch protocol.
//! No cycle timing — each `step()` retires one whole instruction.

pub mod bits;
mod config;
mod error;
mod machine;
mod memory;
mod ops;
pub mod os;
mod registers;

pub use config::Lc3Config;
pub use error::ExecError;
pub use machine::Lc3;
pub use memory::{DDR, DSR, DEVICE_BASE, KBDR, KBSR, MEM_SIZE, USER_BASE};
pub use registers::{Cond, PSR_USER, Registers};
