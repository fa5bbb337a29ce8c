//! Execution faults.

use std::fmt;

use crate::bits::hex4;

/// A fault raised during `step()`/`run()`. All variants are fatal to the
/// in-progress call and propagate to the caller unmodified; machine state
/// reflects exactly the last successfully completed effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecError {
    /// Address out of range or privilege-blocked.
    AccessViolation { address: u16, pc: u16, ir: u16 },
    /// The fetched word's opcode is not in the dispatch table.
    UnknownInstruction { ir: u16, opcode: u16 },
    /// PC itself is outside the permitted fetch range.
    OutOfBounds { pc: u16 },
    /// Instruction budget exhausted without halting.
    RunawayProgram { pc: u16 },
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccessViolation { address, pc, ir } => write!(
                f,
                "access violation at {} (PC = {}, IR = {})",
                hex4(*address),
                hex4(*pc),
                hex4(*ir),
            ),
            Self::UnknownInstruction { ir, opcode } => write!(
                f,
                "unknown instruction {} (opcode 0b{opcode:04b})",
                hex4(*ir),
            ),
            Self::OutOfBounds { pc } => {
                write!(f, "PC {} out of the permitted fetch range", hex4(*pc))
            }
            Self::RunawayProgram { pc } => write!(
                f,
                "instruction budget exhausted without halting (PC = {})",
                hex4(*pc),
            ),
        }
    }
}

impl std::error::Error for ExecError {}
