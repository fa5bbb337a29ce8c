//! LC-3 register file and processor state words.

/// User-mode bit of the processor status word (0 = supervisor, 1 = user).
pub const PSR_USER: u16 = 0x8000;

/// Condition code: the sign of the last value written by an ALU or load
/// instruction. Exactly one of the three states is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    N,
    Z,
    P,
}

impl Cond {
    /// Classify a word by its two's-complement sign.
    #[must_use]
    pub fn from_value(value: u16) -> Self {
        if value == 0 {
            Self::Z
        } else if value & 0x8000 != 0 {
            Self::N
        } else {
            Self::P
        }
    }

    /// 3-bit mask in BR-instruction layout: N = bit 2, Z = bit 1, P = bit 0.
    #[must_use]
    pub const fn mask(self) -> u16 {
        match self {
            Self::N => 0b100,
            Self::Z => 0b010,
            Self::P => 0b001,
        }
    }
}

/// LC-3 register set.
///
/// - R0-R7: general purpose; R6 holds the active stack pointer and R7 the
///   subroutine return address by convention.
/// - PC: address of the next instruction (already incremented during fetch).
/// - IR: the most recently fetched word; all operand decoding reads it.
/// - PSR: processor status; only bit 15 (user mode) is interpreted. Stored
///   separately from IR.
/// - `saved_usp`/`saved_ssp`: banked shadow values for R6, swapped on
///   privilege transitions (trap entry, RTI exit).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registers {
    pub r: [u16; 8],
    pub pc: u16,
    pub ir: u16,
    pub psr: u16,
    pub saved_usp: u16,
    pub saved_ssp: u16,
    pub cc: Cond,
}

impl Registers {
    /// Create registers in power-on state: supervisor mode, condition code
    /// Z, supervisor stack shadow at 0x2FFF, PC at the given start address.
    #[must_use]
    pub const fn new(start_pc: u16) -> Self {
        Self {
            r: [0; 8],
            pc: start_pc,
            ir: 0,
            psr: 0,
            saved_usp: 0,
            saved_ssp: 0x2FFF,
            cc: Cond::Z,
        }
    }

    #[must_use]
    pub const fn user_mode(&self) -> bool {
        self.psr & PSR_USER != 0
    }

    pub const fn set_user_mode(&mut self, user: bool) {
        if user {
            self.psr |= PSR_USER;
        } else {
            self.psr &= !PSR_USER;
        }
    }
}
