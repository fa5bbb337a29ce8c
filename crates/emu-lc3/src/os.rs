//! The fixed supervisor image installed over low memory at construction:
//! the trap vector table plus a minimal set of service routines.
//!
//! The routines are hand-assembled LC-3 machine code. Each one runs on the
//! supervisor stack set up by the TRAP context switch and returns with RTI.
//! With privilege checks enabled the fetch precondition rejects PC below
//! user space, so the routines are only reachable when checks are disabled;
//! the vector table is installed either way.

use crate::memory::MEM_SIZE;

/// Trap vectors serviced by the supervisor image.
pub mod vector {
    /// Read one character from the keyboard into R0 (busy-waits on KBSR).
    pub const GETC: u16 = 0x20;
    /// Write the character in R0 to the display.
    pub const OUT: u16 = 0x21;
    /// Write the zero-terminated string pointed to by R0 to the display.
    pub const PUTS: u16 = 0x22;
    /// Read one character into R0 and echo it to the display.
    pub const IN: u16 = 0x23;
    /// Packed-string output. Stubbed: returns immediately.
    pub const PUTSP: u16 = 0x24;
    /// Halt the machine. Intercepted by the execution engine before any
    /// context switch; the table entry exists only for completeness.
    pub const HALT: u16 = 0x25;
}

/// Low memory at or above this address is untouched by the image.
pub const OS_LIMIT: u16 = 0x0500;

const GETC_ENTRY: u16 = 0x0400;
const OUT_ENTRY: u16 = 0x0410;
const PUTS_ENTRY: u16 = 0x0420;
const IN_ENTRY: u16 = 0x0430;
const PUTSP_ENTRY: u16 = 0x0440;
const HALT_ENTRY: u16 = 0x0448;

const VECTORS: [(u16, u16); 6] = [
    (vector::GETC, GETC_ENTRY),
    (vector::OUT, OUT_ENTRY),
    (vector::PUTS, PUTS_ENTRY),
    (vector::IN, IN_ENTRY),
    (vector::PUTSP, PUTSP_ENTRY),
    (vector::HALT, HALT_ENTRY),
];

const GETC_ROUTINE: [u16; 6] = [
    0xA003, // LDI R0, KBSR   ; poll status (N when ready)
    0x07FE, // BRzp GETC      ; not ready, spin
    0xA002, // LDI R0, KBDR   ; dequeue the character
    0x8000, // RTI
    0xFE00, // .FILL KBSR
    0xFE02, // .FILL KBDR
];

const OUT_ROUTINE: [u16; 3] = [
    0xB001, // STI R0, DDR    ; display is always ready
    0x8000, // RTI
    0xFE06, // .FILL DDR
];

const PUTS_ROUTINE: [u16; 8] = [
    0x1220, // ADD R1, R0, #0 ; R1 walks the string
    0x6040, // LDR R0, R1, #0 ; next character
    0x0403, // BRz DONE       ; zero terminator
    0xB003, // STI R0, DDR
    0x1261, // ADD R1, R1, #1
    0x0FFB, // BRnzp LOOP
    0x8000, // RTI            ; DONE
    0xFE06, // .FILL DDR
];

const IN_ROUTINE: [u16; 9] = [
    0xA005, // LDI R0, KBSR
    0x07FE, // BRzp IN        ; spin until ready
    0xA004, // LDI R0, KBDR
    0xB004, // STI R0, DDR    ; echo
    0x8000, // RTI
    0x0000,
    0xFE00, // .FILL KBSR
    0xFE02, // .FILL KBDR
    0xFE06, // .FILL DDR
];

// PUTSP is not implemented; HALT never reaches its routine. Both vectors
// point at a bare RTI so a stray jump still returns cleanly.
const STUB_ROUTINE: [u16; 1] = [0x8000];

/// Install the supervisor image. The OS region below [`OS_LIMIT`] is
/// cleared first so a randomized memory fill never perturbs the table or
/// the routines.
pub(crate) fn install(cells: &mut [u16; MEM_SIZE]) {
    for cell in &mut cells[..usize::from(OS_LIMIT)] {
        *cell = 0;
    }
    for (vec, entry) in VECTORS {
        cells[usize::from(vec)] = entry;
    }
    for (entry, routine) in [
        (GETC_ENTRY, &GETC_ROUTINE[..]),
        (OUT_ENTRY, &OUT_ROUTINE[..]),
        (PUTS_ENTRY, &PUTS_ROUTINE[..]),
        (IN_ENTRY, &IN_ROUTINE[..]),
        (PUTSP_ENTRY, &STUB_ROUTINE[..]),
        (HALT_ENTRY, &STUB_ROUTINE[..]),
    ] {
        let start = usize::from(entry);
        cells[start..start + routine.len()].copy_from_slice(routine);
    }
}
