//! Opcode handlers: one state-transition function per instruction.
//!
//! Instruction word layout: bits 15-12 opcode, bits 11-9 DR (or the BR
//! condition mask, or the source register for stores), bits 8-6 the base
//! register, bit 5 the immediate-mode toggle, bit 11 the JSR-mode toggle,
//! and a signed offset/immediate field of width 5, 6, 9, or 11 in the low
//! bits. TRAP carries a zero-extended 8-bit vector.

use crate::bits::sign_extend;
use crate::error::ExecError;
use crate::machine::Lc3;
use crate::os;
use crate::registers::Cond;

const IMM_TOGGLE: u16 = 1 << 5;
const JSR_TOGGLE: u16 = 1 << 11;

const fn dr(ir: u16) -> usize {
    ((ir >> 9) & 0x7) as usize
}

/// Source register for ST/STR/STI (same field as DR).
const fn sr(ir: u16) -> usize {
    dr(ir)
}

const fn base_r(ir: u16) -> usize {
    ((ir >> 6) & 0x7) as usize
}

const fn sr2(ir: u16) -> usize {
    (ir & 0x7) as usize
}

fn imm5(ir: u16) -> u16 {
    sign_extend(ir & 0x1F, 5)
}

fn off6(ir: u16) -> u16 {
    sign_extend(ir & 0x3F, 6)
}

fn off9(ir: u16) -> u16 {
    sign_extend(ir & 0x1FF, 9)
}

fn off11(ir: u16) -> u16 {
    sign_extend(ir & 0x7FF, 11)
}

const fn trapvect8(ir: u16) -> u16 {
    ir & 0xFF
}

/// Dispatch on the top nibble of IR. The table is a closed enumeration:
/// fifteen handlers plus the reserved pattern 0b1101, which (like any
/// future gap) fails with `UnknownInstruction`.
pub(crate) fn dispatch(lc3: &mut Lc3, opcode: u16) -> Result<(), ExecError> {
    match opcode {
        0x0 => br(lc3),
        0x1 => add(lc3),
        0x2 => ld(lc3),
        0x3 => st(lc3),
        0x4 => jsr(lc3),
        0x5 => and(lc3),
        0x6 => ldr(lc3),
        0x7 => str(lc3),
        0x8 => rti(lc3),
        0x9 => not(lc3),
        0xA => ldi(lc3),
        0xB => sti(lc3),
        0xC => jmp(lc3),
        0xE => lea(lc3),
        0xF => trap(lc3),
        // 0xD is reserved
        _ => Err(ExecError::UnknownInstruction {
            ir: lc3.regs.ir,
            opcode,
        }),
    }
}

/// Write a register and update the condition code from the value's sign.
fn load_reg(lc3: &mut Lc3, index: usize, value: u16) {
    lc3.regs.r[index] = value;
    lc3.regs.cc = Cond::from_value(value);
}

// Branching and control transfer

fn br(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let mask = (ir >> 9) & 0x7;
    if mask & lc3.regs.cc.mask() != 0 {
        lc3.regs.pc = lc3.regs.pc.wrapping_add(off9(ir));
    }
    Ok(())
}

fn jmp(lc3: &mut Lc3) -> Result<(), ExecError> {
    let base = base_r(lc3.regs.ir);
    if base == 7 {
        // RET convention
        lc3.pop_call();
    }
    lc3.regs.pc = lc3.regs.r[base];
    Ok(())
}

fn jsr(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let return_address = lc3.regs.pc;
    let target = if ir & JSR_TOGGLE != 0 {
        lc3.regs.pc.wrapping_add(off11(ir))
    } else {
        lc3.regs.r[base_r(ir)]
    };
    lc3.push_call(return_address);
    lc3.regs.r[7] = return_address;
    lc3.regs.pc = target;
    Ok(())
}

// ALU

fn add(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let lhs = lc3.regs.r[base_r(ir)];
    let rhs = if ir & IMM_TOGGLE != 0 {
        imm5(ir)
    } else {
        lc3.regs.r[sr2(ir)]
    };
    load_reg(lc3, dr(ir), lhs.wrapping_add(rhs));
    Ok(())
}

fn and(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let lhs = lc3.regs.r[base_r(ir)];
    let rhs = if ir & IMM_TOGGLE != 0 {
        imm5(ir)
    } else {
        lc3.regs.r[sr2(ir)]
    };
    load_reg(lc3, dr(ir), lhs & rhs);
    Ok(())
}

fn not(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let value = !lc3.regs.r[base_r(ir)];
    load_reg(lc3, dr(ir), value);
    Ok(())
}

// Loads

fn ld(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let address = lc3.regs.pc.wrapping_add(off9(ir));
    let value = lc3.read_mem(address)?;
    load_reg(lc3, dr(ir), value);
    Ok(())
}

fn ldr(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let address = lc3.regs.r[base_r(ir)].wrapping_add(off6(ir));
    let value = lc3.read_mem(address)?;
    load_reg(lc3, dr(ir), value);
    Ok(())
}

fn ldi(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let pointer = lc3.regs.pc.wrapping_add(off9(ir));
    let address = lc3.read_mem(pointer)?;
    let value = lc3.read_mem(address)?;
    load_reg(lc3, dr(ir), value);
    Ok(())
}

fn lea(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let address = lc3.regs.pc.wrapping_add(off9(ir));
    // Address computation only: the condition code is left alone.
    lc3.regs.r[dr(ir)] = address;
    Ok(())
}

// Stores

fn st(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let address = lc3.regs.pc.wrapping_add(off9(ir));
    lc3.write_mem(address, lc3.regs.r[sr(ir)])
}

fn str(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let address = lc3.regs.r[base_r(ir)].wrapping_add(off6(ir));
    lc3.write_mem(address, lc3.regs.r[sr(ir)])
}

fn sti(lc3: &mut Lc3) -> Result<(), ExecError> {
    let ir = lc3.regs.ir;
    let pointer = lc3.regs.pc.wrapping_add(off9(ir));
    let address = lc3.read_mem(pointer)?;
    lc3.write_mem(address, lc3.regs.r[sr(ir)])
}

// Traps and privilege

/// TRAP: HALT short-circuits to `stop()`. Any other vector performs the
/// supervisor context switch: bank in the supervisor SP if coming from
/// user mode, push PC then PSR onto the R6 stack (descending), clear the
/// mode bit, and jump through the vector table entry.
fn trap(lc3: &mut Lc3) -> Result<(), ExecError> {
    let vector = trapvect8(lc3.regs.ir);
    if vector == os::vector::HALT {
        lc3.stop();
        return Ok(());
    }
    if lc3.regs.user_mode() {
        lc3.regs.saved_usp = lc3.regs.r[6];
        lc3.regs.r[6] = lc3.regs.saved_ssp;
    }
    let sp = lc3.regs.r[6].wrapping_sub(1);
    lc3.write_mem(sp, lc3.regs.pc)?;
    lc3.regs.r[6] = sp;
    let sp = sp.wrapping_sub(1);
    lc3.write_mem(sp, lc3.regs.psr)?;
    lc3.regs.r[6] = sp;
    lc3.regs.set_user_mode(false);
    lc3.regs.pc = lc3.read_mem(vector)?;
    Ok(())
}

/// RTI: pop PSR then PC off the R6 stack (the reverse of TRAP's push
/// order), then bank the user SP back in if the restored PSR says user.
fn rti(lc3: &mut Lc3) -> Result<(), ExecError> {
    let sp = lc3.regs.r[6];
    let psr = lc3.read_mem(sp)?;
    let pc = lc3.read_mem(sp.wrapping_add(1))?;
    lc3.regs.psr = psr;
    lc3.regs.pc = pc;
    lc3.regs.r[6] = sp.wrapping_add(2);
    if lc3.regs.user_mode() {
        lc3.regs.saved_ssp = lc3.regs.r[6];
        lc3.regs.r[6] = lc3.regs.saved_usp;
    }
    Ok(())
}
