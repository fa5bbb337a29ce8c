//! Unit tests for instruction behavior: ALU wrap-around, condition codes,
//! addressing modes, and control transfer.

use emu_lc3::{Cond, Lc3, Lc3Config};
use format_lc3_obj::ObjImage;

/// A deterministic machine with privilege checks on and zeroed memory.
fn machine() -> Lc3 {
    Lc3::new(Lc3Config {
        randomize: false,
        ..Lc3Config::default()
    })
}

/// Load a program at 0x3000 (where the PC already points).
fn load_program(lc3: &mut Lc3, program: &[u16]) {
    for (i, &word) in program.iter().enumerate() {
        lc3.write_mem(0x3000 + i as u16, word).expect("program load");
    }
}

#[test]
fn add_wraps_modulo_65536_and_sets_z() {
    let mut lc3 = machine();
    lc3.regs.r[0] = 0xFFFF;
    load_program(&mut lc3, &[0x1021]); // ADD R0, R0, #1
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 0x0000, "0xFFFF + 1 wraps to 0");
    assert_eq!(lc3.regs.cc, Cond::Z);
}

#[test]
fn add_negative_immediate_sets_n() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0x103F]); // ADD R0, R0, #-1
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 0xFFFF);
    assert_eq!(lc3.regs.cc, Cond::N);
}

#[test]
fn add_register_mode() {
    let mut lc3 = machine();
    lc3.regs.r[1] = 40;
    lc3.regs.r[2] = 2;
    load_program(&mut lc3, &[0x1042]); // ADD R0, R1, R2
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 42);
    assert_eq!(lc3.regs.cc, Cond::P);
}

#[test]
fn and_masks_and_updates_cc() {
    let mut lc3 = machine();
    lc3.regs.r[1] = 0xF0F0;
    lc3.regs.r[2] = 0x0F0F;
    load_program(&mut lc3, &[0x5042, 0x5260]); // AND R0, R1, R2; AND R1, R1, #0
    lc3.step().expect("register mode");
    assert_eq!(lc3.regs.r[0], 0x0000);
    assert_eq!(lc3.regs.cc, Cond::Z);
    lc3.step().expect("immediate mode");
    assert_eq!(lc3.regs.r[1], 0x0000);
    assert_eq!(lc3.regs.cc, Cond::Z);
}

#[test]
fn not_complements_and_updates_cc() {
    let mut lc3 = machine();
    lc3.regs.r[3] = 0x0F0F;
    load_program(&mut lc3, &[0x90FF]); // NOT R0, R3
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 0xF0F0);
    assert_eq!(lc3.regs.cc, Cond::N);
}

#[test]
fn ld_is_pc_relative() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0x2001, 0x0000, 0x1234]); // LD R0, #1 -> 0x3002
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 0x1234);
    assert_eq!(lc3.regs.cc, Cond::P);
}

#[test]
fn ldr_uses_base_register_value() {
    let mut lc3 = machine();
    lc3.regs.r[2] = 0x4000;
    lc3.write_mem(0x3FFE, 0x8001).expect("data");
    load_program(&mut lc3, &[0x60BE]); // LDR R0, R2, #-2
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 0x8001);
    assert_eq!(lc3.regs.cc, Cond::N);
}

#[test]
fn ldi_double_indirects() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0xA001, 0x0000, 0x4000]); // LDI R0, #1 -> M[0x3002] = 0x4000
    lc3.write_mem(0x4000, 0x00FF).expect("data");
    lc3.step().expect("step");
    assert_eq!(lc3.regs.r[0], 0x00FF);
    assert_eq!(lc3.regs.cc, Cond::P);
}

#[test]
fn lea_loads_the_address_without_touching_cc() {
    let mut lc3 = machine();
    // ADD sets N first; LEA must leave it alone.
    load_program(&mut lc3, &[0x103F, 0xE07E]); // ADD R0, R0, #-1; LEA R0, #126
    lc3.step().expect("add");
    assert_eq!(lc3.regs.cc, Cond::N);
    lc3.step().expect("lea");
    assert_eq!(lc3.regs.r[0], 0x3080, "PC 0x3002 + 126");
    assert_eq!(lc3.regs.cc, Cond::N, "LEA must not update the condition code");
}

#[test]
fn st_str_sti_write_through_memory() {
    let mut lc3 = machine();
    lc3.regs.r[0] = 0xABCD;
    lc3.regs.r[2] = 0x5000;
    load_program(
        &mut lc3,
        &[
            0x3010, // ST R0, #16      -> 0x3011
            0x7082, // STR R0, R2, #2  -> 0x5002
            0xB002, // STI R0, #2      -> M[0x3005] = 0x6000
            0x0000, 0x0000,
            0x6000, // pointer for STI at 0x3005
        ],
    );
    lc3.step().expect("st");
    assert_eq!(lc3.peek(0x3011), 0xABCD);
    lc3.step().expect("str");
    assert_eq!(lc3.peek(0x5002), 0xABCD);
    lc3.step().expect("sti");
    assert_eq!(lc3.peek(0x6000), 0xABCD);
}

#[test]
fn store_does_not_update_cc() {
    let mut lc3 = machine();
    lc3.regs.r[0] = 0x8000;
    load_program(&mut lc3, &[0x3001]); // ST R0, #1
    assert_eq!(lc3.regs.cc, Cond::Z);
    lc3.step().expect("st");
    assert_eq!(lc3.regs.cc, Cond::Z, "stores leave the condition code alone");
}

#[test]
fn br_on_z_does_not_branch_when_cc_is_n() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0x103F, 0x0405]); // ADD R0, R0, #-1; BRz #5
    lc3.step().expect("add");
    lc3.step().expect("br");
    assert_eq!(lc3.regs.pc, 0x3002, "only the fetch increment applies");
}

#[test]
fn br_taken_adds_signed_offset() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0x0403]); // BRz #3 (cc starts as Z)
    lc3.step().expect("br");
    assert_eq!(lc3.regs.pc, 0x3004);
}

#[test]
fn br_backwards() {
    let mut lc3 = machine();
    lc3.write_mem(0x3002, 0x05FE).expect("program"); // BRz #-2 at 0x3002
    lc3.regs.pc = 0x3002;
    lc3.step().expect("br");
    assert_eq!(lc3.regs.pc, 0x3001);
}

#[test]
fn jsr_links_and_jumps_pc_relative() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0x4802]); // JSR #2
    lc3.step().expect("jsr");
    assert_eq!(lc3.regs.r[7], 0x3001, "R7 holds the return address");
    assert_eq!(lc3.regs.pc, 0x3003);
    assert_eq!(lc3.call_stack(), &[0x3001]);
}

#[test]
fn jsrr_jumps_to_base_register_value() {
    let mut lc3 = machine();
    lc3.regs.r[4] = 0x5000;
    load_program(&mut lc3, &[0x4100]); // JSRR R4
    lc3.step().expect("jsrr");
    assert_eq!(lc3.regs.pc, 0x5000);
    assert_eq!(lc3.regs.r[7], 0x3001);
}

#[test]
fn jsrr_through_r7_uses_the_old_value() {
    let mut lc3 = machine();
    lc3.regs.r[7] = 0x5000;
    load_program(&mut lc3, &[0x41C0]); // JSRR R7
    lc3.step().expect("jsrr");
    assert_eq!(lc3.regs.pc, 0x5000, "target read before R7 is overwritten");
    assert_eq!(lc3.regs.r[7], 0x3001);
}

#[test]
fn call_and_return_restore_pc_and_stack_depth() {
    let mut lc3 = machine();
    load_program(
        &mut lc3,
        &[
            0x4801, // 0x3000: JSR #1  -> 0x3002
            0xF025, // 0x3001: TRAP HALT (the return lands here)
            0x1021, // 0x3002: ADD R0, R0, #1
            0xC1C0, // 0x3003: RET (JMP R7)
        ],
    );
    assert_eq!(lc3.call_depth(), 0);
    lc3.step().expect("jsr");
    assert_eq!(lc3.call_depth(), 1);
    lc3.step().expect("subroutine body");
    lc3.step().expect("ret");
    assert_eq!(lc3.regs.pc, 0x3001, "RET returns to the word after the call");
    assert_eq!(lc3.call_depth(), 0, "call stack back to pre-call depth");
    lc3.run().expect("halt");
    assert!(lc3.is_halted());
}

#[test]
fn jmp_through_other_register_leaves_call_stack() {
    let mut lc3 = machine();
    lc3.regs.r[3] = 0x4000;
    load_program(&mut lc3, &[0x4801, 0x0000, 0xC0C0]); // JSR #1; -; JMP R3
    lc3.step().expect("jsr");
    lc3.step().expect("jmp");
    assert_eq!(lc3.regs.pc, 0x4000);
    assert_eq!(lc3.call_depth(), 1, "only RET pops the diagnostic stack");
}

#[test]
fn reserved_opcode_is_rejected() {
    let mut lc3 = machine();
    load_program(&mut lc3, &[0xD123]);
    assert_eq!(
        lc3.step(),
        Err(emu_lc3::ExecError::UnknownInstruction {
            ir: 0xD123,
            opcode: 0xD
        })
    );
}

#[test]
fn faulting_load_keeps_destination_and_cc() {
    let mut lc3 = machine();
    lc3.regs.r[0] = 0x7777;
    lc3.regs.r[2] = 0x1000;
    load_program(&mut lc3, &[0x6080]); // LDR R0, R2, #0 -> supervisor space
    let err = lc3.step().expect_err("supervisor load must fault");
    assert!(matches!(
        err,
        emu_lc3::ExecError::AccessViolation { address: 0x1000, .. }
    ));
    assert_eq!(lc3.regs.r[0], 0x7777, "destination untouched on fault");
    assert_eq!(lc3.regs.cc, Cond::Z, "condition code untouched on fault");
    assert_eq!(lc3.regs.pc, 0x3001, "fetch increment is not rolled back");
}

#[test]
fn effective_addresses_wrap_mod_64k() {
    let mut lc3 = machine();
    lc3.regs.r[1] = 0xFFFF;
    // LDR R0, R1, #1 -> wraps to 0x0000, which is privilege-blocked.
    load_program(&mut lc3, &[0x6041]);
    let err = lc3.step().expect_err("wrapped address is supervisor space");
    assert!(matches!(
        err,
        emu_lc3::ExecError::AccessViolation { address: 0x0000, .. }
    ));
}

#[test]
fn programs_load_via_object_image() {
    let mut lc3 = machine();
    let image = ObjImage::from_words(&[0x3000, 2, 0x1020, 0x1021]).expect("image");
    lc3.load_image(&image).expect("load");
    assert_eq!(lc3.peek(0x3000), 0x1020);
    assert_eq!(lc3.peek(0x3001), 0x1021);
}
