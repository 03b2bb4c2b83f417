//! Built-in demo program.
//!
//! A counter in page 1: AC is incremented, pulsed out through bit 6 of OUT
//! so XOUT latches it onto the LEDs, and stored to RAM address 0.

use crate::isa::{BusSel, Cond, Instruction, Mode, Op, RomBuilder};

pub fn demo_rom() -> RomBuilder {
    RomBuilder::new()
        .extend([
            Instruction::nop(),
            Instruction::new(Op::Ld, Mode::DY, BusSel::D, 0x01),
            Instruction::branch(Cond::Jmp, BusSel::D, 0x00),
            Instruction::new(Op::Ld, Mode::DAc, BusSel::D, 0x00),
        ])
        .org(0x0100)
        .extend([
            Instruction::new(Op::Add, Mode::DAc, BusSel::D, 0x01),
            Instruction::new(Op::Ld, Mode::DOut, BusSel::D, 0x40),
            Instruction::new(Op::Ld, Mode::DOut, BusSel::D, 0x00),
            Instruction::new(Op::St, Mode::DAc, BusSel::Ac, 0x00),
            Instruction::branch(Cond::Bra, BusSel::D, 0x00),
            Instruction::nop(),
        ])
}

/// Demo ROM as a full image.
pub fn demo_image() -> Vec<u8> {
    demo_rom().image()
}
