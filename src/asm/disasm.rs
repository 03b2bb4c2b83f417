//! Disassembler.
//!
//! Renders an instruction byte and its operand as text, e.g.
//! `LOAD $42,AC`, `STORE AC,[Y,X] (x++)` or `BNE $10`. A store whose bus
//! source is RAM drives the control lines of an expansion board instead
//! and is shown as `CTRL`.

use std::fmt::Write;

use crate::isa::{BusSel, Instruction, Mode, Op, Target};

fn op_name(op: Op) -> &'static str {
    match op {
        Op::Ld => "LOAD",
        Op::And => "AND",
        Op::Or => "OR",
        Op::Xor => "XOR",
        Op::Add => "ADD",
        Op::Sub => "SUB",
        Op::St => "STORE",
        Op::Bcc => "JUMP",
    }
}

const BRANCH_NAMES: [&str; 8] = ["JUMP Y, ", "BGT ", "BLT ", "BNE ", "BEQ ", "BGE ", "BLE ", "BRA "];

fn ram_name(mode: Mode, d: u8) -> String {
    match mode {
        Mode::XAc => "[X]".to_string(),
        Mode::YdAc => format!("[Y,${:02x}]", d),
        Mode::YxAc | Mode::YxIncOut => "[Y,X]".to_string(),
        Mode::DAc | Mode::DX | Mode::DY | Mode::DOut => format!("[${:02x}]", d),
    }
}

fn target_name(target: Target) -> &'static str {
    match target {
        Target::Ac => "AC",
        Target::X => "X",
        Target::Y => "Y",
        Target::Out => "OUT",
    }
}

/// Bus source text. RAM is shown as the address the mode selects.
fn source_name(bus: BusSel, mode: Mode, d: u8) -> String {
    match bus {
        BusSel::D => format!("${:02x}", d),
        BusSel::Ram => ram_name(mode, d),
        BusSel::Ac => "AC".to_string(),
        BusSel::In => "IN".to_string(),
    }
}

/// Disassemble one instruction.
pub fn disassemble(ir: u8, d: u8) -> String {
    let instr = Instruction::decode(ir, d);
    let incr = if instr.mode == Mode::YxIncOut { " (x++)" } else { "" };

    match instr.op {
        Op::Bcc => {
            // Branches address RAM through [D] regardless of the mode field.
            let src = source_name(instr.bus, Mode::DAc, d);
            format!("{}{}", BRANCH_NAMES[usize::from(instr.cond().bits())], src)
        }
        Op::St => {
            let (name, src) = match instr.bus {
                BusSel::Ram => ("CTRL", "-".to_string()),
                bus => ("STORE", source_name(bus, instr.mode, d)),
            };
            let mut dest = ram_name(instr.mode, d);
            // AC and OUT writes are suppressed by a store; X and Y are not.
            match instr.mode.target() {
                Target::X | Target::Y => {
                    dest.push(',');
                    dest.push_str(target_name(instr.mode.target()));
                }
                Target::Ac | Target::Out => {}
            }
            format!("{} {},{}{}", name, src, dest, incr)
        }
        op => format!(
            "{} {},{}{}",
            op_name(op),
            source_name(instr.bus, instr.mode, d),
            target_name(instr.mode.target()),
            incr
        ),
    }
}

/// One listing line: address, raw fields, then the text.
pub fn listing_line(address: u16, word: u16) -> String {
    let instr = Instruction::from_word(word);
    format!(
        "{:04x} {:x}.{:x}.{:x}.{:02x} : {}",
        address,
        instr.op.bits(),
        instr.mode.bits(),
        instr.bus.bits(),
        instr.d,
        disassemble(instr.ir(), instr.d)
    )
}

/// Disassemble `count` words starting at `start`.
pub fn disassemble_range(words: &[u16], start: u16, count: usize) -> String {
    let mut output = String::new();
    for (i, word) in words.iter().skip(usize::from(start)).take(count).enumerate() {
        let _ = writeln!(output, "{}", listing_line(start.wrapping_add(i as u16), *word));
    }
    output
}
