//! Instruction encoding.
//!
//! Every ROM word holds one instruction. The low byte is the instruction
//! byte, laid out as:
//!
//! ```text
//!   7 6 5 | 4 3 2 | 1 0
//!    op   | mode  | bus
//! ```
//!
//! and the high byte is the immediate operand `D`. For branches the mode
//! field is the branch condition.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::chips::{ROM_BYTES, ROM_WORDS};

/// ALU operation, IR7..5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    Ld,
    And,
    Or,
    Xor,
    Add,
    Sub,
    St,
    Bcc,
}

impl Op {
    pub const ALL: [Op; 8] = [
        Op::Ld,
        Op::And,
        Op::Or,
        Op::Xor,
        Op::Add,
        Op::Sub,
        Op::St,
        Op::Bcc,
    ];

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[usize::from(bits & 7)]
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// Addressing mode and writeback target, IR4..2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// `[D],AC`
    DAc,
    /// `[X],AC`
    XAc,
    /// `[Y,D],AC`
    YdAc,
    /// `[Y,X],AC`
    YxAc,
    /// `[D],X`
    DX,
    /// `[D],Y`
    DY,
    /// `[D],OUT`
    DOut,
    /// `[Y,X++],OUT`
    YxIncOut,
}

impl Mode {
    pub const ALL: [Mode; 8] = [
        Mode::DAc,
        Mode::XAc,
        Mode::YdAc,
        Mode::YxAc,
        Mode::DX,
        Mode::DY,
        Mode::DOut,
        Mode::YxIncOut,
    ];

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[usize::from(bits & 7)]
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// RAM address selected by this mode, given the registers that feed
    /// the address network.
    pub fn address(self, d: u8, x: u8, y: u8) -> u16 {
        let (hi, lo) = match self {
            Mode::DAc | Mode::DX | Mode::DY | Mode::DOut => (0, d),
            Mode::XAc => (0, x),
            Mode::YdAc => (y, d),
            Mode::YxAc | Mode::YxIncOut => (y, x),
        };
        u16::from(hi) << 8 | u16::from(lo)
    }

    /// Register written by this mode.
    pub fn target(self) -> Target {
        match self {
            Mode::DAc | Mode::XAc | Mode::YdAc | Mode::YxAc => Target::Ac,
            Mode::DX => Target::X,
            Mode::DY => Target::Y,
            Mode::DOut | Mode::YxIncOut => Target::Out,
        }
    }
}

/// Writeback destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    Ac,
    X,
    Y,
    Out,
}

/// Branch condition, the mode field of a `Bcc`.
///
/// Bit 0 takes the branch when AC > 0, bit 1 when AC < 0 and bit 2 when
/// AC == 0. `Jmp` has none set and is the far jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cond {
    Jmp,
    Gt,
    Lt,
    Ne,
    Eq,
    Ge,
    Le,
    Bra,
}

impl Cond {
    pub const ALL: [Cond; 8] = [
        Cond::Jmp,
        Cond::Gt,
        Cond::Lt,
        Cond::Ne,
        Cond::Eq,
        Cond::Ge,
        Cond::Le,
        Cond::Bra,
    ];

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[usize::from(bits & 7)]
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Whether an in-page branch with this condition is taken for `ac`.
    /// Always false for `Jmp`, which jumps unconditionally by other means.
    pub fn taken(self, ac: u8) -> bool {
        let bits = self.bits();
        if ac == 0 {
            bits & 0b100 != 0
        } else if ac & 0x80 != 0 {
            bits & 0b010 != 0
        } else {
            bits & 0b001 != 0
        }
    }
}

/// Bus source, IR1..0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusSel {
    D,
    Ram,
    Ac,
    In,
}

impl BusSel {
    pub const ALL: [BusSel; 4] = [BusSel::D, BusSel::Ram, BusSel::Ac, BusSel::In];

    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[usize::from(bits & 3)]
    }

    #[inline]
    pub fn bits(self) -> u8 {
        self as u8
    }
}

/// A decoded instruction with its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Op,
    /// Raw mode field. For `Bcc` read it with [`Instruction::cond`].
    pub mode: Mode,
    pub bus: BusSel,
    pub d: u8,
}

impl Instruction {
    pub fn new(op: Op, mode: Mode, bus: BusSel, d: u8) -> Self {
        Self { op, mode, bus, d }
    }

    /// A branch with condition `cond`.
    pub fn branch(cond: Cond, bus: BusSel, d: u8) -> Self {
        Self::new(Op::Bcc, Mode::from_bits(cond.bits()), bus, d)
    }

    /// `LD AC,AC`, which reloads AC with itself.
    pub fn nop() -> Self {
        Self::new(Op::Ld, Mode::DAc, BusSel::Ac, 0)
    }

    /// The mode field read as a branch condition.
    #[inline]
    pub fn cond(&self) -> Cond {
        Cond::from_bits(self.mode.bits())
    }

    /// Decode an instruction byte and operand.
    pub fn decode(ir: u8, d: u8) -> Self {
        Self {
            op: Op::from_bits(ir >> 5),
            mode: Mode::from_bits(ir >> 2),
            bus: BusSel::from_bits(ir),
            d,
        }
    }

    /// Decode a ROM word.
    #[inline]
    pub fn from_word(word: u16) -> Self {
        let [ir, d] = word.to_le_bytes();
        Self::decode(ir, d)
    }

    /// The instruction byte.
    #[inline]
    pub fn ir(&self) -> u8 {
        self.op.bits() << 5 | self.mode.bits() << 2 | self.bus.bits()
    }

    /// The ROM word: instruction byte low, operand high.
    #[inline]
    pub fn word(&self) -> u16 {
        u16::from_le_bytes([self.ir(), self.d])
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::asm::disasm::disassemble(self.ir(), self.d))
    }
}

// ============================================================================
// ROM images
// ============================================================================

/// Builds a full-size ROM image from instructions.
///
/// Unwritten words are zero, which decodes as `LD $00,AC`.
#[derive(Debug, Clone)]
pub struct RomBuilder {
    words: Vec<u16>,
    cursor: usize,
}

impl RomBuilder {
    pub fn new() -> Self {
        Self {
            words: vec![0; ROM_WORDS],
            cursor: 0,
        }
    }

    /// Move the write cursor to `address`.
    pub fn org(mut self, address: u16) -> Self {
        self.cursor = usize::from(address);
        self
    }

    /// Write one instruction at the cursor and advance it.
    ///
    /// # Panics
    /// Panics when writing past the last ROM word.
    pub fn push(mut self, instr: Instruction) -> Self {
        assert!(self.cursor < ROM_WORDS, "ROM overflow at {:#x}", self.cursor);
        self.words[self.cursor] = instr.word();
        self.cursor += 1;
        self
    }

    /// Write a run of instructions.
    pub fn extend<I: IntoIterator<Item = Instruction>>(self, instrs: I) -> Self {
        instrs.into_iter().fold(self, RomBuilder::push)
    }

    pub fn words(self) -> Arc<[u16]> {
        self.words.into()
    }

    /// The raw image, two bytes per word.
    pub fn image(self) -> Vec<u8> {
        let mut image = Vec::with_capacity(ROM_BYTES);
        for word in &self.words {
            image.extend_from_slice(&word.to_le_bytes());
        }
        image
    }
}

impl Default for RomBuilder {
    fn default() -> Self {
        Self::new()
    }
}
