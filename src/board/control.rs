//! Control decode: the diode maps behind the opcode and mode decoders, and
//! the decoded control lines of one cycle.

use serde::{Deserialize, Serialize};

use crate::signal::Level;

const X: bool = true;
const O: bool = false;

/// ALU matrix column for select bit AR0. AR1..AR3 follow.
pub const COL_AR0: usize = 0;
/// ALU matrix column gating AC into the left side of the adder.
pub const COL_AL: usize = 4;
/// ALU matrix column flagging a store.
pub const COL_ST: usize = 5;

/// Opcode rows (IR7..5) against [AR0, AR1, AR2, AR3, AL, ST].
///
/// A diode marks a line that is high for that opcode. AR is indexed by
/// `AC_i + 2 * BUS_i`, so AR alone is the truth table of the right-hand
/// adder input per bit.
pub const ALU_DIODES: [[bool; 6]; 8] = [
    // AR0 AR1 AR2 AR3 AL  ST
    [O, O, X, X, O, O], // LD   B
    [O, O, O, X, O, O], // AND  A & B
    [O, X, X, X, O, O], // OR   A | B
    [O, X, X, O, O, O], // XOR  A ^ B
    [O, O, X, X, X, O], // ADD  A + B
    [X, X, O, O, X, O], // SUB  A + ~B + 1
    [O, O, X, X, O, X], // ST   B
    [X, O, X, O, O, O], // Bcc  ~A + 1
];

pub const COL_LD_AC: usize = 0;
pub const COL_LD_X: usize = 1;
pub const COL_LD_Y: usize = 2;
pub const COL_LD_OUT: usize = 3;
pub const COL_INC_X: usize = 4;
pub const COL_EL: usize = 5;
pub const COL_EH: usize = 6;

/// Mode rows (IR4..2) against
/// [LD_AC, LD_X, LD_Y, LD_OUT, INC_X, EL, EH], all active low.
///
/// EL takes the low address byte from X instead of D, EH the high byte
/// from Y instead of zero.
pub const MODE_DIODES: [[bool; 7]; 8] = [
    // AC  X  Y OUT X++ EL EH
    [X, O, O, O, O, O, O], // [D],AC
    [X, O, O, O, O, X, O], // [X],AC
    [X, O, O, O, O, O, X], // [Y,D],AC
    [X, O, O, O, O, X, X], // [Y,X],AC
    [O, X, O, O, O, O, O], // [D],X
    [O, O, X, O, O, O, O], // [D],Y
    [O, O, O, X, O, O, O], // [D],OUT
    [O, O, O, X, X, X, X], // [Y,X++],OUT
];

/// Control lines decoded in phase B. Names ending `_n` are active low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub ar: [Level; 4],
    pub al: Level,
    pub store_n: Level,
    pub ld_ac_n: Level,
    pub ld_x_n: Level,
    pub ld_y_n: Level,
    pub ld_out_n: Level,
    pub inc_x_n: Level,
    pub el_n: Level,
    pub eh_n: Level,
    /// Bus source enables: D, RAM, AC, IN.
    pub bus_n: [Level; 4],
    pub jmp_n: Level,
    pub taken: Level,
    pub pl_n: Level,
    pub ph_n: Level,
}

impl Default for Control {
    /// Every line at its inactive level.
    fn default() -> Self {
        Self {
            ar: [0; 4],
            al: 0,
            store_n: 1,
            ld_ac_n: 1,
            ld_x_n: 1,
            ld_y_n: 1,
            ld_out_n: 1,
            inc_x_n: 1,
            el_n: 1,
            eh_n: 1,
            bus_n: [1; 4],
            jmp_n: 1,
            taken: 0,
            pl_n: 1,
            ph_n: 1,
        }
    }
}
