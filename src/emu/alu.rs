//! Byte-wide ALU.

use crate::isa::Op;

/// Result and carry out of `op` on accumulator `a` and bus value `b`.
///
/// `Bcc` computes `~a + 1`, whose carry is set exactly when `a` is zero.
/// Logic operations never carry.
pub fn execute(op: Op, a: u8, b: u8) -> (u8, bool) {
    match op {
        Op::Ld | Op::St => (b, false),
        Op::And => (a & b, false),
        Op::Or => (a | b, false),
        Op::Xor => (a ^ b, false),
        Op::Add => a.overflowing_add(b),
        Op::Sub => add_with_carry(a, !b, 1),
        Op::Bcc => add_with_carry(!a, 0, 1),
    }
}

fn add_with_carry(a: u8, b: u8, cin: u8) -> (u8, bool) {
    let total = u16::from(a) + u16::from(b) + u16::from(cin);
    (total as u8, total > 0xff)
}
