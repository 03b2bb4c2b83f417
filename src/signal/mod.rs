//! Signal primitives.
//!
//! Every wire and bus on the board is carried as an unsigned integer,
//! least-significant bit first. A single wire holds a level, `0` or `1`,
//! which is the electrical low/high of the line and not its logical truth:
//! an active-low enable is asserted when it reads `0`.
//!
//! - [`bits`] - level algebra, one-hot decoding, selection and the
//!   canonical pack/unpack pair for fixed-width buses

pub mod bits;

pub use bits::{
    and, bit, bit_at, decode, from_bits, invert, join_nibbles, mask, nibbles, or, select, to_bits,
    Level,
};
