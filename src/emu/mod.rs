//! Instruction-level reference model.
//!
//! [`Machine`] executes one instruction per step directly from the decoded
//! fields, with no chip models. It keeps the same one-word pipeline and
//! power-on state as the board, so both can be stepped side by side.

pub mod alu;
pub mod machine;

pub use machine::{EmuError, Machine};
