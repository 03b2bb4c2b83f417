//! Chip models.
//!
//! Each 74-series part is modelled at its logical pin level: no gate
//! detail, no timing. Sequential parts take `inputs(...)` and commit on
//! `clock()`; combinational parts compute their outputs as soon as their
//! inputs are set.
//!
//! - [`counter`] - 74x161 4-bit synchronous counter
//! - [`register`] - 74x273 transparent and 74x377 gated octal registers
//! - [`decoder`] - 74x138 and 74x139 one-hot decoders
//! - [`mux`] - 74x153 dual 4:1 and 74x157 quad 2:1 multiplexers
//! - [`adder`] - 74x283 4-bit adder
//! - [`shift`] - 74x595 serial-in shift register
//! - [`diode`] - wired-logic diode matrix
//! - [`memory`] - program ROM and data RAM

pub mod adder;
pub mod counter;
pub mod decoder;
pub mod diode;
pub mod memory;
pub mod mux;
pub mod register;
pub mod shift;

pub use adder::Adder283;
pub use counter::{Counter161, StageInputs};
pub use decoder::{Decoder138, Decoder139};
pub use diode::DiodeMatrix;
pub use memory::{words_from_image, MemoryError, Ram, Rom, RAM_SIZE, ROM_BYTES, ROM_WORDS};
pub use mux::{Mux153, Mux157};
pub use register::{Register273, Register377};
pub use shift::Shift595;
