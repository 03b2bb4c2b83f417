//! Board snapshots and errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::chips::MemoryError;
use crate::isa::BusSel;

/// Phases of one clock cycle, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Fetch.
    A,
    /// Decode and combinational evaluation.
    B,
    /// Register writeback.
    C,
    /// Deferred RAM store.
    D,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::A => "A",
            Phase::B => "B",
            Phase::C => "C",
            Phase::D => "D",
        };
        f.write_str(name)
    }
}

/// Errors raised by the board.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error(transparent)]
    RomSize(#[from] MemoryError),

    #[error("bus contention in cycle {cycle}, phase {phase}: drivers {drivers:?}")]
    BusContention {
        cycle: u64,
        phase: Phase,
        drivers: Vec<BusSel>,
    },

    #[error("board halted after an earlier fault")]
    Halted,
}

/// Serializable snapshot of the visible board state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub name: String,
    pub cycle: u64,
    pub pc: u16,
    pub fetch_pc: u16,
    pub ir: u8,
    pub d: u8,
    pub ac: u8,
    pub x: u8,
    pub y: u8,
    pub out: u8,
    pub xout: u8,
    pub input: u8,
    pub bus: u8,
    pub address: u16,
    pub alu: u8,
    pub halted: bool,
}

impl fmt::Display for BoardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cycle={} pc={:04x} ir={:02x} d={:02x} ac={:02x} x={:02x} y={:02x} out={:02x} xout={:02x}",
            self.cycle, self.pc, self.ir, self.d, self.ac, self.x, self.y, self.out, self.xout
        )
    }
}
