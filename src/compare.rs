//! Lockstep comparison of the board against the reference machine.
//!
//! Both models are built from the same ROM words and fed the same serial
//! input. After every cycle the visible registers must agree; the first
//! mismatch stops the comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::board::{Board, BoardError};
use crate::chips::words_from_image;
use crate::emu::{EmuError, Machine};
use crate::signal::Level;
use crate::trace::TraceConfig;

/// A register compared between the two models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    Pc,
    Ac,
    X,
    Y,
    Out,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Pc => "PC",
            Field::Ac => "AC",
            Field::X => "X",
            Field::Y => "Y",
            Field::Out => "OUT",
        };
        f.write_str(name)
    }
}

/// The first point where the models disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("cycle {cycle}: {field} differs, board={board:#x} emu={emu:#x} (emu pc={pc:04x})")]
pub struct Divergence {
    pub cycle: u64,
    pub field: Field,
    pub board: u16,
    pub emu: u16,
    pub pc: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompareError {
    #[error(transparent)]
    Divergence(#[from] Divergence),

    #[error(transparent)]
    Board(#[from] BoardError),

    #[error(transparent)]
    Emu(#[from] EmuError),

    #[error("comparison already stopped at cycle {0}")]
    Stopped(u64),
}

/// Steps a board and a reference machine together.
#[derive(Debug, Clone)]
pub struct Lockstep {
    board: Board,
    emu: Machine,
    cycle: u64,
    stopped: bool,
}

impl Lockstep {
    /// Build both models from a raw ROM image.
    pub fn new(rom_image: &[u8], trace: TraceConfig) -> Result<Self, CompareError> {
        let words = words_from_image(rom_image).map_err(EmuError::from)?;
        Self::with_words(words, trace)
    }

    pub fn with_words(words: Arc<[u16]>, trace: TraceConfig) -> Result<Self, CompareError> {
        let board = Board::with_words("board", Arc::clone(&words), trace.clone())?;
        let emu = Machine::with_words(words, trace)?;
        Ok(Self {
            board,
            emu,
            cycle: 0,
            stopped: false,
        })
    }

    /// Drive the serial input line of both models.
    pub fn set_serial_input(&mut self, bit: Level) {
        self.board.set_serial_input(bit);
        self.emu.set_serial_input(bit);
    }

    /// Step both models once and compare.
    pub fn step(&mut self) -> Result<(), CompareError> {
        if self.stopped {
            return Err(CompareError::Stopped(self.cycle));
        }
        if let Err(e) = self.board.step() {
            self.stopped = true;
            return Err(e.into());
        }
        self.emu.step();
        self.cycle += 1;
        if let Some(divergence) = self.check() {
            self.stopped = true;
            return Err(divergence.into());
        }
        Ok(())
    }

    /// Step `cycles` times, stopping at the first failure.
    pub fn run(&mut self, cycles: u64) -> Result<(), CompareError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    /// Compare the models as they stand.
    pub fn check(&self) -> Option<Divergence> {
        let b = &self.board;
        let e = &self.emu;
        let fields = [
            (Field::Pc, b.pc(), e.pc()),
            (Field::Ac, b.ac().into(), e.ac().into()),
            (Field::X, b.x().into(), e.x().into()),
            (Field::Y, b.y().into(), e.y().into()),
            (Field::Out, b.out().into(), e.out().into()),
        ];
        fields
            .into_iter()
            .find(|(_, board, emu)| board != emu)
            .map(|(field, board, emu)| Divergence {
                cycle: self.cycle,
                field,
                board,
                emu,
                pc: e.pc(),
            })
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn emu(&self) -> &Machine {
        &self.emu
    }
}
