//! # Gigatron board simulator
//!
//! A chip-level simulation of the Gigatron TTL microcomputer.
//!
//! The board is built from models of the individual 74xx chips (counters,
//! registers, decoders, multiplexers, adders, a shift register, diode
//! matrices and memories) wired together and evaluated in a four-phase
//! clock cycle. A behavioral reference machine runs the same ROM so the
//! two can be compared cycle by cycle.

pub mod signal;
pub mod trace;
pub mod chips;
pub mod isa;
pub mod board;
pub mod emu;
pub mod compare;
pub mod watch;
pub mod asm;
pub mod demo;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use signal::Level;
pub use trace::{Category, TraceConfig, TraceConfigError, TraceEvent, TraceLog, Tracer};
pub use chips::{words_from_image, MemoryError, RAM_SIZE, ROM_BYTES, ROM_WORDS};
pub use isa::{BusSel, Cond, Instruction, Mode, Op, RomBuilder};
pub use board::{Board, BoardError, BoardState, Control, Fault, Phase};
pub use emu::{EmuError, Machine};
pub use compare::{CompareError, Divergence, Field, Lockstep};
pub use watch::{Watch, WatchError, WatchMode};
pub use asm::{disassemble, disassemble_range, listing_line, load_rom, save_rom, RomFileError};

#[cfg(feature = "tui")]
pub use tui::run_monitor;
