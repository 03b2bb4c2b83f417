//! Program tooling.
//!
//! This module provides:
//! - A disassembler (instruction words to readable text)
//! - ROM image file loading and saving

pub mod disasm;
pub mod rom;

pub use disasm::{disassemble, disassemble_range, listing_line};
pub use rom::{load_rom, save_rom, RomFileError};
