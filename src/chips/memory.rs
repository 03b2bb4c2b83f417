//! Program ROM and data RAM.
//!
//! The ROM is 64K words of 16 bits. Each word is stored in the image as
//! two bytes: the instruction byte first, then the operand byte. The RAM
//! is 32K bytes and only the low 15 address bits reach it.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::trace::{Category, Tracer};

/// Number of 16-bit words in the ROM.
pub const ROM_WORDS: usize = 64 * 1024;

/// Exact size in bytes of a ROM image.
pub const ROM_BYTES: usize = 2 * ROM_WORDS;

/// Number of bytes of RAM.
pub const RAM_SIZE: usize = 32 * 1024;

const RAM_MASK: u16 = (RAM_SIZE - 1) as u16;

/// Errors raised while building a memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("ROM image must be exactly {expected} bytes, got {actual}")]
    RomSize { expected: usize, actual: usize },
}

/// Read-only program memory.
///
/// The word array is shared, so cloning a ROM (or handing the same image
/// to the reference model) does not copy it.
#[derive(Clone)]
pub struct Rom {
    trace: Tracer,
    words: Arc<[u16]>,
}

impl Rom {
    /// Build a ROM from a raw image of exactly [`ROM_BYTES`] bytes.
    pub fn new(trace: Tracer, image: &[u8]) -> Result<Self, MemoryError> {
        let words = words_from_image(image)?;
        Ok(Self { trace, words })
    }

    /// Build a ROM around an already decoded word array.
    pub fn from_words(trace: Tracer, words: Arc<[u16]>) -> Result<Self, MemoryError> {
        if words.len() != ROM_WORDS {
            return Err(MemoryError::RomSize {
                expected: ROM_BYTES,
                actual: 2 * words.len(),
            });
        }
        Ok(Self { trace, words })
    }

    /// Word at `address`: instruction byte low, operand byte high.
    #[inline]
    pub fn fetch(&self, address: u16) -> u16 {
        let word = self.words[usize::from(address)];
        self.trace.emit(
            Category::Fetch,
            format_args!("addr={:04x} -> {:04x}", address, word),
        );
        word
    }

    /// The shared word array.
    pub fn words(&self) -> &Arc<[u16]> {
        &self.words
    }
}

impl fmt::Debug for Rom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.words.iter().filter(|&&w| w != 0).count();
        f.debug_struct("Rom")
            .field("nonzero_words", &used)
            .field("total_words", &ROM_WORDS)
            .finish()
    }
}

/// Decode a raw image into little-endian words.
pub fn words_from_image(image: &[u8]) -> Result<Arc<[u16]>, MemoryError> {
    if image.len() != ROM_BYTES {
        return Err(MemoryError::RomSize {
            expected: ROM_BYTES,
            actual: image.len(),
        });
    }
    Ok(image
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

/// Read/write data memory.
#[derive(Clone)]
pub struct Ram {
    trace: Tracer,
    cells: Vec<u8>,
}

impl Ram {
    /// A zero-filled RAM.
    pub fn new(trace: Tracer) -> Self {
        Self {
            trace,
            cells: vec![0; RAM_SIZE],
        }
    }

    #[inline]
    pub fn fetch(&self, address: u16) -> u8 {
        self.cells[usize::from(address & RAM_MASK)]
    }

    pub fn store(&mut self, address: u16, data: u8) {
        let address = address & RAM_MASK;
        self.trace.emit(
            Category::Store,
            format_args!("[{:04x}] <- {:02x}", address, data),
        );
        self.cells[usize::from(address)] = data;
    }
}

impl fmt::Debug for Ram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let used = self.cells.iter().filter(|&&c| c != 0).count();
        f.debug_struct("Ram")
            .field("nonzero_cells", &used)
            .field("total_cells", &RAM_SIZE)
            .finish()
    }
}
