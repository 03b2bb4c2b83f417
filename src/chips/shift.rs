//! 74x595 8-bit serial-in shift register with output latch.
//!
//! The shift and storage clocks are tied together, so the storage latch
//! always shows the shift contents from one clock earlier.

use crate::signal::Level;
use crate::trace::{Category, Tracer};

#[derive(Debug, Clone)]
pub struct Shift595 {
    trace: Tracer,
    shift: u8,
    q: u8,
    ser: Level,
}

impl Shift595 {
    pub fn new(trace: Tracer) -> Self {
        Self {
            trace,
            shift: 0,
            q: 0,
            ser: 0,
        }
    }

    /// # Panics
    /// Panics if `ser` is not a level.
    pub fn inputs(&mut self, ser: Level) {
        assert!(ser <= 1, "serial input must be a level");
        self.ser = ser;
        self.trace.emit(Category::In, format_args!("ser={}", ser));
    }

    pub fn clock(&mut self) {
        self.q = self.shift;
        self.shift = (self.shift << 1) | self.ser;
        self.trace.emit(
            Category::Latch,
            format_args!("shift={:08b} q={:02x}", self.shift, self.q),
        );
    }

    /// Parallel output latch.
    #[inline]
    pub fn q(&self) -> u8 {
        self.q
    }

    /// Internal shift contents, not visible on the pins.
    #[inline]
    pub fn shift(&self) -> u8 {
        self.shift
    }
}
