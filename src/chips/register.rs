//! Octal D registers.

use crate::signal::Level;
use crate::trace::{Category, Tracer};

/// 74x273: latches its data on every clock.
#[derive(Debug, Clone)]
pub struct Register273 {
    trace: Tracer,
    q: u8,
    d: u8,
}

impl Register273 {
    pub fn new(trace: Tracer) -> Self {
        Self { trace, q: 0, d: 0 }
    }

    pub fn inputs(&mut self, d: u8) {
        self.d = d;
        self.trace.emit(Category::In, format_args!("d={:02x}", d));
    }

    pub fn clock(&mut self) {
        self.q = self.d;
        self.trace.emit(Category::Latch, format_args!("q={:02x}", self.q));
    }

    #[inline]
    pub fn q(&self) -> u8 {
        self.q
    }
}

/// 74x377: latches on clock only while the active-low enable is asserted.
#[derive(Debug, Clone)]
pub struct Register377 {
    trace: Tracer,
    q: u8,
    d: u8,
    e: Level,
}

impl Register377 {
    pub fn new(trace: Tracer) -> Self {
        Self { trace, q: 0, d: 0, e: 1 }
    }

    /// # Panics
    /// Panics if `e` is not a level.
    pub fn inputs(&mut self, d: u8, e: Level) {
        assert!(e <= 1, "register enable must be a level");
        self.d = d;
        self.e = e;
        self.trace.emit(Category::In, format_args!("d={:02x} e={}", d, e));
    }

    pub fn clock(&mut self) {
        if self.e == 0 {
            self.q = self.d;
            self.trace.emit(Category::Latch, format_args!("q={:02x}", self.q));
        } else {
            self.trace.emit(Category::Hold, format_args!("q={:02x}", self.q));
        }
    }

    #[inline]
    pub fn q(&self) -> u8 {
        self.q
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_273_latches_unconditionally() {
        let mut r = Register273::new(Tracer::silent("ir"));
        r.inputs(0x5a);
        assert_eq!(r.q(), 0);
        r.clock();
        assert_eq!(r.q(), 0x5a);
    }

    #[test]
    fn test_377_respects_enable() {
        let mut r = Register377::new(Tracer::silent("ac"));
        r.inputs(0x11, 1);
        r.clock();
        assert_eq!(r.q(), 0);
        r.inputs(0x22, 0);
        r.clock();
        assert_eq!(r.q(), 0x22);
        r.inputs(0x33, 1);
        r.clock();
        assert_eq!(r.q(), 0x22);
    }
}
