//! Data selectors.

use crate::signal::{from_bits, select, to_bits, Level};
use crate::trace::{Category, Tracer};

/// 74x153 dual 4-to-1 multiplexer.
///
/// The two halves share the select lines and have their own active-low
/// enables. A disabled half outputs low.
#[derive(Debug, Clone)]
pub struct Mux153 {
    trace: Tracer,
    ya: Level,
    yb: Level,
}

impl Mux153 {
    pub fn new(trace: Tracer) -> Self {
        Self { trace, ya: 0, yb: 0 }
    }

    /// # Panics
    /// Panics if `s` is wider than 2 bits or an enable is not a level.
    pub fn inputs(&mut self, s: u8, a: [Level; 4], ea: Level, b: [Level; 4], eb: Level) {
        assert!(s <= 0x3, "mux select {:#x} wider than 2 bits", s);
        assert!(ea <= 1 && eb <= 1, "mux enable must be a level");
        let s = usize::from(s);
        self.ya = if ea == 0 { select(s, &a) } else { 0 };
        self.yb = if eb == 0 { select(s, &b) } else { 0 };
        self.trace.emit(
            Category::In,
            format_args!("s={} a={:?}/{} b={:?}/{} -> {}{}", s, a, ea, b, eb, self.ya, self.yb),
        );
    }

    #[inline]
    pub fn ya(&self) -> Level {
        self.ya
    }

    #[inline]
    pub fn yb(&self) -> Level {
        self.yb
    }
}

/// 74x157 quad 2-to-1 multiplexer with a shared active-low enable.
#[derive(Debug, Clone)]
pub struct Mux157 {
    trace: Tracer,
    y: u8,
}

impl Mux157 {
    pub fn new(trace: Tracer) -> Self {
        Self { trace, y: 0 }
    }

    /// Select nibble `a` when `s` is low, `b` when high.
    ///
    /// # Panics
    /// Panics if a control line is not a level or a data set is wider
    /// than 4 bits.
    pub fn inputs(&mut self, s: Level, a: u8, b: u8, e: Level) {
        assert!(s <= 1 && e <= 1, "mux control must be a level");
        let sets = [to_bits::<4>(u32::from(a)), to_bits::<4>(u32::from(b))];
        self.y = if e == 0 {
            from_bits(&sets[usize::from(s)]) as u8
        } else {
            0
        };
        self.trace.emit(
            Category::In,
            format_args!("s={} a={:x} b={:x} e={} -> y={:x}", s, a, b, e, self.y),
        );
    }

    #[inline]
    pub fn y(&self) -> u8 {
        self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_153_selects_per_half() {
        let mut m = Mux153::new(Tracer::silent("u"));
        m.inputs(2, [0, 0, 1, 0], 0, [1, 1, 0, 1], 0);
        assert_eq!((m.ya(), m.yb()), (1, 0));
        m.inputs(3, [0, 0, 1, 0], 0, [1, 1, 0, 1], 0);
        assert_eq!((m.ya(), m.yb()), (0, 1));
    }

    #[test]
    fn test_153_disabled_half_is_low() {
        let mut m = Mux153::new(Tracer::silent("u"));
        m.inputs(0, [1, 1, 1, 1], 1, [1, 1, 1, 1], 0);
        assert_eq!((m.ya(), m.yb()), (0, 1));
    }

    #[test]
    fn test_157() {
        let mut m = Mux157::new(Tracer::silent("u"));
        m.inputs(0, 0x3, 0xc, 0);
        assert_eq!(m.y(), 0x3);
        m.inputs(1, 0x3, 0xc, 0);
        assert_eq!(m.y(), 0xc);
        m.inputs(1, 0x3, 0xc, 1);
        assert_eq!(m.y(), 0);
    }
}
