//! One-hot decoders with active-low outputs.
//!
//! Outputs are packed into an integer, bit `i` being output `Yi`. An
//! inactive decoder reads all ones.

use crate::signal::{decode, mask, Level};
use crate::trace::{Category, Tracer};

/// 74x138 3-to-8 decoder.
#[derive(Debug, Clone)]
pub struct Decoder138 {
    trace: Tracer,
    y: u8,
}

impl Decoder138 {
    pub fn new(trace: Tracer) -> Self {
        Self { trace, y: 0xff }
    }

    /// Set the address and enables.
    ///
    /// Enabled only when `e1` and `e2` (active low) are low and `e3`
    /// (active high) is high.
    ///
    /// # Panics
    /// Panics if `a` is wider than 3 bits or an enable is not a level.
    pub fn inputs(&mut self, a: u8, e1: Level, e2: Level, e3: Level) {
        assert!(a <= 0x7, "decoder address {:#x} wider than 3 bits", a);
        assert!(e1 <= 1 && e2 <= 1 && e3 <= 1, "decoder enable must be a level");
        self.y = if e1 == 0 && e2 == 0 && e3 == 1 {
            !(decode(u32::from(a), 3) as u8)
        } else {
            0xff
        };
        self.trace.emit(
            Category::Decode,
            format_args!("a={} e={}{}{} -> y={:08b}", a, e1, e2, e3, self.y),
        );
    }

    /// All eight outputs.
    #[inline]
    pub fn outputs(&self) -> u8 {
        self.y
    }

    /// Level of output `Yi`.
    #[inline]
    pub fn y(&self, i: u32) -> Level {
        assert!(i < 8, "decoder has no output {}", i);
        (self.y >> i) & 1
    }
}

/// 74x139 dual 2-to-4 decoder.
#[derive(Debug, Clone)]
pub struct Decoder139 {
    trace: Tracer,
    ya: u8,
    yb: u8,
}

impl Decoder139 {
    pub fn new(trace: Tracer) -> Self {
        Self {
            trace,
            ya: 0x0f,
            yb: 0x0f,
        }
    }

    fn half(a: u8, e: Level) -> u8 {
        assert!(a <= 0x3, "decoder address {:#x} wider than 2 bits", a);
        assert!(e <= 1, "decoder enable must be a level");
        if e == 0 {
            !(decode(u32::from(a), 2) as u8) & mask(4) as u8
        } else {
            0x0f
        }
    }

    /// Set both halves. Each enable is active low.
    pub fn inputs(&mut self, a1: u8, e1: Level, a2: u8, e2: Level) {
        self.ya = Self::half(a1, e1);
        self.yb = Self::half(a2, e2);
        self.trace.emit(
            Category::Decode,
            format_args!("1a={} 1e={} 2a={} 2e={} -> 1y={:04b} 2y={:04b}", a1, e1, a2, e2, self.ya, self.yb),
        );
    }

    /// Outputs of the first half.
    #[inline]
    pub fn ya(&self) -> u8 {
        self.ya
    }

    /// Outputs of the second half.
    #[inline]
    pub fn yb(&self) -> u8 {
        self.yb
    }
}
