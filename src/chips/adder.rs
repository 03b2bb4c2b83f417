//! 74x283 4-bit binary full adder with fast carry.

use crate::signal::{bit, Level};
use crate::trace::{Category, Tracer};

#[derive(Debug, Clone)]
pub struct Adder283 {
    trace: Tracer,
    sum: u8,
    cout: Level,
}

impl Adder283 {
    pub fn new(trace: Tracer) -> Self {
        Self {
            trace,
            sum: 0,
            cout: 0,
        }
    }

    /// # Panics
    /// Panics if an operand is wider than 4 bits or `cin` is not a level.
    pub fn inputs(&mut self, a: u8, b: u8, cin: Level) {
        assert!(a <= 0x0f && b <= 0x0f, "adder operand wider than 4 bits");
        assert!(cin <= 1, "carry in must be a level");
        let total = a + b + cin;
        self.sum = total & 0x0f;
        self.cout = bit(total > 0x0f);
        self.trace.emit(
            Category::Alu,
            format_args!("{:x}+{:x}+{} -> {:x} c={}", a, b, cin, self.sum, self.cout),
        );
    }

    #[inline]
    pub fn sum(&self) -> u8 {
        self.sum
    }

    #[inline]
    pub fn cout(&self) -> Level {
        self.cout
    }
}
