//! 74x161 4-bit synchronous binary counter.
//!
//! Master reset is not modelled. The clock pin is implicit: calling
//! [`Counter161::clock`] is the rising edge.
//!
//! Terminal count is not a look-ahead as in the real part. It is computed
//! from Q when `inputs` is called, so a chain of counters must have its
//! inputs set least-significant stage first, each stage taking the
//! terminal count of the one below, and only then be clocked.

use crate::signal::{bit, Level};
use crate::trace::{Category, Tracer};

#[derive(Debug, Clone)]
pub struct Counter161 {
    trace: Tracer,
    q: u8,
    tc: Level,
    cep: Level,
    cet: Level,
    pe: Level,
    p: u8,
}

impl Counter161 {
    /// A counter holding zero, with count enables high and load disabled.
    pub fn new(trace: Tracer) -> Self {
        Self {
            trace,
            q: 0,
            tc: 0,
            cep: 1,
            cet: 1,
            pe: 1,
            p: 0,
        }
    }

    /// Set the control and data lines.
    ///
    /// `pe` is the active-low parallel enable.
    ///
    /// # Panics
    /// Panics if a control line is not a level or `p` is wider than 4 bits.
    pub fn inputs(&mut self, cep: Level, cet: Level, pe: Level, p: u8) {
        assert!(cep <= 1 && cet <= 1 && pe <= 1, "counter control must be a level");
        assert!(p <= 0x0f, "counter data {:#x} wider than 4 bits", p);
        self.cep = cep;
        self.cet = cet;
        self.pe = pe;
        self.p = p;
        self.tc = bit(cet == 1 && self.q == 0x0f);
        self.trace.emit(
            Category::In,
            format_args!("cep={} cet={} pe={} p={:x} -> tc={}", cep, cet, pe, p, self.tc),
        );
    }

    /// Commit the next state.
    pub fn clock(&mut self) {
        if self.pe == 0 {
            self.trace.emit(Category::Load, format_args!("p={:x}", self.p));
            self.q = self.p;
        } else if self.cep == 1 && self.cet == 1 {
            let old = self.q;
            self.q = (self.q + 1) & 0x0f;
            self.trace.emit(Category::Count, format_args!("q={:x} -> q={:x}", old, self.q));
        } else {
            self.trace.emit(Category::Hold, format_args!("q={:x}", self.q));
        }
    }

    /// Current count.
    #[inline]
    pub fn q(&self) -> u8 {
        self.q
    }

    /// Terminal count as of the last `inputs` call.
    #[inline]
    pub fn tc(&self) -> Level {
        self.tc
    }
}

/// Lines feeding one stage of a counter chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInputs {
    pub cep: Level,
    pub pe: Level,
    pub p: u8,
}

/// Set the inputs of a chain, least-significant stage first.
///
/// `cet` feeds the bottom stage; each higher stage's CET is the terminal
/// count of the stage below it.
///
/// # Panics
/// Panics if `lines` does not have one entry per stage.
pub fn chain_inputs(stages: &mut [Counter161], cet: Level, lines: &[StageInputs]) {
    assert_eq!(stages.len(), lines.len(), "one set of lines per counter stage");
    let mut carry = cet;
    for (stage, l) in stages.iter_mut().zip(lines) {
        stage.inputs(l.cep, carry, l.pe, l.p);
        carry = stage.tc();
    }
}

/// Clock every stage of a chain.
pub fn chain_clock(stages: &mut [Counter161]) {
    for stage in stages.iter_mut() {
        stage.clock();
    }
}

/// Value of a chain, stage 0 in the low nibble.
pub fn chain_value(stages: &[Counter161]) -> u32 {
    stages
        .iter()
        .enumerate()
        .fold(0, |acc, (i, s)| acc | (u32::from(s.q()) << (4 * i)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> Counter161 {
        Counter161::new(Tracer::silent("u"))
    }

    #[test]
    fn test_counts_and_wraps() {
        let mut c = counter();
        for expected in 1..=16u8 {
            c.inputs(1, 1, 1, 0);
            c.clock();
            assert_eq!(c.q(), expected & 0x0f);
        }
    }

    #[test]
    fn test_load_has_priority_over_count() {
        let mut c = counter();
        c.inputs(1, 1, 0, 0x9);
        c.clock();
        assert_eq!(c.q(), 0x9);
    }

    #[test]
    fn test_hold_without_both_enables() {
        let mut c = counter();
        c.inputs(1, 0, 1, 0);
        c.clock();
        c.inputs(0, 1, 1, 0);
        c.clock();
        assert_eq!(c.q(), 0);
    }

    #[test]
    fn test_terminal_count_needs_cet() {
        let mut c = counter();
        c.inputs(1, 1, 0, 0xf);
        c.clock();
        c.inputs(1, 1, 1, 0);
        assert_eq!(c.tc(), 1);
        c.inputs(1, 0, 1, 0);
        assert_eq!(c.tc(), 0);
    }

    #[test]
    fn test_chain_ripples_carry() {
        let mut stages = [counter(), counter()];
        let load = [
            StageInputs { cep: 1, pe: 0, p: 0xf },
            StageInputs { cep: 1, pe: 0, p: 0x2 },
        ];
        chain_inputs(&mut stages, 1, &load);
        chain_clock(&mut stages);
        assert_eq!(chain_value(&stages), 0x2f);

        let count = [StageInputs { cep: 1, pe: 1, p: 0 }; 2];
        chain_inputs(&mut stages, 1, &count);
        chain_clock(&mut stages);
        assert_eq!(chain_value(&stages), 0x30);

        chain_inputs(&mut stages, 1, &count);
        chain_clock(&mut stages);
        assert_eq!(chain_value(&stages), 0x31);
    }

    #[test]
    #[should_panic(expected = "wider than 4 bits")]
    fn test_rejects_wide_data() {
        counter().inputs(1, 1, 0, 0x10);
    }
}
