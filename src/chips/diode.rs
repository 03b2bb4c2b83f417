//! Wired-logic diode matrix.
//!
//! Each column is a pulled-up line. A diode at (row, column) pulls the
//! column low whenever its row is driven low, so a column reads 0 iff some
//! low row is coupled to it. Fed from a decoder's active-low outputs this
//! gives a fixed lookup table: one row selected, every column with a diode
//! on that row reads low.

use crate::signal::{bit, Level};
use crate::trace::{Category, Tracer};

#[derive(Debug, Clone)]
pub struct DiodeMatrix<const R: usize, const C: usize> {
    trace: Tracer,
    couplings: [[bool; C]; R],
    columns: [Level; C],
}

impl<const R: usize, const C: usize> DiodeMatrix<R, C> {
    /// Build a matrix from its diode placement. With no rows driven low
    /// every column reads high.
    pub fn new(trace: Tracer, couplings: [[bool; C]; R]) -> Self {
        Self {
            trace,
            couplings,
            columns: [1; C],
        }
    }

    /// Drive the rows. Bit `r` of `rows` is the level of row `r`.
    ///
    /// # Panics
    /// Panics if `rows` has bits set above row `R - 1`.
    pub fn inputs(&mut self, rows: u32) {
        assert!(
            R >= 32 || rows >> R == 0,
            "row levels {:#x} wider than {} rows",
            rows,
            R
        );
        for (c, col) in self.columns.iter_mut().enumerate() {
            let pulled = self
                .couplings
                .iter()
                .enumerate()
                .any(|(r, diodes)| diodes[c] && (rows >> r) & 1 == 0);
            *col = bit(!pulled);
        }
        self.trace.emit(
            Category::Decode,
            format_args!("rows={:0w$b} -> cols={:?}", rows, self.columns, w = R),
        );
    }

    /// All column levels, column 0 first.
    #[inline]
    pub fn outputs(&self) -> [Level; C] {
        self.columns
    }

    /// Level of one column.
    #[inline]
    pub fn column(&self, c: usize) -> Level {
        self.columns[c]
    }
}
