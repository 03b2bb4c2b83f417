//! Per-cycle field watch.
//!
//! A [`Watch`] holds named getters over a [`Board`] and renders them after
//! each cycle, either every field or only the ones that changed since the
//! previous sample.

use std::fmt::Write;
use thiserror::Error;

use crate::board::Board;

/// Reads one field from a board.
pub type Getter = fn(&Board) -> u64;

/// Whether a sample reports every field or only changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchMode {
    #[default]
    Values,
    Deltas,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchError {
    #[error("unknown watch field: {0}")]
    UnknownField(String),
}

struct Entry {
    name: String,
    width: usize,
    get: Getter,
    last: Option<u64>,
}

/// A set of watched fields.
pub struct Watch {
    mode: WatchMode,
    entries: Vec<Entry>,
}

/// Fields available by name: (name, hex digits, getter).
pub const STANDARD_FIELDS: &[(&str, usize, Getter)] = &[
    ("pc", 4, |b| u64::from(b.pc())),
    ("ir", 2, |b| u64::from(b.ir())),
    ("d", 2, |b| u64::from(b.d())),
    ("ac", 2, |b| u64::from(b.ac())),
    ("x", 2, |b| u64::from(b.x())),
    ("y", 2, |b| u64::from(b.y())),
    ("out", 2, |b| u64::from(b.out())),
    ("xout", 2, |b| u64::from(b.xout())),
    ("in", 2, |b| u64::from(b.input())),
    ("bus", 2, |b| u64::from(b.bus())),
    ("addr", 4, |b| u64::from(b.address())),
    ("alu", 2, |b| u64::from(b.alu())),
    ("cycle", 8, |b| b.cycle()),
];

impl Watch {
    pub fn new(mode: WatchMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
        }
    }

    /// Watch the standard fields named in a comma-separated list.
    pub fn parse(list: &str, mode: WatchMode) -> Result<Self, WatchError> {
        let mut watch = Self::new(mode);
        for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            watch.add_standard(name)?;
        }
        Ok(watch)
    }

    /// Watch one of [`STANDARD_FIELDS`].
    pub fn add_standard(&mut self, name: &str) -> Result<(), WatchError> {
        let (_, width, get) = STANDARD_FIELDS
            .iter()
            .find(|(n, _, _)| *n == name)
            .ok_or_else(|| WatchError::UnknownField(name.to_string()))?;
        self.add(name, *width, *get);
        Ok(())
    }

    /// Register a getter under `name`, printed as `width` hex digits.
    pub fn add(&mut self, name: &str, width: usize, get: Getter) {
        self.entries.push(Entry {
            name: name.to_string(),
            width,
            get,
            last: None,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read every field and render the report line.
    ///
    /// In delta mode only fields that changed are listed; the first sample
    /// lists everything. Returns `None` when there is nothing to report.
    pub fn sample(&mut self, board: &Board) -> Option<String> {
        let mut line = String::new();
        for entry in &mut self.entries {
            let value = (entry.get)(board);
            let changed = entry.last != Some(value);
            entry.last = Some(value);
            if self.mode == WatchMode::Values || changed {
                if !line.is_empty() {
                    line.push(' ');
                }
                let _ = write!(line, "{}={:0w$x}", entry.name, value, w = entry.width);
            }
        }
        if line.is_empty() {
            None
        } else {
            Some(line)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{BusSel, Instruction, Mode, Op, RomBuilder};
    use crate::trace::TraceConfig;

    fn board() -> Board {
        let rom = RomBuilder::new()
            .extend([
                Instruction::nop(),
                Instruction::new(Op::Ld, Mode::DAc, BusSel::D, 0x42),
                Instruction::nop(),
            ])
            .image();
        Board::new("board", &rom, TraceConfig::off()).unwrap()
    }

    #[test]
    fn test_values_mode_reports_everything() {
        let mut b = board();
        let mut w = Watch::parse("pc,ac", WatchMode::Values).unwrap();
        b.step().unwrap();
        assert_eq!(w.sample(&b).unwrap(), "pc=0001 ac=00");
        b.step().unwrap();
        assert_eq!(w.sample(&b).unwrap(), "pc=0002 ac=00");
    }

    #[test]
    fn test_deltas_mode_reports_changes() {
        let mut b = board();
        let mut w = Watch::parse("ac, x", WatchMode::Deltas).unwrap();
        assert_eq!(w.sample(&b).unwrap(), "ac=00 x=00");
        b.run(2).unwrap();
        assert_eq!(w.sample(&b), None);
        b.step().unwrap();
        assert_eq!(w.sample(&b).unwrap(), "ac=42");
    }

    #[test]
    fn test_custom_getter() {
        let mut b = board();
        let mut w = Watch::new(WatchMode::Values);
        w.add("sync", 1, |b| u64::from(b.hsync()));
        b.step().unwrap();
        assert_eq!(w.sample(&b).unwrap(), "sync=0");
    }

    #[test]
    fn test_wide_values_are_not_truncated() {
        let b = board();
        let mut w = Watch::new(WatchMode::Values);
        w.add("big", 10, |_| 1 << 40);
        w.add_standard("cycle").unwrap();
        assert_eq!(w.sample(&b).unwrap(), "big=10000000000 cycle=00000000");
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            Watch::parse("pc,zz", WatchMode::Values).err(),
            Some(WatchError::UnknownField("zz".to_string()))
        );
    }
}
