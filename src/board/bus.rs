//! Data bus arbitration.
//!
//! Four tri-state drivers share the bus, each with an active-low output
//! enable. Exactly one may drive it in any cycle.

use serde::{Deserialize, Serialize};

use crate::isa::BusSel;
use crate::signal::Level;

/// A single bus enable held at a fixed level, overriding the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fault {
    /// The driver's enable is stuck asserted.
    StuckLow(BusSel),
    /// The driver's enable is stuck released.
    StuckHigh(BusSel),
}

impl Fault {
    pub(crate) fn apply(self, enables: &mut [Level; 4]) {
        match self {
            Fault::StuckLow(sel) => enables[usize::from(sel.bits())] = 0,
            Fault::StuckHigh(sel) => enables[usize::from(sel.bits())] = 1,
        }
    }
}

/// Pick the bus value from the one enabled source.
///
/// `enables` and `sources` are ordered D, RAM, AC, IN. On failure the
/// active drivers are returned, which is empty when nothing drives the
/// bus.
pub fn resolve(enables: [Level; 4], sources: [u8; 4]) -> Result<(BusSel, u8), Vec<BusSel>> {
    let active: Vec<BusSel> = BusSel::ALL
        .iter()
        .copied()
        .filter(|sel| enables[usize::from(sel.bits())] == 0)
        .collect();
    match active.as_slice() {
        [sel] => Ok((*sel, sources[usize::from(sel.bits())])),
        _ => Err(active),
    }
}
