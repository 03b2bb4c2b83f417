//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use proptest::prelude::Rng;
use proptest::test_runner::{RngAlgorithm, TestRng};

use gigatron::{Board, Instruction, Level, Machine, RomBuilder, TraceConfig};

/// Program layout used by most tests: a NOP at address 0, since the first
/// word runs twice after power-on, followed by `body` from address 1.
pub fn program(body: &[Instruction]) -> RomBuilder {
    RomBuilder::new()
        .push(Instruction::nop())
        .extend(body.iter().copied())
}

/// Cycles needed to execute every instruction of `body`.
pub fn cycles_for(body: &[Instruction]) -> u64 {
    body.len() as u64 + 2
}

pub fn board(rom: RomBuilder) -> Board {
    Board::with_words("board", rom.words(), TraceConfig::off()).unwrap()
}

pub fn machine(rom: RomBuilder) -> Machine {
    Machine::with_words(rom.words(), TraceConfig::off()).unwrap()
}

/// Build `body`, execute all of it on both models and return them.
pub fn execute(body: &[Instruction], setup: impl Fn(&mut Board, &mut Machine)) -> (Board, Machine) {
    let words = program(body).words();
    let mut b = Board::with_words("board", words.clone(), TraceConfig::off()).unwrap();
    let mut m = Machine::with_words(words, TraceConfig::off()).unwrap();
    setup(&mut b, &mut m);
    let cycles = cycles_for(body);
    b.run(cycles).unwrap();
    m.run(cycles);
    (b, m)
}

/// A ChaCha generator seeded from `seed`, so the random tests are
/// reproducible.
pub fn seeded_rng(seed: u64) -> TestRng {
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&seed.to_le_bytes());
    TestRng::from_seed(RngAlgorithm::ChaCha, &bytes)
}

/// A full ROM of random words.
pub fn random_words(seed: u64) -> Arc<[u16]> {
    let mut rng = seeded_rng(seed);
    (0..gigatron::ROM_WORDS).map(|_| rng.next_u32() as u16).collect()
}

/// An endless stream of random serial input levels.
pub fn serial_stream(seed: u64) -> impl Iterator<Item = Level> {
    let mut rng = seeded_rng(seed);
    std::iter::repeat_with(move || (rng.next_u32() & 1) as Level)
}
