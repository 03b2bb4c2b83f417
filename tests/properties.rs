//! Property tests over primitives, encoding and the two machine models.

mod common;

use proptest::prelude::*;

use gigatron::signal::{from_bits, join_nibbles, nibbles, to_bits};
use gigatron::{listing_line, BusSel, Instruction, Lockstep, Mode, Op, TraceConfig};

fn imm(mode: Mode, d: u8) -> Instruction {
    Instruction::new(Op::Ld, mode, BusSel::D, d)
}

proptest! {
    #[test]
    fn bits_roundtrip(value in 0u32..256) {
        let bits = to_bits::<8>(value);
        prop_assert!(bits.iter().all(|&b| b <= 1));
        prop_assert_eq!(from_bits(&bits), value);
    }

    #[test]
    fn address_bits_roundtrip(value in 0u32..0x8000) {
        prop_assert_eq!(from_bits(&to_bits::<15>(value)), value);
    }

    #[test]
    fn nibbles_roundtrip(byte in any::<u8>()) {
        let (low, high) = nibbles(byte);
        prop_assert!(low < 16 && high < 16);
        prop_assert_eq!(join_nibbles(low, high), byte);
    }

    #[test]
    fn word_decode_roundtrip(word in any::<u16>()) {
        prop_assert_eq!(Instruction::from_word(word).word(), word);
    }

    #[test]
    fn listing_line_shows_address(address in any::<u16>(), word in any::<u16>()) {
        let line = listing_line(address, word);
        let prefix = format!("{:04x} ", address);
        prop_assert!(line.starts_with(&prefix));
        prop_assert!(line.contains(" : "));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn board_adds_and_subtracts(a in any::<u8>(), b in any::<u8>()) {
        for (op, expected) in [(Op::Add, a.wrapping_add(b)), (Op::Sub, a.wrapping_sub(b))] {
            let body = [imm(Mode::DAc, a), Instruction::new(op, Mode::DAc, BusSel::D, b)];
            let (board, emu) = common::execute(&body, |_, _| {});
            prop_assert_eq!(board.ac(), expected);
            prop_assert_eq!(emu.ac(), expected);
        }
    }

    #[test]
    fn board_logic_ops(a in any::<u8>(), b in any::<u8>()) {
        for (op, expected) in [(Op::And, a & b), (Op::Or, a | b), (Op::Xor, a ^ b)] {
            let body = [imm(Mode::DAc, a), Instruction::new(op, Mode::DAc, BusSel::D, b)];
            let (board, _) = common::execute(&body, |_, _| {});
            prop_assert_eq!(board.ac(), expected);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn models_agree_on_random_roms(seed in any::<u64>(), serial_seed in any::<u64>()) {
        let mut lockstep = Lockstep::with_words(common::random_words(seed), TraceConfig::off()).unwrap();
        for bit in common::serial_stream(serial_seed).take(1_000) {
            lockstep.set_serial_input(bit);
            let step = lockstep.step();
            prop_assert!(step.is_ok(), "seed {:#x}: {:?}", seed, step);
        }
    }
}
