//! Whole-board behavior, checked against the reference machine.

mod common;

use common::{execute, random_words, serial_stream};
use gigatron::{
    Board, BoardError, BusSel, CompareError, Cond, EmuError, Fault, Instruction, Lockstep, Machine,
    Mode, Op, RomBuilder, TraceConfig,
};

fn ld(mode: Mode, bus: BusSel, d: u8) -> Instruction {
    Instruction::new(Op::Ld, mode, bus, d)
}

fn imm(mode: Mode, d: u8) -> Instruction {
    ld(mode, BusSel::D, d)
}

// ============================================================================
// Power-on
// ============================================================================

#[test]
fn test_first_word_loads_ac_after_warmup() {
    let rom = RomBuilder::new().extend([imm(Mode::DAc, 0x42), Instruction::nop()]);
    let words = rom.words();
    let mut board = Board::with_words("board", words.clone(), TraceConfig::off()).unwrap();
    let mut emu = Machine::with_words(words, TraceConfig::off()).unwrap();

    board.run(2).unwrap();
    emu.run(2);

    for (ac, pc, x, y, out) in [
        (board.ac(), board.pc(), board.x(), board.y(), board.out()),
        (emu.ac(), emu.pc(), emu.x(), emu.y(), emu.out()),
    ] {
        assert_eq!(ac, 0x42);
        assert_eq!(pc, 2);
        assert_eq!((x, y, out), (0, 0, 0));
    }
}

// ============================================================================
// ALU
// ============================================================================

#[test]
fn test_alu_operations() {
    let cases = [
        (Op::Add, 0xff, 0x01, 0x00),
        (Op::Sub, 0x00, 0x01, 0xff),
        (Op::And, 0x11, 0x0f, 0x01),
        (Op::Xor, 0xf0, 0x0c, 0xfc),
        (Op::Or, 0xf0, 0x0c, 0xfc),
        (Op::Ld, 0x33, 0x5a, 0x5a),
    ];
    for (op, a, b, expected) in cases {
        let body = [imm(Mode::DAc, a), Instruction::new(op, Mode::DAc, BusSel::D, b)];
        let (board, emu) = execute(&body, |_, _| {});
        assert_eq!(board.ac(), expected, "board {:?}({:02x},{:02x})", op, a, b);
        assert_eq!(emu.ac(), expected, "emu {:?}({:02x},{:02x})", op, a, b);
    }
}

// ============================================================================
// Branches
// ============================================================================

#[test]
fn test_branch_conditions() {
    // (condition, taken for negative, zero, positive AC)
    let table = [
        (Cond::Jmp, [true, true, true]),
        (Cond::Gt, [false, false, true]),
        (Cond::Lt, [true, false, false]),
        (Cond::Ne, [true, false, true]),
        (Cond::Eq, [false, true, false]),
        (Cond::Ge, [false, true, true]),
        (Cond::Le, [true, true, false]),
        (Cond::Bra, [true, true, true]),
    ];
    for (cond, taken) in table {
        for (ac, taken) in [0x80u8, 0x00, 0x01].into_iter().zip(taken) {
            let body = [
                imm(Mode::DAc, ac),
                Instruction::branch(cond, BusSel::D, 0x20),
                Instruction::nop(),
            ];
            // Stop right after the branch executes.
            let words = common::program(&body).words();
            let mut board = Board::with_words("board", words.clone(), TraceConfig::off()).unwrap();
            let mut emu = Machine::with_words(words, TraceConfig::off()).unwrap();
            board.run(4).unwrap();
            emu.run(4);

            let expected = if taken { 0x0020 } else { 0x0004 };
            assert_eq!(board.pc(), expected, "board {:?} ac={:02x}", cond, ac);
            assert_eq!(emu.pc(), expected, "emu {:?} ac={:02x}", cond, ac);
        }
    }
}

#[test]
fn test_far_jump_runs_delay_slot() {
    let rom = common::program(&[
        imm(Mode::DY, 0x03),
        Instruction::branch(Cond::Jmp, BusSel::D, 0x40),
        imm(Mode::DAc, 0x11),
    ])
    .org(0x0340)
    .push(imm(Mode::DAc, 0x77));
    let mut board = common::board(rom);

    board.run(5).unwrap();
    assert_eq!(board.ac(), 0x11);
    assert_eq!(board.fetch_pc(), 0x0340);
    assert_eq!(board.pc(), 0x0341);

    board.step().unwrap();
    assert_eq!(board.ac(), 0x77);
}

#[test]
fn test_in_page_branch_keeps_page() {
    let rom = common::program(&[
        imm(Mode::DY, 0x02),
        Instruction::branch(Cond::Jmp, BusSel::D, 0x00),
        Instruction::nop(),
    ])
    .org(0x0200)
    .extend([
        Instruction::branch(Cond::Bra, BusSel::D, 0x80),
        Instruction::nop(),
    ]);
    let mut board = common::board(rom);
    // Warm-up, then LD Y, JMP, delay slot, BRA.
    board.run(6).unwrap();
    assert_eq!(board.pc(), 0x0280);
}

// ============================================================================
// Addressing modes
// ============================================================================

const X: u8 = 0x12;
const Y: u8 = 0x03;
const D: u8 = 0x34;

fn setup_xy() -> [Instruction; 2] {
    [imm(Mode::DX, X), imm(Mode::DY, Y)]
}

#[test]
fn test_store_modes() {
    for mode in Mode::ALL {
        let [sx, sy] = setup_xy();
        let body = [
            sx,
            sy,
            imm(Mode::DAc, 0x5a),
            Instruction::new(Op::St, mode, BusSel::D, D),
        ];
        let (board, emu) = execute(&body, |_, _| {});
        let address = mode.address(D, X, Y);

        assert_eq!(board.ram_peek(address), D, "board {:?}", mode);
        assert_eq!(emu.ram_peek(address), D, "emu {:?}", mode);

        // A store never writes AC or OUT.
        let expected_x = match mode {
            Mode::DX => D,
            Mode::YxIncOut => X + 1,
            _ => X,
        };
        let expected_y = if mode == Mode::DY { D } else { Y };
        for (ac, x, y, out) in [
            (board.ac(), board.x(), board.y(), board.out()),
            (emu.ac(), emu.x(), emu.y(), emu.out()),
        ] {
            assert_eq!(ac, 0x5a, "{:?}", mode);
            assert_eq!(out, 0, "{:?}", mode);
            assert_eq!(x, expected_x, "{:?}", mode);
            assert_eq!(y, expected_y, "{:?}", mode);
        }
    }
}

#[test]
fn test_load_modes() {
    for mode in Mode::ALL {
        let [sx, sy] = setup_xy();
        let body = [sx, sy, ld(mode, BusSel::Ram, D)];
        let address = mode.address(D, X, Y);
        let (board, emu) = execute(&body, |b, m| {
            b.ram_poke(address, 0xa5);
            m.ram_poke(address, 0xa5);
        });

        let mut expected = [0u8, X, Y, 0];
        match mode {
            Mode::DAc | Mode::XAc | Mode::YdAc | Mode::YxAc => expected[0] = 0xa5,
            Mode::DX => expected[1] = 0xa5,
            Mode::DY => expected[2] = 0xa5,
            Mode::DOut => expected[3] = 0xa5,
            Mode::YxIncOut => {
                expected[1] = X + 1;
                expected[3] = 0xa5;
            }
        }
        assert_eq!(
            [board.ac(), board.x(), board.y(), board.out()],
            expected,
            "board {:?}",
            mode
        );
        assert_eq!([emu.ac(), emu.x(), emu.y(), emu.out()], expected, "emu {:?}", mode);
    }
}

#[test]
fn test_store_load_every_byte() {
    for value in 0..=255u8 {
        let body = [
            imm(Mode::DAc, value),
            Instruction::new(Op::St, Mode::DAc, BusSel::Ac, 0x40),
            imm(Mode::DAc, 0x00),
            ld(Mode::DAc, BusSel::Ram, 0x40),
        ];
        let (board, emu) = execute(&body, |_, _| {});
        assert_eq!(board.ram_peek(0x40), value);
        assert_eq!(board.ac(), value);
        assert_eq!(emu.ac(), value);
    }
}

// ============================================================================
// Output and serial input
// ============================================================================

#[test]
fn test_sync_falling_edge_latches_xout_and_input() {
    let body = [
        imm(Mode::DAc, 0x0f),
        imm(Mode::DOut, 0x40),
        imm(Mode::DOut, 0x00),
        imm(Mode::DOut, 0x40),
        imm(Mode::DOut, 0x00),
    ];
    let (board, emu) = execute(&body, |b, m| {
        b.set_serial_input(1);
        m.set_serial_input(1);
    });
    assert_eq!(board.xout(), 0x0f);
    assert_eq!(board.leds(), 0x0f);
    assert_eq!(board.audio(), 0);
    // The first edge shifted the 1 in; the second made it visible.
    assert_eq!(board.input(), 0x01);
    assert_eq!(emu.xout(), 0x0f);
    assert_eq!(emu.registers().input, 0x01);
}

#[test]
fn test_rising_edge_does_not_latch() {
    let body = [imm(Mode::DAc, 0x0f), imm(Mode::DOut, 0x40)];
    let (board, _) = execute(&body, |_, _| {});
    assert_eq!(board.xout(), 0);
}

#[test]
fn test_color_and_sync() {
    let (board, _) = execute(&[imm(Mode::DOut, 0xe4)], |_, _| {});
    assert_eq!(board.color(), (0, 1, 2));
    assert_eq!(board.hsync(), 1);
    assert_eq!(board.vsync(), 1);
}

#[test]
fn test_input_on_bus() {
    // Shift a 1 in twice, then read IN into AC.
    let body = [
        imm(Mode::DOut, 0x40),
        imm(Mode::DOut, 0x00),
        imm(Mode::DOut, 0x40),
        imm(Mode::DOut, 0x00),
        ld(Mode::DAc, BusSel::In, 0),
    ];
    let (board, emu) = execute(&body, |b, m| {
        b.set_serial_input(1);
        m.set_serial_input(1);
    });
    assert_eq!(board.ac(), 0x01);
    assert_eq!(emu.ac(), 0x01);
}

// ============================================================================
// Equivalence and determinism
// ============================================================================

#[test]
fn test_lockstep_random_rom() {
    let mut lockstep = Lockstep::with_words(random_words(0x5eed_1234), TraceConfig::off()).unwrap();
    for bit in serial_stream(42).take(20_000) {
        lockstep.set_serial_input(bit);
        if let Err(e) = lockstep.step() {
            panic!("{}", e);
        }
    }
    assert_eq!(lockstep.cycle(), 20_000);
}

#[test]
fn test_lockstep_several_seeds() {
    for seed in [1u64, 7, 0xdead_beef, 0x0123_4567_89ab_cdef] {
        let mut lockstep = Lockstep::with_words(random_words(seed), TraceConfig::off()).unwrap();
        for bit in serial_stream(seed ^ 0xff).take(2_000) {
            lockstep.set_serial_input(bit);
            if let Err(e) = lockstep.step() {
                panic!("seed {:#x}: {}", seed, e);
            }
        }
    }
}

#[test]
fn test_same_inputs_same_trajectory() {
    let words = random_words(99);
    let mut a = Board::with_words("a", words.clone(), TraceConfig::off()).unwrap();
    let mut b = Board::with_words("a", words, TraceConfig::off()).unwrap();
    for bit in serial_stream(5).take(3_000) {
        a.set_serial_input(bit);
        b.set_serial_input(bit);
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(a.state(), b.state());
    }
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_rom_size_rejected() {
    assert!(matches!(
        Board::new("board", &[0; 10], TraceConfig::off()),
        Err(BoardError::RomSize(_))
    ));
    assert!(matches!(
        Machine::new(&[0; 131_070], TraceConfig::off()),
        Err(EmuError::RomSize(_))
    ));
    assert!(matches!(
        Lockstep::new(&[], TraceConfig::off()),
        Err(CompareError::Emu(EmuError::RomSize(_)))
    ));
}

#[test]
fn test_contention_poisons_board() {
    let mut board = common::board(common::program(&[imm(Mode::DAc, 1), Instruction::nop()]));
    board.step().unwrap();
    let before = board.state();

    // The NOP drives the bus from AC; a stuck IN enable fights it.
    board.set_fault(Some(Fault::StuckLow(BusSel::In)));
    match board.step() {
        Err(BoardError::BusContention { cycle, drivers, .. }) => {
            assert_eq!(cycle, 1);
            assert_eq!(drivers, vec![BusSel::Ac, BusSel::In]);
        }
        other => panic!("expected contention, got {:?}", other),
    }
    assert!(board.is_halted());
    assert_eq!(board.cycle(), before.cycle);
    assert_eq!(board.ac(), before.ac);

    board.set_fault(None);
    assert!(matches!(board.step(), Err(BoardError::Halted)));
}

#[test]
fn test_random_inputs_are_reproducible() {
    assert_eq!(random_words(3), random_words(3));
    assert_ne!(random_words(3), random_words(4));
    let a: Vec<_> = serial_stream(9).take(256).collect();
    assert_eq!(a, serial_stream(9).take(256).collect::<Vec<_>>());
    assert!(a.iter().all(|&bit| bit <= 1));
    assert!(a.contains(&0) && a.contains(&1));
}
