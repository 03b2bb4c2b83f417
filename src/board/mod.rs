//! The wired board.
//!
//! [`Board`] owns every chip and evaluates one clock cycle per
//! [`Board::step`] in a fixed order:
//!
//! - **A** the IR and D registers latch the word fetched last cycle, and
//!   the ROM is read at the current PC onto their inputs.
//! - **B** decoders and diode matrices derive the control lines, the
//!   address network and the bus are resolved and the ALU evaluates.
//! - **C** the ALU result is written back and the extended output and
//!   serial input chain react to a falling edge on OUT bit 6.
//! - **D** the bus is resolved again and a store writes RAM.
//!
//! The PC counters take their inputs after phase D and clock at the close
//! of the cycle, so the next phase A fetch sees the new PC.
//!
//! At power-on the IR/D inputs already present ROM word 0, so the first
//! instruction executes twice.

pub mod bus;
pub mod control;
pub mod state;

use std::sync::Arc;

use crate::chips::counter::{chain_clock, chain_inputs, chain_value};
use crate::chips::{
    Adder283, Counter161, Decoder138, Decoder139, DiodeMatrix, Mux153, Mux157, Ram, Register273,
    Register377, Rom, Shift595, StageInputs,
};
use crate::isa::{BusSel, Instruction};
use crate::signal::{and, bit_at, from_bits, invert, join_nibbles, nibbles, or, Level};
use crate::trace::{Category, TraceConfig, Tracer};

pub use bus::Fault;
pub use control::Control;
pub use state::{BoardError, BoardState, Phase};

use control::{
    ALU_DIODES, COL_AL, COL_AR0, COL_EH, COL_EL, COL_INC_X, COL_LD_AC, COL_LD_OUT, COL_LD_X,
    COL_LD_Y, COL_ST, MODE_DIODES,
};

/// The simulated board.
#[derive(Debug, Clone)]
pub struct Board {
    name: String,
    trace: Tracer,

    // Program counter, least significant stage first.
    pc: [Counter161; 4],
    rom: Rom,
    ir: Register273,
    d: Register273,

    op_dec: Decoder138,
    alu_matrix: DiodeMatrix<8, 6>,
    mode_dec: Decoder138,
    mode_matrix: DiodeMatrix<8, 7>,
    bus_dec: Decoder139,
    cond_mux: Mux153,

    addr_lo: [Mux157; 2],
    addr_hi: [Mux157; 2],
    ram: Ram,

    alu_stages: [Mux153; 8],
    adders: [Adder283; 2],

    ac: Register377,
    x: [Counter161; 2],
    y: Register377,
    out: Register377,
    xout: Register273,
    input: Shift595,
    serial: Level,

    control: Control,
    bus: u8,
    address: u16,
    alu: u8,
    carry: Level,
    fetch_pc: u16,
    cycle: u64,
    fault: Option<Fault>,
    halted: bool,
}

impl Board {
    /// Build a board around a raw ROM image of exactly 128 KiB.
    pub fn new(name: &str, rom_image: &[u8], trace: TraceConfig) -> Result<Self, BoardError> {
        let config = Arc::new(trace);
        let rom = Rom::new(Tracer::new("rom", &config), rom_image)?;
        Ok(Self::wire(name, rom, config))
    }

    /// Build a board around already decoded ROM words.
    pub fn with_words(
        name: &str,
        words: Arc<[u16]>,
        trace: TraceConfig,
    ) -> Result<Self, BoardError> {
        let config = Arc::new(trace);
        let rom = Rom::from_words(Tracer::new("rom", &config), words)?;
        Ok(Self::wire(name, rom, config))
    }

    fn wire(name: &str, rom: Rom, config: Arc<TraceConfig>) -> Self {
        let t = |component: &str| Tracer::new(component, &config);

        let mut board = Self {
            name: name.to_string(),
            trace: t(name),
            pc: [0, 1, 2, 3].map(|i| Counter161::new(Tracer::new(&format!("pc{}", i), &config))),
            rom,
            ir: Register273::new(t("ir")),
            d: Register273::new(t("d")),
            op_dec: Decoder138::new(t("opdec")),
            alu_matrix: DiodeMatrix::new(t("alurom"), ALU_DIODES),
            mode_dec: Decoder138::new(t("modedec")),
            mode_matrix: DiodeMatrix::new(t("moderom"), MODE_DIODES),
            bus_dec: Decoder139::new(t("busdec")),
            cond_mux: Mux153::new(t("cond")),
            addr_lo: [Mux157::new(t("addrl0")), Mux157::new(t("addrl1"))],
            addr_hi: [Mux157::new(t("addrh0")), Mux157::new(t("addrh1"))],
            ram: Ram::new(t("ram")),
            alu_stages: [0, 1, 2, 3, 4, 5, 6, 7]
                .map(|i| Mux153::new(Tracer::new(&format!("alu{}", i), &config))),
            adders: [Adder283::new(t("addlo")), Adder283::new(t("addhi"))],
            ac: Register377::new(t("ac")),
            x: [Counter161::new(t("x0")), Counter161::new(t("x1"))],
            y: Register377::new(t("y")),
            out: Register377::new(t("out")),
            xout: Register273::new(t("xout")),
            input: Shift595::new(t("in")),
            serial: 0,
            control: Control::default(),
            bus: 0,
            address: 0,
            alu: 0,
            carry: 0,
            fetch_pc: 0,
            cycle: 0,
            fault: None,
            halted: false,
        };

        // Power-on: the ROM drives word 0 onto the IR/D inputs.
        board.present_fetch(0);
        board
    }

    // ========================================================================
    // Cycle
    // ========================================================================

    /// Run one clock cycle.
    ///
    /// A bus arbitration failure poisons the board: the error is returned
    /// once and every later call returns [`BoardError::Halted`].
    pub fn step(&mut self) -> Result<(), BoardError> {
        if self.halted {
            return Err(BoardError::Halted);
        }
        let result = self.run_phases();
        if result.is_err() {
            self.halted = true;
        } else {
            self.cycle += 1;
        }
        result
    }

    /// Run `cycles` steps, stopping at the first error.
    pub fn run(&mut self, cycles: u64) -> Result<(), BoardError> {
        for _ in 0..cycles {
            self.step()?;
        }
        Ok(())
    }

    fn run_phases(&mut self) -> Result<(), BoardError> {
        self.phase_fetch();
        self.phase_evaluate()?;
        self.phase_writeback();
        self.phase_store()?;
        self.advance_pc();
        self.trace.emit(Category::State, format_args!("{}", self.state()));
        Ok(())
    }

    /// Phase A.
    fn phase_fetch(&mut self) {
        self.ir.clock();
        self.d.clock();
        let pc = self.pc();
        self.present_fetch(pc);
    }

    fn present_fetch(&mut self, pc: u16) {
        let [ir, d] = self.rom.fetch(pc).to_le_bytes();
        self.ir.inputs(ir);
        self.d.inputs(d);
        self.fetch_pc = pc;
        self.trace.emit(
            Category::Fetch,
            format_args!("pc={:04x} ir={:02x} d={:02x}", pc, ir, d),
        );
    }

    /// Phase B.
    fn phase_evaluate(&mut self) -> Result<(), BoardError> {
        let ir = self.ir.q();
        let irb = |i: u32| bit_at(u32::from(ir), i);

        self.op_dec.inputs(ir >> 5, 0, 0, 1);
        let bcc_n = self.op_dec.y(7);
        self.alu_matrix.inputs(u32::from(self.op_dec.outputs()));
        let alu_cols = self.alu_matrix.outputs();

        self.mode_dec.inputs((ir >> 2) & 7, 0, 0, bcc_n);
        self.mode_matrix.inputs(u32::from(self.mode_dec.outputs()));
        let mode_cols = self.mode_matrix.outputs();

        self.bus_dec
            .inputs(ir & 3, 0, irb(3) | irb(4) << 1, or(&[irb(2), bcc_n]));
        let bus_y = self.bus_dec.ya();

        let mut c = Control {
            ar: [0, 1, 2, 3].map(|i| invert(alu_cols[COL_AR0 + i])),
            al: invert(alu_cols[COL_AL]),
            store_n: alu_cols[COL_ST],
            ld_ac_n: mode_cols[COL_LD_AC],
            ld_x_n: mode_cols[COL_LD_X],
            ld_y_n: mode_cols[COL_LD_Y],
            ld_out_n: mode_cols[COL_LD_OUT],
            inc_x_n: mode_cols[COL_INC_X],
            el_n: mode_cols[COL_EL],
            eh_n: mode_cols[COL_EH],
            bus_n: [0, 1, 2, 3].map(|i| bit_at(u32::from(bus_y), i)),
            jmp_n: bit_at(u32::from(self.bus_dec.yb()), 0),
            ..Control::default()
        };
        if let Some(fault) = self.fault {
            fault.apply(&mut c.bus_n);
        }
        self.control = c;

        self.address = self.select_address();
        self.bus = self.resolve_bus(Phase::B)?;
        self.evaluate_alu();

        // Branch decision from AC sign and the ALU carry (zero test).
        let n = bit_at(u32::from(self.ac.q()), 7);
        let z = self.carry;
        self.cond_mux
            .inputs(n | z << 1, [irb(2), irb(3), irb(4), 0], bcc_n, [0; 4], 1);
        let taken = self.cond_mux.ya();
        let c = &mut self.control;
        c.taken = taken;
        c.pl_n = and(&[invert(taken), c.jmp_n]);
        c.ph_n = c.jmp_n;

        self.trace.emit(
            Category::Decode,
            format_args!(
                "{} bus={:02x} addr={:04x} alu={:02x} pl={} ph={}",
                Instruction::decode(ir, self.d.q()),
                self.bus,
                self.address,
                self.alu,
                c.pl_n,
                c.ph_n
            ),
        );
        Ok(())
    }

    fn select_address(&mut self) -> u16 {
        let (d_lo, d_hi) = nibbles(self.d.q());
        let (x_lo, x_hi) = nibbles(self.x());
        let (y_lo, y_hi) = nibbles(self.y.q());
        let low_from_x = invert(self.control.el_n);
        let high_from_y = invert(self.control.eh_n);

        self.addr_lo[0].inputs(low_from_x, d_lo, x_lo, 0);
        self.addr_lo[1].inputs(low_from_x, d_hi, x_hi, 0);
        self.addr_hi[0].inputs(high_from_y, 0, y_lo, 0);
        self.addr_hi[1].inputs(high_from_y, 0, y_hi, 0);

        let lo = join_nibbles(self.addr_lo[0].y(), self.addr_lo[1].y());
        let hi = join_nibbles(self.addr_hi[0].y(), self.addr_hi[1].y());
        u16::from_le_bytes([lo, hi])
    }

    fn resolve_bus(&mut self, phase: Phase) -> Result<u8, BoardError> {
        let sources = [
            self.d.q(),
            self.ram.fetch(self.address),
            self.ac.q(),
            self.input.q(),
        ];
        match bus::resolve(self.control.bus_n, sources) {
            Ok((sel, value)) => {
                self.trace.emit(
                    Category::Bus,
                    format_args!("phase {} {:?} -> {:02x}", phase, sel, value),
                );
                Ok(value)
            }
            Err(drivers) => Err(BoardError::BusContention {
                cycle: self.cycle,
                phase,
                drivers,
            }),
        }
    }

    fn evaluate_alu(&mut self) {
        let ac = u32::from(self.ac.q());
        let bus = u32::from(self.bus);
        let al_n = invert(self.control.al);
        let ar = self.control.ar;

        let mut left = [0; 8];
        let mut right = [0; 8];
        for (i, stage) in self.alu_stages.iter_mut().enumerate() {
            let i = i as u32;
            let s = bit_at(ac, i) | bit_at(bus, i) << 1;
            stage.inputs(s, [0, 1, 0, 1], al_n, ar, 0);
            left[i as usize] = stage.ya();
            right[i as usize] = stage.yb();
        }
        let (l_lo, l_hi) = nibbles(from_bits(&left) as u8);
        let (r_lo, r_hi) = nibbles(from_bits(&right) as u8);

        self.adders[0].inputs(l_lo, r_lo, ar[0]);
        let carry = self.adders[0].cout();
        self.adders[1].inputs(l_hi, r_hi, carry);

        self.alu = join_nibbles(self.adders[0].sum(), self.adders[1].sum());
        self.carry = self.adders[1].cout();
    }

    /// Phase C.
    fn phase_writeback(&mut self) {
        let c = self.control;
        let alu = self.alu;
        let store = invert(c.store_n);

        self.ac.inputs(alu, or(&[c.ld_ac_n, store]));
        self.ac.clock();

        let inc_x = invert(c.inc_x_n);
        let (alu_lo, alu_hi) = nibbles(alu);
        let lines = [
            StageInputs { cep: inc_x, pe: c.ld_x_n, p: alu_lo },
            StageInputs { cep: inc_x, pe: c.ld_x_n, p: alu_hi },
        ];
        chain_inputs(&mut self.x, inc_x, &lines);
        chain_clock(&mut self.x);

        self.y.inputs(alu, c.ld_y_n);
        self.y.clock();

        let old_sync = bit_at(u32::from(self.out.q()), 6);
        self.out.inputs(alu, or(&[c.ld_out_n, store]));
        self.out.clock();
        let new_sync = bit_at(u32::from(self.out.q()), 6);

        if old_sync == 1 && new_sync == 0 {
            self.xout.inputs(self.ac.q());
            self.xout.clock();
            self.input.inputs(self.serial);
            self.input.clock();
            self.trace.emit(
                Category::Ext,
                format_args!("xout={:02x} in={:02x}", self.xout.q(), self.input.q()),
            );
        }

        self.trace.emit(
            Category::Reg,
            format_args!(
                "ac={:02x} x={:02x} y={:02x} out={:02x}",
                self.ac.q(),
                self.x(),
                self.y.q(),
                self.out.q()
            ),
        );
    }

    /// Phase D.
    fn phase_store(&mut self) -> Result<(), BoardError> {
        let value = self.resolve_bus(Phase::D)?;
        if self.control.store_n == 0 {
            self.ram.store(self.address, value);
        }
        Ok(())
    }

    /// Load or count the PC with the lines decoded in phase B.
    fn advance_pc(&mut self) {
        let c = self.control;
        let (b_lo, b_hi) = nibbles(self.bus);
        let (y_lo, y_hi) = nibbles(self.y.q());
        let lines = [
            StageInputs { cep: 1, pe: c.pl_n, p: b_lo },
            StageInputs { cep: 1, pe: c.pl_n, p: b_hi },
            StageInputs { cep: c.pl_n, pe: c.ph_n, p: y_lo },
            StageInputs { cep: c.pl_n, pe: c.ph_n, p: y_hi },
        ];
        chain_inputs(&mut self.pc, 1, &lines);
        chain_clock(&mut self.pc);
        if c.pl_n == 0 {
            self.trace
                .emit(Category::Branch, format_args!("pc <- {:04x}", self.pc()));
        }
    }

    // ========================================================================
    // Inputs and fault injection
    // ========================================================================

    /// Level of the external serial line, shifted in on the next falling
    /// edge of OUT bit 6. Only bit 0 is used.
    pub fn set_serial_input(&mut self, bit: Level) {
        self.serial = bit & 1;
    }

    /// Hold one bus enable at a fixed level, or clear the fault.
    pub fn set_fault(&mut self, fault: Option<Fault>) {
        self.fault = fault;
    }

    pub fn ram_poke(&mut self, address: u16, value: u8) {
        self.ram.store(address, value);
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Program counter: the address the next cycle fetches from.
    pub fn pc(&self) -> u16 {
        chain_value(&self.pc) as u16
    }

    /// Address of the word currently on the IR/D inputs.
    pub fn fetch_pc(&self) -> u16 {
        self.fetch_pc
    }

    pub fn ir(&self) -> u8 {
        self.ir.q()
    }

    pub fn d(&self) -> u8 {
        self.d.q()
    }

    pub fn ac(&self) -> u8 {
        self.ac.q()
    }

    pub fn x(&self) -> u8 {
        chain_value(&self.x) as u8
    }

    pub fn y(&self) -> u8 {
        self.y.q()
    }

    pub fn out(&self) -> u8 {
        self.out.q()
    }

    /// Extended output register.
    pub fn xout(&self) -> u8 {
        self.xout.q()
    }

    pub fn leds(&self) -> u8 {
        self.xout.q() & 0x0f
    }

    pub fn audio(&self) -> u8 {
        self.xout.q() >> 4
    }

    /// Red, green and blue, two bits each, from OUT bits 0..5.
    pub fn color(&self) -> (u8, u8, u8) {
        let out = self.out.q();
        (out & 3, (out >> 2) & 3, (out >> 4) & 3)
    }

    pub fn hsync(&self) -> Level {
        bit_at(u32::from(self.out.q()), 6)
    }

    pub fn vsync(&self) -> Level {
        bit_at(u32::from(self.out.q()), 7)
    }

    /// Parallel output of the serial input register, as seen on the bus.
    pub fn input(&self) -> u8 {
        self.input.q()
    }

    pub fn ram_peek(&self, address: u16) -> u8 {
        self.ram.fetch(address)
    }

    /// Bus value resolved in the last phase B.
    pub fn bus(&self) -> u8 {
        self.bus
    }

    /// RAM address computed in the last phase B.
    pub fn address(&self) -> u16 {
        self.address
    }

    pub fn alu(&self) -> u8 {
        self.alu
    }

    pub fn carry(&self) -> Level {
        self.carry
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn rom(&self) -> &Rom {
        &self.rom
    }

    /// Bus source of the instruction in IR.
    pub fn bus_source(&self) -> BusSel {
        BusSel::from_bits(self.ir.q())
    }

    pub fn state(&self) -> BoardState {
        BoardState {
            name: self.name.clone(),
            cycle: self.cycle,
            pc: self.pc(),
            fetch_pc: self.fetch_pc,
            ir: self.ir.q(),
            d: self.d.q(),
            ac: self.ac.q(),
            x: self.x(),
            y: self.y.q(),
            out: self.out.q(),
            xout: self.xout.q(),
            input: self.input.q(),
            bus: self.bus,
            address: self.address,
            alu: self.alu,
            halted: self.halted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{Cond, Mode, Op, RomBuilder};
    use crate::trace::TraceLog;

    fn ld(mode: Mode, bus: BusSel, d: u8) -> Instruction {
        Instruction::new(Op::Ld, mode, bus, d)
    }

    fn board(rom: RomBuilder) -> Board {
        Board::new("board", &rom.image(), TraceConfig::off()).unwrap()
    }

    #[test]
    fn test_bus_source_follows_ir() {
        let mut b = board(RomBuilder::new().extend([
            Instruction::nop(),
            Instruction::new(Op::Ld, Mode::DAc, BusSel::In, 0),
        ]));
        b.step().unwrap();
        assert_eq!(b.bus_source(), BusSel::Ac);
        b.step().unwrap();
        b.step().unwrap();
        assert_eq!(b.bus_source(), BusSel::In);
        assert_eq!(b.bus(), b.input());
    }

    #[test]
    fn test_first_instruction_runs_twice() {
        let mut b = board(RomBuilder::new().extend([
            Instruction::new(Op::Add, Mode::DAc, BusSel::D, 1),
            Instruction::nop(),
        ]));
        b.step().unwrap();
        assert_eq!((b.ac(), b.pc()), (1, 1));
        b.step().unwrap();
        assert_eq!((b.ac(), b.pc()), (2, 2));
        b.step().unwrap();
        assert_eq!((b.ac(), b.pc()), (2, 3));
    }

    #[test]
    fn test_rejects_short_rom() {
        let err = Board::new("board", &[0; 100], TraceConfig::off()).unwrap_err();
        assert!(matches!(err, BoardError::RomSize(_)));
    }

    #[test]
    fn test_control_lines_for_store() {
        let mut b = board(RomBuilder::new().push(Instruction::new(
            Op::St,
            Mode::YxIncOut,
            BusSel::Ac,
            0,
        )));
        b.step().unwrap();
        let c = b.control();
        assert_eq!(c.store_n, 0);
        assert_eq!((c.ld_out_n, c.inc_x_n, c.el_n, c.eh_n), (0, 0, 0, 0));
        assert_eq!(c.bus_n, [1, 1, 0, 1]);
        assert_eq!((c.pl_n, c.ph_n), (1, 1));
    }

    #[test]
    fn test_branch_disables_mode_decoder() {
        let mut b = board(RomBuilder::new().push(Instruction::branch(Cond::Bra, BusSel::D, 0x10)));
        b.step().unwrap();
        let c = b.control();
        assert_eq!((c.ld_ac_n, c.ld_x_n, c.ld_y_n, c.ld_out_n), (1, 1, 1, 1));
        assert_eq!((c.taken, c.pl_n, c.ph_n, c.jmp_n), (1, 0, 1, 1));
        assert_eq!(b.pc(), 0x0010);
    }

    #[test]
    fn test_fault_poisons_board() {
        let mut b = board(RomBuilder::new().push(ld(Mode::DAc, BusSel::D, 1)));
        b.step().unwrap();
        b.set_fault(Some(Fault::StuckLow(BusSel::Ram)));
        let err = b.step().unwrap_err();
        assert_eq!(
            err,
            BoardError::BusContention {
                cycle: 1,
                phase: Phase::B,
                drivers: vec![BusSel::D, BusSel::Ram],
            }
        );
        assert!(b.is_halted());
        b.set_fault(None);
        assert_eq!(b.step(), Err(BoardError::Halted));
        assert_eq!(b.cycle(), 1);
    }

    #[test]
    fn test_floating_bus_is_an_error() {
        let mut b = board(RomBuilder::new().push(ld(Mode::DAc, BusSel::D, 1)));
        b.set_fault(Some(Fault::StuckHigh(BusSel::D)));
        match b.step() {
            Err(BoardError::BusContention { drivers, .. }) => assert!(drivers.is_empty()),
            other => panic!("expected contention, got {:?}", other),
        }
    }

    #[test]
    fn test_trace_filter_by_component() {
        let log = TraceLog::new();
        let config = TraceConfig::parse("ac:*,board:STATE").unwrap().with_log(log.clone());
        let mut b = Board::new(
            "board",
            &RomBuilder::new().push(ld(Mode::DAc, BusSel::D, 7)).image(),
            config,
        )
        .unwrap();
        b.step().unwrap();
        let events = log.events();
        assert!(!events.is_empty());
        assert!(events
            .iter()
            .all(|e| e.component == "ac" || (e.component == "board" && e.category == Category::State)));
        assert!(events.iter().any(|e| e.category == Category::Latch));
    }

    #[test]
    fn test_state_serializes() {
        let mut b = board(RomBuilder::new().push(ld(Mode::DY, BusSel::D, 0x12)));
        b.step().unwrap();
        let json = serde_json::to_string(&b.state()).unwrap();
        let back: BoardState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, b.state());
        assert_eq!(back.y, 0x12);
    }
}
