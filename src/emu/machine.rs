//! Reference machine state and step.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::alu;
use crate::board::BoardState;
use crate::chips::{words_from_image, MemoryError, RAM_SIZE, ROM_BYTES, ROM_WORDS};
use crate::isa::{BusSel, Cond, Instruction, Mode, Op, Target};
use crate::signal::Level;
use crate::trace::{Category, TraceConfig, Tracer};

const RAM_MASK: u16 = (RAM_SIZE - 1) as u16;

/// The reference machine.
#[derive(Debug, Clone)]
pub struct Machine {
    trace: Tracer,
    rom: Arc<[u16]>,
    ram: Vec<u8>,
    regs: Registers,
    serial: Level,
    cycle: u64,
}

/// Architectural registers of the reference machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    pub pc: u16,
    /// Address of the word held for the next IR/D latch.
    pub fetch_pc: u16,
    pub ir: u8,
    pub d: u8,
    pub ac: u8,
    pub x: u8,
    pub y: u8,
    pub out: u8,
    pub xout: u8,
    /// Parallel output of the serial input register.
    pub input: u8,
    /// Bits shifted in but not yet visible.
    pub shift: u8,
}

impl Machine {
    /// Build from a raw ROM image of exactly 128 KiB.
    pub fn new(rom_image: &[u8], trace: TraceConfig) -> Result<Self, EmuError> {
        Self::with_words(words_from_image(rom_image)?, trace)
    }

    /// Build around decoded ROM words.
    pub fn with_words(rom: Arc<[u16]>, trace: TraceConfig) -> Result<Self, EmuError> {
        if rom.len() != ROM_WORDS {
            return Err(EmuError::RomSize(MemoryError::RomSize {
                expected: ROM_BYTES,
                actual: 2 * rom.len(),
            }));
        }
        let [ir, d] = rom[0].to_le_bytes();
        Ok(Self {
            trace: Tracer::new("emu", &Arc::new(trace)),
            rom,
            ram: vec![0; RAM_SIZE],
            regs: Registers {
                ir,
                d,
                ..Registers::default()
            },
            serial: 0,
            cycle: 0,
        })
    }

    /// Execute the instruction in IR/D and latch the next one.
    pub fn step(&mut self) {
        let fetch_pc = self.regs.pc;
        let word = self.rom[usize::from(fetch_pc)];
        self.trace.emit(
            Category::Fetch,
            format_args!("{:04x} {:04x}", fetch_pc, word),
        );

        let instr = Instruction::decode(self.regs.ir, self.regs.d);
        self.trace.emit(Category::Decode, format_args!("{}", instr));
        let r = &mut self.regs;

        let address = match instr.op {
            Op::Bcc => u16::from(instr.d),
            _ => instr.mode.address(instr.d, r.x, r.y),
        } & RAM_MASK;
        let bus = match instr.bus {
            BusSel::D => instr.d,
            BusSel::Ram => self.ram[usize::from(address)],
            BusSel::Ac => r.ac,
            BusSel::In => r.input,
        };
        let (result, _) = alu::execute(instr.op, r.ac, bus);

        let mut next_pc = fetch_pc.wrapping_add(1);
        if instr.op == Op::Bcc {
            let cond = instr.cond();
            if cond == Cond::Jmp {
                next_pc = u16::from(r.y) << 8 | u16::from(bus);
            } else if cond.taken(r.ac) {
                // The page is the one the delay slot was fetched from.
                next_pc = fetch_pc & 0xff00 | u16::from(bus);
            }
            if cond == Cond::Jmp || cond.taken(r.ac) {
                self.trace
                    .emit(Category::Branch, format_args!("pc <- {:04x}", next_pc));
            }
        } else {
            let store = instr.op == Op::St;
            let old_sync = r.out & 0x40;
            match instr.mode.target() {
                Target::Ac if !store => r.ac = result,
                Target::X => r.x = result,
                Target::Y => r.y = result,
                Target::Out if !store => r.out = result,
                _ => {}
            }
            if old_sync != 0 && r.out & 0x40 == 0 {
                r.xout = r.ac;
                r.input = r.shift;
                r.shift = r.shift << 1 | self.serial;
                self.trace.emit(
                    Category::Ext,
                    format_args!("xout={:02x} in={:02x}", r.xout, r.input),
                );
            }
            if instr.mode == Mode::YxIncOut {
                r.x = r.x.wrapping_add(1);
            }
            if store {
                self.trace.emit(
                    Category::Store,
                    format_args!("[{:04x}] <- {:02x}", address, bus),
                );
                self.ram[usize::from(address)] = bus;
            }
        }

        let [ir, d] = word.to_le_bytes();
        let r = &mut self.regs;
        r.pc = next_pc;
        r.fetch_pc = fetch_pc;
        r.ir = ir;
        r.d = d;
        self.cycle += 1;
        self.trace.emit(
            Category::State,
            format_args!(
                "pc={:04x} ir={:02x} d={:02x} ac={:02x} x={:02x} y={:02x} out={:02x}",
                r.pc, r.ir, r.d, r.ac, r.x, r.y, r.out
            ),
        );
    }

    /// Step `cycles` times.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Drive the serial input line. Only bit 0 is used.
    pub fn set_serial_input(&mut self, bit: Level) {
        self.serial = bit & 1;
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn pc(&self) -> u16 {
        self.regs.pc
    }

    pub fn ac(&self) -> u8 {
        self.regs.ac
    }

    pub fn x(&self) -> u8 {
        self.regs.x
    }

    pub fn y(&self) -> u8 {
        self.regs.y
    }

    pub fn out(&self) -> u8 {
        self.regs.out
    }

    pub fn xout(&self) -> u8 {
        self.regs.xout
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn ram_peek(&self, address: u16) -> u8 {
        self.ram[usize::from(address & RAM_MASK)]
    }

    pub fn ram_poke(&mut self, address: u16, value: u8) {
        self.ram[usize::from(address & RAM_MASK)] = value;
    }

    /// Snapshot in the board's format. Fields the reference model has no
    /// counterpart for (bus, address, ALU) read zero.
    pub fn state(&self) -> BoardState {
        let r = &self.regs;
        BoardState {
            name: "emu".to_string(),
            cycle: self.cycle,
            pc: r.pc,
            fetch_pc: r.fetch_pc,
            ir: r.ir,
            d: r.d,
            ac: r.ac,
            x: r.x,
            y: r.y,
            out: r.out,
            xout: r.xout,
            input: r.input,
            bus: 0,
            address: 0,
            alu: 0,
            halted: false,
        }
    }
}

/// Errors building the reference machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmuError {
    #[error(transparent)]
    RomSize(#[from] MemoryError),
}
