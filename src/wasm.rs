//! WebAssembly bindings for the board simulator.
//!
//! This module provides JavaScript-friendly wrappers around the board.

use wasm_bindgen::prelude::*;
use crate::{Board, TraceConfig};
use crate::asm::disasm::{disassemble, disassemble_range};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error<E: std::fmt::Display>(e: E) -> JsError {
    JsError::new(&e.to_string())
}

/// WebAssembly-friendly board wrapper.
#[wasm_bindgen]
pub struct WasmBoard {
    board: Board,
    image: Vec<u8>,
}

#[wasm_bindgen]
impl WasmBoard {
    /// Build a board from a full ROM image.
    #[wasm_bindgen(constructor)]
    pub fn new(image: &[u8]) -> Result<WasmBoard, JsError> {
        let board = Board::new("board", image, TraceConfig::off()).map_err(js_error)?;
        Ok(Self {
            board,
            image: image.to_vec(),
        })
    }

    /// Step one cycle. Returns the disassembly of the instruction latched.
    #[wasm_bindgen]
    pub fn step(&mut self) -> Result<String, JsError> {
        let latched = self.board.fetch_pc();
        let [ir, d] = self.board.rom().fetch(latched).to_le_bytes();
        self.board.step().map_err(js_error)?;
        Ok(disassemble(ir, d))
    }

    /// Run a number of cycles and return the cycle count.
    #[wasm_bindgen]
    pub fn run(&mut self, cycles: u32) -> Result<u64, JsError> {
        self.board.run(u64::from(cycles)).map_err(js_error)?;
        Ok(self.board.cycle())
    }

    /// Rebuild the board from the stored image.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.board = Board::new("board", &self.image, TraceConfig::off()).map_err(js_error)?;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_serial_input(&mut self, bit: u8) {
        self.board.set_serial_input(bit);
    }

    #[wasm_bindgen]
    pub fn is_halted(&self) -> bool {
        self.board.is_halted()
    }

    #[wasm_bindgen]
    pub fn cycles(&self) -> u64 {
        self.board.cycle()
    }

    #[wasm_bindgen]
    pub fn pc(&self) -> u16 {
        self.board.pc()
    }

    #[wasm_bindgen]
    pub fn ac(&self) -> u8 {
        self.board.ac()
    }

    #[wasm_bindgen]
    pub fn x(&self) -> u8 {
        self.board.x()
    }

    #[wasm_bindgen]
    pub fn y(&self) -> u8 {
        self.board.y()
    }

    /// Output register: sync bits and colour.
    #[wasm_bindgen]
    pub fn out(&self) -> u8 {
        self.board.out()
    }

    /// Extended output register: LEDs and audio.
    #[wasm_bindgen]
    pub fn xout(&self) -> u8 {
        self.board.xout()
    }

    #[wasm_bindgen]
    pub fn leds(&self) -> u8 {
        self.board.leds()
    }

    #[wasm_bindgen]
    pub fn ram_at(&self, address: u16) -> u8 {
        self.board.ram_peek(address)
    }

    /// Disassemble `count` ROM words from `start`.
    #[wasm_bindgen]
    pub fn disassemble(&self, start: u16, count: usize) -> String {
        disassemble_range(self.board.rom().words(), start, count)
    }

    /// Get the full board state as a JSON string.
    #[wasm_bindgen]
    pub fn state_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.board.state()).map_err(js_error)
    }
}

/// Disassemble one instruction.
#[wasm_bindgen]
pub fn wasm_disassemble(ir: u8, d: u8) -> String {
    disassemble(ir, d)
}
