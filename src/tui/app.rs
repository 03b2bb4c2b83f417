//! Monitor application state and logic.

use std::collections::HashSet;

use crate::asm::disasm::disassemble;
use crate::board::Board;
use crate::chips::RAM_SIZE;
use crate::trace::TraceConfig;

/// Bytes per row in the RAM view.
pub const RAM_ROW: usize = 16;

/// Cycles run per UI tick while running.
const CYCLES_PER_TICK: usize = 64;

/// Monitor application state.
pub struct MonitorApp {
    /// The board being watched.
    pub board: Board,
    /// ROM image, kept for reset.
    pub image: Vec<u8>,
    /// Breakpoints on the PC.
    pub breakpoints: HashSet<u16>,
    pub running: bool,
    pub should_quit: bool,
    pub status: String,
    /// First RAM row shown.
    pub ram_scroll: usize,
    /// Level driven on the serial input.
    pub serial: u8,
}

impl MonitorApp {
    pub fn new(board: Board, image: Vec<u8>) -> Self {
        Self {
            board,
            image,
            breakpoints: HashSet::new(),
            running: false,
            should_quit: false,
            status: "Ready. Press 's' to step, 'r' to run, 'q' to quit.".into(),
            ram_scroll: 0,
            serial: 0,
        }
    }

    /// Step one cycle.
    pub fn step(&mut self) {
        // The word on the IR/D inputs is the one latched by this step.
        let latched = self.board.fetch_pc();
        let [ir, d] = self.board.rom().fetch(latched).to_le_bytes();
        match self.board.step() {
            Ok(()) => {
                self.status = format!(
                    "cycle {}: latched {:04x} {}",
                    self.board.cycle(),
                    latched,
                    disassemble(ir, d)
                );
            }
            Err(e) => {
                self.status = format!("Error: {}", e);
                self.running = false;
            }
        }
    }

    pub fn run(&mut self) {
        self.running = true;
        self.status = "Running...".into();
    }

    /// Run a batch of cycles, stopping at a breakpoint or fault.
    pub fn tick(&mut self) {
        for _ in 0..CYCLES_PER_TICK {
            if !self.running {
                return;
            }
            if self.board.is_halted() {
                self.running = false;
                self.status = format!("Halted after {} cycles", self.board.cycle());
                return;
            }
            self.step();
            let pc = self.board.pc();
            if self.breakpoints.contains(&pc) {
                self.running = false;
                self.status = format!("Breakpoint at PC={:04x}", pc);
            }
        }
    }

    /// Toggle a breakpoint at the current PC.
    pub fn toggle_breakpoint(&mut self) {
        let pc = self.board.pc();
        if self.breakpoints.remove(&pc) {
            self.status = format!("Removed breakpoint at PC={:04x}", pc);
        } else {
            self.breakpoints.insert(pc);
            self.status = format!("Set breakpoint at PC={:04x}", pc);
        }
    }

    pub fn toggle_serial(&mut self) {
        self.serial ^= 1;
        self.board.set_serial_input(self.serial);
        self.status = format!("Serial input = {}", self.serial);
    }

    /// Rebuild the board from the ROM image.
    pub fn reset(&mut self) {
        match Board::new(self.board.name(), &self.image, TraceConfig::off()) {
            Ok(board) => {
                self.board = board;
                self.board.set_serial_input(self.serial);
                self.status = "Reset. Ready.".into();
            }
            Err(e) => self.status = format!("Error: {}", e),
        }
        self.running = false;
    }

    pub fn scroll_ram(&mut self, rows: isize) {
        let max = RAM_SIZE / RAM_ROW - 1;
        self.ram_scroll = self.ram_scroll.saturating_add_signed(rows).min(max);
    }

    /// Disassembly around the PC: (address, text, is_pc).
    pub fn get_disassembly(&self, lines: usize) -> Vec<(u16, String, bool)> {
        let pc = self.board.pc();
        let start = pc.saturating_sub((lines / 2) as u16);
        (0..lines)
            .map(|i| start.wrapping_add(i as u16))
            .map(|addr| {
                let [ir, d] = self.board.rom().fetch(addr).to_le_bytes();
                (addr, disassemble(ir, d), addr == pc)
            })
            .collect()
    }
}

/// Run the monitor on a board.
pub fn run_monitor(board: Board, image: Vec<u8>) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event, KeyCode, KeyEventKind},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;
    use std::time::Duration;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = MonitorApp::new(board, image);

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(Duration::from_millis(30))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => app.should_quit = true,
                        KeyCode::Char('s') => {
                            app.running = false;
                            app.step();
                        }
                        KeyCode::Char('r') => app.run(),
                        KeyCode::Char('p') => {
                            app.running = false;
                            app.status = "Paused.".into();
                        }
                        KeyCode::Char('b') => app.toggle_breakpoint(),
                        KeyCode::Char('i') => app.toggle_serial(),
                        KeyCode::Char('x') => app.reset(),
                        KeyCode::Up => app.scroll_ram(-1),
                        KeyCode::Down => app.scroll_ram(1),
                        KeyCode::PageUp => app.scroll_ram(-16),
                        KeyCode::PageDown => app.scroll_ram(16),
                        _ => {}
                    }
                }
            }
        }

        if app.running {
            app.tick();
        }

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::{Cond, BusSel, Instruction, RomBuilder};

    fn app() -> MonitorApp {
        let image = RomBuilder::new()
            .extend([
                Instruction::nop(),
                Instruction::branch(Cond::Bra, BusSel::D, 0x00),
                Instruction::nop(),
            ])
            .image();
        let board = Board::new("board", &image, TraceConfig::off()).unwrap();
        MonitorApp::new(board, image)
    }

    #[test]
    fn test_breakpoint_stops_run() {
        let mut app = app();
        app.breakpoints.insert(2);
        app.run();
        app.tick();
        assert!(!app.running);
        assert_eq!(app.board.pc(), 2);
    }

    #[test]
    fn test_status_names_latched_word() {
        let mut app = app();
        app.step();
        app.step();
        app.step();
        assert_eq!(app.status, "cycle 3: latched 0001 BRA $00");
    }

    #[test]
    fn test_reset_rebuilds_board() {
        let mut app = app();
        app.step();
        app.step();
        app.reset();
        assert_eq!(app.board.cycle(), 0);
        assert_eq!(app.board.pc(), 0);
    }

    #[test]
    fn test_disassembly_marks_pc() {
        let app = app();
        let lines = app.get_disassembly(4);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().any(|(addr, _, is_pc)| *addr == 0 && *is_pc));
        assert_eq!(lines[1].1, "BRA $00");
    }
}
