//! UI rendering for the monitor.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, List, ListItem},
    style::{Color, Style, Modifier},
};
use crate::signal::Level;
use crate::chips::RAM_SIZE;
use super::app::{MonitorApp, RAM_ROW};

/// Main draw function.
pub fn draw(frame: &mut Frame, app: &MonitorApp) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(50),
        ])
        .split(frame.area());

    // Left side: code, registers and status
    let left_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(8),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    draw_disassembly(frame, left_chunks[0], app);
    draw_registers(frame, left_chunks[1], app);
    draw_status(frame, left_chunks[2], app);

    // Right side: RAM, control lines and help
    let right_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(10),
            Constraint::Length(6),
            Constraint::Length(4),
        ])
        .split(chunks[1]);

    draw_ram(frame, right_chunks[0], app);
    draw_control(frame, right_chunks[1], app);
    draw_help(frame, right_chunks[2]);
}

fn draw_disassembly(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let disasm = app.get_disassembly((area.height as usize).saturating_sub(2));

    let items: Vec<ListItem> = disasm
        .iter()
        .map(|(addr, instr, is_current)| {
            let prefix = if *is_current { "▶ " } else { "  " };
            let bp = if app.breakpoints.contains(addr) { "●" } else { " " };
            let text = format!("{}{:04x}: {}", prefix, addr, instr);

            let style = if *is_current {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if app.breakpoints.contains(addr) {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };

            ListItem::new(format!("{} {}", bp, text)).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" ROM ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)));

    frame.render_widget(list, area);
}

fn hex(label: &str, value: String) -> [Span<'static>; 2] {
    [
        Span::raw(format!("{}: ", label)),
        Span::styled(format!("{:<6}", value), Style::default().fg(Color::White)),
    ]
}

fn draw_registers(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let board = &app.board;
    let (r, g, b) = board.color();

    let content = vec![
        Line::from([
            hex("PC", format!("{:04x}", board.pc())),
            hex("IR", format!("{:02x}", board.ir())),
            hex("D", format!("{:02x}", board.d())),
        ].concat()),
        Line::from([
            hex("AC", format!("{:02x}", board.ac())),
            hex("X", format!("{:02x}", board.x())),
            hex("Y", format!("{:02x}", board.y())),
        ].concat()),
        Line::from([
            hex("OUT", format!("{:02x}", board.out())),
            hex("XOUT", format!("{:02x}", board.xout())),
            hex("IN", format!("{:02x}", board.input())),
        ].concat()),
        Line::from(vec![
            Span::raw("LEDs: "),
            Span::styled(format!("{:04b}", board.leds()), Style::default().fg(Color::Green)),
            Span::raw(format!("  RGB {}{}{}  ", r, g, b)),
            Span::raw(format!("H{} V{}", board.hsync(), board.vsync())),
        ]),
        Line::from(vec![
            Span::raw("Cycles: "),
            Span::styled(format!("{}", board.cycle()), Style::default().fg(Color::Cyan)),
            Span::raw("   State: "),
            if board.is_halted() {
                Span::styled("halted", Style::default().fg(Color::Red))
            } else if app.running {
                Span::styled("running", Style::default().fg(Color::Green))
            } else {
                Span::styled("stopped", Style::default().fg(Color::Yellow))
            },
        ]),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Registers ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green)));

    frame.render_widget(paragraph, area);
}

fn draw_ram(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let visible_rows = (area.height as usize).saturating_sub(2);
    let start = app.ram_scroll;
    let end = (start + visible_rows).min(RAM_SIZE / RAM_ROW);
    let address = usize::from(app.board.address()) & (RAM_SIZE - 1);

    let items: Vec<ListItem> = (start..end)
        .map(|row| {
            let base = row * RAM_ROW;
            let bytes: Vec<String> = (base..base + RAM_ROW)
                .map(|a| format!("{:02x}", app.board.ram_peek(a as u16)))
                .collect();
            let text = format!("{:04x}: {}", base, bytes.join(" "));

            let style = if (base..base + RAM_ROW).contains(&address) {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };

            ListItem::new(text).style(style)
        })
        .collect();

    let list = List::new(items)
        .block(Block::default()
            .title(" RAM ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Magenta)));

    frame.render_widget(list, area);
}

/// Active-low lines are lit when low.
fn line_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn draw_control(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let c = app.board.control();
    let low = |l: Level| line_style(l == 0);
    let ar: String = c.ar.iter().rev().map(|l| l.to_string()).collect();

    let content = vec![
        Line::from(vec![
            Span::raw(format!("AR={} AL={}  ", ar, c.al)),
            Span::styled("ST ", low(c.store_n)),
            Span::styled("AC ", low(c.ld_ac_n)),
            Span::styled("X ", low(c.ld_x_n)),
            Span::styled("Y ", low(c.ld_y_n)),
            Span::styled("OUT ", low(c.ld_out_n)),
            Span::styled("X++", low(c.inc_x_n)),
        ]),
        Line::from(vec![
            Span::styled("EL ", low(c.el_n)),
            Span::styled("EH  ", low(c.eh_n)),
            Span::styled("D ", low(c.bus_n[0])),
            Span::styled("RAM ", low(c.bus_n[1])),
            Span::styled("AC ", low(c.bus_n[2])),
            Span::styled("IN  ", low(c.bus_n[3])),
            Span::styled("JMP ", low(c.jmp_n)),
            Span::styled("TAKEN ", line_style(c.taken == 1)),
            Span::styled("PL ", low(c.pl_n)),
            Span::styled("PH", low(c.ph_n)),
        ]),
        Line::from(format!(
            "bus={:02x} ({:?}) addr={:04x} alu={:02x} carry={}",
            app.board.bus(),
            app.board.bus_source(),
            app.board.address(),
            app.board.alu(),
            app.board.carry()
        )),
    ];

    let paragraph = Paragraph::new(content)
        .block(Block::default()
            .title(" Control ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue)));

    frame.render_widget(paragraph, area);
}

fn draw_status(frame: &mut Frame, area: Rect, app: &MonitorApp) {
    let status = Paragraph::new(app.status.clone())
        .style(Style::default().fg(Color::White))
        .block(Block::default()
            .title(" Status ")
            .borders(Borders::ALL));

    frame.render_widget(status, area);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let help = Paragraph::new(vec![
        Line::from("s: Step  r: Run  p: Pause  b: Breakpoint  i: Serial"),
        Line::from("x: Reset  ↑↓ PgUp PgDn: Scroll RAM  q: Quit"),
    ])
    .style(Style::default().fg(Color::DarkGray))
    .block(Block::default()
        .title(" Help ")
        .borders(Borders::ALL));

    frame.render_widget(help, area);
}
