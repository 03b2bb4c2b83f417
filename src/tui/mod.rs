//! Terminal board monitor.
//!
//! Provides an interactive terminal view of a running board with:
//! - Registers, output latches and decoded control lines
//! - RAM hex view
//! - Step/run/breakpoint controls
//! - ROM disassembly around the PC

mod app;
mod ui;

pub use app::{run_monitor, MonitorApp};
