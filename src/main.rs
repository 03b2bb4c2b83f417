//! Gigatron board simulator - CLI Entry Point
//!
//! Commands:
//! - `gigatron-sim run <rom>` - Run the chip-level board
//! - `gigatron-sim compare <rom>` - Run board and reference machine in lockstep
//! - `gigatron-sim disasm <rom>` - Disassemble a ROM image
//! - `gigatron-sim debug <rom>` - Interactive board monitor
//! - `gigatron-sim demo` - Run the built-in demo ROM

use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;

use gigatron::{Board, Level, TraceConfig, Watch, WatchMode};

#[derive(Parser)]
#[command(name = "gigatron-sim")]
#[command(version = "0.1.0")]
#[command(about = "A chip-level simulator of the Gigatron TTL microcomputer")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a ROM image on the board
    Run {
        /// Path to the 128 KiB ROM image
        rom: String,
        /// Number of cycles to run
        #[arg(short, long, default_value = "10000")]
        cycles: u64,
        /// Trace filter, e.g. `DECODE,REG` or `ac:*,board:STATE`
        #[arg(short, long)]
        trace: Option<String>,
        /// Comma-separated fields to print every cycle, e.g. `pc,ac,out`
        #[arg(short, long)]
        watch: Option<String>,
        /// Only print watched fields that changed
        #[arg(long)]
        deltas: bool,
        /// Serial input bits, one per cycle, repeated, e.g. `0110`
        #[arg(long)]
        serial: Option<String>,
        /// Print the final board state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run the board and the reference machine in lockstep
    Compare {
        /// Path to the 128 KiB ROM image
        rom: String,
        /// Number of cycles to compare
        #[arg(short, long, default_value = "20000")]
        cycles: u64,
    },
    /// Disassemble a ROM image
    Disasm {
        /// Path to the 128 KiB ROM image
        rom: String,
        /// First address, decimal or 0x-prefixed hex
        #[arg(short, long, default_value = "0")]
        start: String,
        /// Number of words
        #[arg(short = 'n', long, default_value = "256")]
        count: usize,
    },
    /// Interactive board monitor
    Debug {
        /// Path to the 128 KiB ROM image
        rom: String,
    },
    /// Run the built-in demo ROM
    Demo {
        /// Number of cycles to run
        #[arg(short, long, default_value = "64")]
        cycles: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    let trace_wanted = matches!(cli.command, Some(Commands::Run { trace: Some(_), .. }));
    init_logging(trace_wanted);

    match cli.command {
        Some(Commands::Run { rom, cycles, trace, watch, deltas, serial, json }) => {
            let options = RunOptions { cycles, trace, watch, deltas, serial, json };
            run_rom(&rom, options);
        }
        Some(Commands::Compare { rom, cycles }) => {
            compare_rom(&rom, cycles);
        }
        Some(Commands::Disasm { rom, start, count }) => {
            disassemble_file(&rom, &start, count);
        }
        Some(Commands::Debug { rom }) => {
            debug_rom(&rom);
        }
        Some(Commands::Demo { cycles }) => {
            run_demo(cycles);
        }
        None => {
            println!("Gigatron board simulator v0.1.0");
            println!("A chip-level simulation of a TTL microcomputer");
            println!();
            println!("Use --help for available commands");
        }
    }
}

/// Route `tracing` events to stderr, filtered by RUST_LOG.
fn init_logging(trace_wanted: bool) {
    let default = if trace_wanted { "trace" } else { "info" };
    let filter_layer = match tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(default))
    {
        Ok(layer) => layer,
        Err(e) => {
            eprintln!("❌ Bad log filter: {}", e);
            std::process::exit(1);
        }
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}

fn load_or_exit(path: &str) -> Vec<u8> {
    match gigatron::load_rom(path) {
        Ok(image) => {
            println!("📂 Loaded {} ({} bytes)", path, image.len());
            image
        }
        Err(e) => {
            eprintln!("❌ Failed to load ROM: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_serial(bits: &str) -> Vec<Level> {
    let mut levels = Vec::new();
    for c in bits.chars() {
        match c {
            '0' => levels.push(0),
            '1' => levels.push(1),
            _ => {
                eprintln!("❌ Serial input must be 0s and 1s, got '{}'", c);
                std::process::exit(1);
            }
        }
    }
    levels
}

fn parse_address(text: &str) -> u16 {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("$")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => text.parse(),
    };
    match parsed {
        Ok(address) => address,
        Err(e) => {
            eprintln!("❌ Bad address '{}': {}", text, e);
            std::process::exit(1);
        }
    }
}

struct RunOptions {
    cycles: u64,
    trace: Option<String>,
    watch: Option<String>,
    deltas: bool,
    serial: Option<String>,
    json: bool,
}

fn run_rom(path: &str, options: RunOptions) {
    println!("🔧 Running: {}", path);
    let image = load_or_exit(path);

    let trace = match options.trace.as_deref().map(TraceConfig::parse) {
        None => TraceConfig::off(),
        Some(Ok(config)) => config,
        Some(Err(e)) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let mode = if options.deltas { WatchMode::Deltas } else { WatchMode::Values };
    let mut watch = match options.watch.as_deref().map(|list| Watch::parse(list, mode)) {
        None => Watch::new(mode),
        Some(Ok(watch)) => watch,
        Some(Err(e)) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let serial = options.serial.as_deref().map(parse_serial).unwrap_or_default();

    let mut board = match Board::new("board", &image, trace) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!();
    println!("━━━ Execution ━━━");

    for cycle in 0..options.cycles {
        if !serial.is_empty() {
            board.set_serial_input(serial[(cycle as usize) % serial.len()]);
        }
        if let Err(e) = board.step() {
            eprintln!("❌ Board error at PC={:04x}: {}", board.pc(), e);
            std::process::exit(1);
        }
        if !watch.is_empty() {
            if let Some(line) = watch.sample(&board) {
                println!("{:>8}: {}", board.cycle(), line);
            }
        }
    }

    println!();
    println!("━━━ Result ━━━");
    if options.json {
        match serde_json::to_string_pretty(&board.state()) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("❌ Failed to serialize state: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&board);
    }
}

fn print_summary(board: &Board) {
    let (r, g, b) = board.color();
    println!("{}", board.state());
    println!("LEDs:   {:04b}", board.leds());
    println!("Audio:  {:x}", board.audio());
    println!("Colour: R={} G={} B={}  hSync={} vSync={}", r, g, b, board.hsync(), board.vsync());
}

fn compare_rom(path: &str, cycles: u64) {
    use gigatron::{CompareError, Lockstep};

    println!("⚖️  Comparing: {}", path);
    let image = load_or_exit(path);

    let mut lockstep = match Lockstep::new(&image, TraceConfig::off()) {
        Ok(lockstep) => lockstep,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    match lockstep.run(cycles) {
        Ok(()) => {
            println!("✓ Board and reference agree for {} cycles", lockstep.cycle());
        }
        Err(CompareError::Divergence(d)) => {
            eprintln!("❌ Divergence: {}", d);
            eprintln!("   board: {}", lockstep.board().state());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ Comparison stopped: {}", e);
            std::process::exit(1);
        }
    }
}

fn disassemble_file(path: &str, start: &str, count: usize) {
    use gigatron::{disassemble_range, words_from_image};

    println!("📖 Disassembling: {}", path);
    println!();

    let image = load_or_exit(path);
    let words = match words_from_image(&image) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    print!("{}", disassemble_range(&words, parse_address(start), count));
}

#[cfg(feature = "tui")]
fn debug_rom(path: &str) {
    use gigatron::tui::run_monitor;

    println!("🔍 Loading: {}", path);
    let image = load_or_exit(path);
    let board = match Board::new("board", &image, TraceConfig::off()) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    println!("🚀 Launching monitor...");
    println!();

    if let Err(e) = run_monitor(board, image) {
        eprintln!("❌ Monitor error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "tui"))]
fn debug_rom(_path: &str) {
    eprintln!("❌ Built without the `tui` feature");
    std::process::exit(1);
}

fn run_demo(cycles: u64) {
    use gigatron::demo::{demo_image, demo_rom};
    use gigatron::disassemble_range;

    println!("━━━ Demo ROM ━━━");
    println!();
    let words = demo_rom().words();
    print!("{}", disassemble_range(&words, 0, 4));
    println!("...");
    print!("{}", disassemble_range(&words, 0x100, 6));
    println!();

    let image = demo_image();
    let mut board = match Board::new("demo", &image, TraceConfig::off()) {
        Ok(board) => board,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };
    let mut watch = Watch::new(WatchMode::Deltas);
    for name in ["pc", "ac", "out", "xout"] {
        if let Err(e) = watch.add_standard(name) {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    for _ in 0..cycles {
        if let Err(e) = board.step() {
            eprintln!("❌ Board error: {}", e);
            std::process::exit(1);
        }
        if let Some(line) = watch.sample(&board) {
            println!("{:>6}: {}", board.cycle(), line);
        }
    }

    println!();
    println!("✓ LEDs show {:04b} after {} cycles", board.leds(), board.cycle());
}
