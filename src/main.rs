mod terminal;

use std::{fs, fs::File, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use log::info;
use nibble8_core::{Chip8Interpreter, Config, Quirks, DEFAULT_CLOCK_HZ};

use terminal::{TerminalBell, TerminalDisplay, TerminalGuard, TerminalKeyboard};

/// Run a CHIP-8 ROM in the terminal. Esc quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Path to the ROM file
    rom: PathBuf,

    /// Instructions per second
    #[arg(long, default_value_t = DEFAULT_CLOCK_HZ)]
    hz: u32,

    /// Seed for the random number instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Stop on unknown opcodes instead of skipping them
    #[arg(long)]
    strict: bool,

    /// 8xy6/8xyE shift Vy into Vx
    #[arg(long)]
    shift_reads_vy: bool,

    /// Bnnn jumps to V0 + nnn
    #[arg(long)]
    jump_with_offset: bool,

    /// Write logs here instead of stderr, which the display draws over
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> Config {
        let config = Config::default()
            .with_clock_hz(self.hz)
            .with_strict(self.strict)
            .with_quirks(Quirks {
                shift_reads_vy: self.shift_reads_vy,
                jump_with_offset: self.jump_with_offset,
            });

        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,nibble8=info,nibble8_core=info"),
    );
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("could not create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let rom = fs::read(&args.rom)
        .with_context(|| format!("could not read ROM {}", args.rom.display()))?;
    info!("read {} bytes from {}", rom.len(), args.rom.display());

    let mut interpreter = Chip8Interpreter::new(
        args.config(),
        TerminalDisplay::new(),
        TerminalKeyboard::new(),
        TerminalBell::new(),
    );

    let guard = TerminalGuard::enter().context("could not set up the terminal")?;
    let result = interpreter.run_program(&rom);
    drop(guard);

    result.context("emulation stopped")?;
    Ok(())
}
