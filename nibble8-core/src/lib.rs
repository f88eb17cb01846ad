//! A CHIP-8 virtual machine.
//!
//! The [`Machine`] owns all state and executes one instruction per
//! [`Machine::step`]. Timers are ticked separately through
//! [`Machine::tick_timers`], normally by the [`Scheduler`] inside
//! [`Chip8Interpreter`], which drives a machine in real time against a set of
//! frontend collaborators ([`Chip8Display`], [`Chip8Keyboard`],
//! [`Chip8Beeper`]).

mod beeper;
mod config;
mod display;
mod error;
mod instruction;
mod interpreter;
mod keyboard;
mod machine;
mod opcode;
mod state;
mod timer;

pub use beeper::{Chip8Beeper, Mute};
pub use config::{Config, Quirks};
pub use display::{Chip8Display, Framebuffer};
pub use error::{MachineError, Result};
pub use instruction::Instruction;
pub use interpreter::{Chip8Interpreter, Control};
pub use keyboard::{Chip8Keyboard, Keypad};
pub use machine::{Machine, Step};
pub use opcode::Opcode;
pub use state::{Chip8State, FONT};
pub use timer::{Due, Scheduler, Timer};

pub const MEMORY_SIZE: usize = 4096;
pub const PROGRAM_START: u16 = 0x200;
pub const MAX_PROGRAM_SIZE: usize = MEMORY_SIZE - PROGRAM_START as usize;
pub const FONT_ADDRESS: u16 = 0x000;
pub const GLYPH_HEIGHT: u16 = 5;
pub const REGISTER_COUNT: usize = 16;
pub const FLAG_REGISTER: u8 = 0xF;
pub const STACK_DEPTH: usize = 16;
pub const KEY_COUNT: usize = 16;
pub const DISPLAY_WIDTH: usize = 64;
pub const DISPLAY_HEIGHT: usize = 32;
pub const TIMER_HZ: u32 = 60;
pub const DEFAULT_CLOCK_HZ: u32 = 500;
