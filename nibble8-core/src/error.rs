use std::io;

use thiserror::Error;

use crate::{Opcode, MAX_PROGRAM_SIZE, STACK_DEPTH};

pub type Result<T> = std::result::Result<T, MachineError>;

/// Everything that ends a session. Unknown opcodes only land here in strict
/// mode.
#[derive(Debug, Error)]
pub enum MachineError {
    #[error("call stack overflow: more than {depth} nested calls at {pc:#05X}", depth = STACK_DEPTH)]
    StackOverflow { pc: u16 },

    #[error("call stack underflow: return with no active call at {pc:#05X}")]
    StackUnderflow { pc: u16 },

    #[error("ROM is {size} bytes, at most {max} fit in program memory", max = MAX_PROGRAM_SIZE)]
    RomTooLarge { size: usize },

    #[error("unimplemented opcode {opcode:04X} at {pc:#05X}")]
    UnimplementedOpcode { opcode: Opcode, pc: u16 },

    #[error("frontend I/O failed")]
    Io(#[from] io::Error),
}
