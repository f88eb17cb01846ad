use crate::{
    Framebuffer, Keypad, MachineError, Result, FLAG_REGISTER, FONT_ADDRESS, GLYPH_HEIGHT,
    MAX_PROGRAM_SIZE, MEMORY_SIZE, PROGRAM_START, REGISTER_COUNT, STACK_DEPTH,
};

pub const FONT: [u8; 16 * 5] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Everything a running CHIP-8 program can observe.
///
/// Addresses into `ram` wrap at [`MEMORY_SIZE`], so no register value can
/// index outside memory.
#[derive(Debug, Clone)]
pub struct Chip8State {
    pub data_registers: [u8; REGISTER_COUNT],
    pub index_register: u16,
    pub program_counter: u16,
    /// Number of occupied `stack` slots.
    pub stack_pointer: u8,
    pub ram: [u8; MEMORY_SIZE],
    pub stack: [u16; STACK_DEPTH],
    pub delay_timer: u8,
    pub sound_timer: u8,
    pub display: Framebuffer,
    pub keypad: Keypad,
    font_table: [u16; 16],
}

impl Default for Chip8State {
    fn default() -> Self {
        let mut state = Self {
            data_registers: [0; REGISTER_COUNT],
            index_register: 0,
            program_counter: PROGRAM_START,
            stack_pointer: 0,
            ram: [0; MEMORY_SIZE],
            stack: [0; STACK_DEPTH],
            delay_timer: 0,
            sound_timer: 0,
            display: Framebuffer::default(),
            keypad: Keypad::default(),
            font_table: [0; 16],
        };
        state.load_font_data(&FONT);
        state
    }
}

impl Chip8State {
    /// A fresh state with `program` copied to [`PROGRAM_START`].
    pub fn with_program(program: &[u8]) -> Result<Self> {
        let mut state = Self::default();
        state.load_program(program)?;
        Ok(state)
    }

    fn load_font_data(&mut self, fonts: &[u8]) {
        let start = FONT_ADDRESS as usize;
        self.ram[start..start + fonts.len()].copy_from_slice(fonts);
        for (digit, address) in self.font_table.iter_mut().enumerate() {
            *address = FONT_ADDRESS + digit as u16 * GLYPH_HEIGHT;
        }
    }

    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::RomTooLarge {
                size: program.len(),
            });
        }
        let start = PROGRAM_START as usize;
        self.ram[start..start + program.len()].copy_from_slice(program);
        Ok(())
    }

    pub fn register(&self, register_index: u8) -> u8 {
        self.data_registers[register_index as usize]
    }

    pub fn register_mut(&mut self, register_index: u8) -> &mut u8 {
        &mut self.data_registers[register_index as usize]
    }

    pub fn set_flag(&mut self, flag: bool) {
        *self.register_mut(FLAG_REGISTER) = flag as u8;
    }

    /// Address of the glyph for hex digit `digit` (low nibble only).
    pub fn glyph_address(&self, digit: u8) -> u16 {
        self.font_table[(digit & 0xF) as usize]
    }

    pub fn read(&self, address: u16) -> u8 {
        self.ram[address as usize % MEMORY_SIZE]
    }

    pub fn write(&mut self, address: u16, value: u8) {
        self.ram[address as usize % MEMORY_SIZE] = value;
    }

    /// `len` bytes starting at `address`, wrapping at the end of memory.
    pub fn read_slice(&self, address: u16, len: usize) -> Vec<u8> {
        (0..len)
            .map(|offset| self.ram[(address as usize + offset) % MEMORY_SIZE])
            .collect()
    }

    pub fn fetch_word(&self) -> u16 {
        let pc = self.program_counter;
        u16::from_be_bytes([self.read(pc), self.read(pc.wrapping_add(1))])
    }

    pub fn push_return(&mut self, return_address: u16) -> Result<()> {
        let depth = self.stack_pointer as usize;
        if depth >= STACK_DEPTH {
            return Err(MachineError::StackOverflow {
                pc: self.program_counter,
            });
        }
        self.stack[depth] = return_address;
        self.stack_pointer += 1;
        Ok(())
    }

    pub fn pop_return(&mut self) -> Result<u16> {
        if self.stack_pointer == 0 {
            return Err(MachineError::StackUnderflow {
                pc: self.program_counter,
            });
        }
        if self.stack_pointer as usize > STACK_DEPTH {
            return Err(MachineError::StackOverflow {
                pc: self.program_counter,
            });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer as usize])
    }

    /// One 60 Hz tick: both timers count down to zero and stay there.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub fn sound_active(&self) -> bool {
        self.sound_timer > 0
    }
}
