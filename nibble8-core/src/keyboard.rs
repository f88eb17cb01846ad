use std::io;

use crate::{Control, KEY_COUNT};

/// Source of key presses, polled by the interpreter between cycles.
pub trait Chip8Keyboard {
    /// Refresh `keypad` from the device, blocking for at most `budget_micros`.
    /// Returns [`Control::Quit`] to end the session.
    fn update_keystates(&mut self, keypad: &mut Keypad, budget_micros: u64)
        -> io::Result<Control>;
}

/// Pressed state of the sixteen hex keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; KEY_COUNT],
}

impl Keypad {
    /// Only the low nibble of `key` is significant.
    pub fn is_key_down(&self, key: u8) -> bool {
        self.keys[(key & 0xF) as usize]
    }

    pub fn set(&mut self, key: u8, pressed: bool) {
        self.keys[(key & 0xF) as usize] = pressed;
    }

    pub fn release_all(&mut self) {
        self.keys = [false; KEY_COUNT];
    }

    /// Lowest pressed key, if any.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&down| down).map(|key| key as u8)
    }
}
