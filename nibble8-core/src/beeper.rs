use std::io;

pub trait Chip8Beeper {
    fn play(&mut self) -> io::Result<()>;
    fn pause(&mut self) -> io::Result<()>;
}

/// Beeper for headless runs.
#[derive(Debug, Default)]
pub struct Mute;

impl Chip8Beeper for Mute {
    fn play(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn pause(&mut self) -> io::Result<()> {
        Ok(())
    }
}
