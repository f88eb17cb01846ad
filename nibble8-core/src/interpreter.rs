use std::time::Instant;

use log::{debug, info};

use crate::{
    Chip8Beeper, Chip8Display, Chip8Keyboard, Config, Machine, Result, Scheduler, TIMER_HZ,
};

/// Returned by the keyboard to keep the session going or end it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Runs a machine in real time against its frontend.
///
/// One loop interleaves both clocks: the keyboard is polled with whatever
/// time is left until the next clock fires, then every instruction cycle and
/// timer tick that fell due runs, with a non-waiting poll before each extra
/// cycle so no instruction sees a stale keypad. `Fx0A` never blocks this loop, it only
/// holds the program counter, so timers and input keep moving while a
/// program waits for a key.
pub struct Chip8Interpreter<D: Chip8Display, K: Chip8Keyboard, B: Chip8Beeper> {
    pub config: Config,
    pub display: D,
    pub keyboard: K,
    pub beeper: B,
}

impl<D: Chip8Display, K: Chip8Keyboard, B: Chip8Beeper> Chip8Interpreter<D, K, B> {
    pub fn new(config: Config, display: D, keyboard: K, beeper: B) -> Self {
        Self {
            config,
            display,
            keyboard,
            beeper,
        }
    }

    /// Runs `program` until the keyboard asks to quit or the machine fails.
    pub fn run_program(&mut self, program: &[u8]) -> Result<Machine> {
        let mut machine = Machine::with_program(program, self.config.clone())?;
        info!(
            "loaded {} byte program, running at {} Hz",
            program.len(),
            self.config.clock_hz
        );

        self.run(&mut machine)?;
        Ok(machine)
    }

    pub fn run(&mut self, machine: &mut Machine) -> Result<()> {
        let mut scheduler = Scheduler::new(self.config.clock_hz);
        // a stalled host drops the backlog instead of racing through it
        let max_cycles = self.config.clock_hz.div_ceil(TIMER_HZ);
        let mut last_frame = Instant::now();
        let mut beeping = false;

        loop {
            let budget = scheduler.until_next();
            let control = self
                .keyboard
                .update_keystates(machine.keypad_mut(), budget.as_micros() as u64)?;
            if control == Control::Quit {
                break;
            }

            let now = Instant::now();
            let mut due = scheduler.advance(now - last_frame);
            last_frame = now;

            if due.cycles > max_cycles {
                debug!("fell behind, dropping {} cycles", due.cycles - max_cycles);
                due.cycles = max_cycles;
            }

            let keyboard = &mut self.keyboard;
            let control = match machine
                .run_due_with(due, |keypad| Ok(keyboard.update_keystates(keypad, 0)?))
            {
                Ok(control) => control,
                Err(error) => {
                    debug!("machine halted: {error}");
                    self.beeper.pause()?;
                    return Err(error);
                }
            };

            if due.timer_ticks > 0 {
                if machine.sound_active() != beeping {
                    beeping = machine.sound_active();
                    if beeping {
                        self.beeper.play()?;
                    } else {
                        self.beeper.pause()?;
                    }
                }
                if machine.take_display_dirty() {
                    self.display.present(machine.display())?;
                }
            }

            if control == Control::Quit {
                break;
            }
        }

        info!("session ended after {} cycles", machine.cycles());
        if beeping {
            self.beeper.pause()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io, thread,
        time::{Duration, Instant},
    };

    use super::*;
    use crate::{Framebuffer, Keypad, MachineError, Mute};

    #[derive(Default)]
    struct RecordingDisplay {
        frames: Vec<Framebuffer>,
    }

    impl Chip8Display for RecordingDisplay {
        fn present(&mut self, frame: &Framebuffer) -> io::Result<()> {
            self.frames.push(frame.clone());
            Ok(())
        }
    }

    /// Sleeps through its budget like a real device would and quits once
    /// `run_for` has passed.
    struct TimedKeyboard {
        started: Instant,
        run_for: Duration,
        press: Option<u8>,
        polls: usize,
    }

    impl TimedKeyboard {
        fn new(run_for: Duration) -> Self {
            Self {
                started: Instant::now(),
                run_for,
                press: None,
                polls: 0,
            }
        }
    }

    impl Chip8Keyboard for TimedKeyboard {
        fn update_keystates(
            &mut self,
            keypad: &mut Keypad,
            budget_micros: u64,
        ) -> io::Result<Control> {
            self.polls += 1;
            if self.started.elapsed() >= self.run_for {
                return Ok(Control::Quit);
            }
            if let Some(key) = self.press {
                keypad.set(key, true);
            }
            thread::sleep(Duration::from_micros(budget_micros));
            Ok(Control::Continue)
        }
    }

    fn words(program: &[u16]) -> Vec<u8> {
        program.iter().flat_map(|word| word.to_be_bytes()).collect()
    }

    #[test]
    fn quits_on_request() {
        let keyboard = TimedKeyboard::new(Duration::ZERO);
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let machine = interpreter.run_program(&words(&[0x1200])).unwrap();
        assert_eq!(machine.cycles(), 0);
        assert_eq!(interpreter.keyboard.polls, 1);
    }

    #[test]
    fn presents_drawn_frames() {
        // draw glyph 0 at (0, 0), then spin
        let program = words(&[0xD005, 0x1202]);
        let keyboard = TimedKeyboard::new(Duration::from_millis(100));
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let machine = interpreter.run_program(&program).unwrap();

        assert!(machine.cycles() > 0);
        assert_eq!(interpreter.display.frames.len(), 1);
        assert!(interpreter.display.frames[0].pixel(0, 0));
    }

    #[test]
    fn timers_run_while_waiting_for_a_key() {
        // DT = 0xFF, then wait for a key forever
        let program = words(&[0x60FF, 0xF015, 0xF10A]);
        let keyboard = TimedKeyboard::new(Duration::from_millis(200));
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let machine = interpreter.run_program(&program).unwrap();

        assert_eq!(machine.state().program_counter, 0x204);
        assert!(machine.state().delay_timer < 0xFF);
    }

    #[test]
    fn key_press_releases_the_wait() {
        let program = words(&[0xF10A, 0x1202]);
        let mut keyboard = TimedKeyboard::new(Duration::from_millis(50));
        keyboard.press = Some(0x7);
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let machine = interpreter.run_program(&program).unwrap();

        assert_eq!(machine.state().register(1), 0x7);
        assert_eq!(machine.state().program_counter, 0x202);
    }

    /// Takes longer per poll than an instruction cycle lasts.
    struct SlowKeyboard {
        started: Instant,
        polls: u64,
    }

    impl Chip8Keyboard for SlowKeyboard {
        fn update_keystates(&mut self, _: &mut Keypad, _: u64) -> io::Result<Control> {
            self.polls += 1;
            if self.started.elapsed() >= Duration::from_millis(200) {
                return Ok(Control::Quit);
            }
            thread::sleep(Duration::from_millis(10));
            Ok(Control::Continue)
        }
    }

    #[test]
    fn keypad_is_refreshed_for_every_cycle() {
        let keyboard = SlowKeyboard {
            started: Instant::now(),
            polls: 0,
        };
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let machine = interpreter.run_program(&words(&[0x1200])).unwrap();

        assert!(machine.cycles() > 0);
        assert!(interpreter.keyboard.polls >= machine.cycles());
    }

    #[test]
    fn fatal_errors_end_the_session() {
        let keyboard = TimedKeyboard::new(Duration::from_secs(5));
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let result = interpreter.run_program(&words(&[0x2200]));
        assert!(matches!(result, Err(MachineError::StackOverflow { .. })));
    }

    #[test]
    fn oversized_rom_never_starts() {
        let keyboard = TimedKeyboard::new(Duration::from_secs(5));
        let mut interpreter =
            Chip8Interpreter::new(Config::default(), RecordingDisplay::default(), keyboard, Mute);
        let result = interpreter.run_program(&vec![0; 4000]);
        assert!(matches!(result, Err(MachineError::RomTooLarge { size: 4000 })));
        assert_eq!(interpreter.keyboard.polls, 0);
    }
}
