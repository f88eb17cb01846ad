use log::{debug, trace, warn};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::{
    Chip8State, Config, Control, Due, Framebuffer, Instruction, Keypad, MachineError, Opcode,
    Result,
};

/// What a single [`Machine::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Executed(Instruction),
    /// `Fx0A` found no key down. The program counter did not move, the next
    /// step polls again.
    WaitingForKey,
    /// Unknown opcode skipped in permissive mode.
    Ignored(Opcode),
}

/// Where the program counter goes once an instruction has run.
enum Flow {
    Next,
    Skip,
    Jump(u16),
    Hold,
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

/// A CHIP-8 machine: state, configuration and its random source.
pub struct Machine {
    state: Chip8State,
    config: Config,
    rng: StdRng,
    cycles: u64,
    waiting_for_key: bool,
}

impl Machine {
    pub fn new(config: Config) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: Chip8State::default(),
            config,
            rng,
            cycles: 0,
            waiting_for_key: false,
        }
    }

    pub fn with_program(program: &[u8], config: Config) -> Result<Self> {
        let mut machine = Self::new(config);
        machine.state.load_program(program)?;
        Ok(machine)
    }

    pub fn state(&self) -> &Chip8State {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut Chip8State {
        &mut self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn display(&self) -> &Framebuffer {
        &self.state.display
    }

    /// Whether the display changed since the last call.
    pub fn take_display_dirty(&mut self) -> bool {
        self.state.display.take_dirty()
    }

    pub fn keypad_mut(&mut self) -> &mut Keypad {
        &mut self.state.keypad
    }

    pub fn sound_active(&self) -> bool {
        self.state.sound_active()
    }

    /// Instruction cycles run so far, including key-wait polls.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn tick_timers(&mut self) {
        self.state.tick_timers();
    }

    /// One fetch-decode-execute cycle.
    pub fn step(&mut self) -> Result<Step> {
        let pc = self.state.program_counter;
        let opcode = Opcode(self.state.fetch_word());
        let instruction = Instruction::decode(opcode);
        self.cycles += 1;

        trace!("{pc:#05X}  {opcode:04X}  {instruction}");

        if let Instruction::Unknown { .. } = instruction {
            if self.config.strict {
                debug!("halting on unknown opcode {opcode:04X} at {pc:#05X}");
                return Err(MachineError::UnimplementedOpcode { opcode, pc });
            }
            warn!("ignoring unknown opcode {opcode:04X} at {pc:#05X}");
            self.state.program_counter = pc.wrapping_add(2);
            return Ok(Step::Ignored(opcode));
        }

        let flow = self.execute(instruction, pc).inspect_err(|error| {
            debug!("{instruction} at {pc:#05X} failed: {error}");
        })?;

        self.state.program_counter = match flow {
            Flow::Next => pc.wrapping_add(2),
            Flow::Skip => pc.wrapping_add(4),
            Flow::Jump(address) => address,
            Flow::Hold => pc,
        };

        Ok(match flow {
            Flow::Hold => Step::WaitingForKey,
            _ => Step::Executed(instruction),
        })
    }

    /// Runs the work of one scheduler slice, spreading the timer ticks evenly
    /// between the instruction cycles.
    pub fn run_due(&mut self, due: Due) -> Result<()> {
        self.run_due_with(due, |_| Ok(Control::Continue))?;
        Ok(())
    }

    /// [`Machine::run_due`] with `refresh` handed the keypad before every
    /// cycle but the first, which runs on the caller's own poll. Returns
    /// early once `refresh` asks to quit.
    pub fn run_due_with<F>(&mut self, due: Due, mut refresh: F) -> Result<Control>
    where
        F: FnMut(&mut Keypad) -> Result<Control>,
    {
        let Due {
            cycles,
            timer_ticks,
        } = due;

        if cycles == 0 {
            (0..timer_ticks).for_each(|_| self.tick_timers());
            return Ok(Control::Continue);
        }

        let mut ticked = 0;
        for cycle in 1..=cycles {
            if cycle > 1 && refresh(&mut self.state.keypad)? == Control::Quit {
                return Ok(Control::Quit);
            }
            self.step()?;
            let ticks_so_far = (cycle as u64 * timer_ticks as u64 / cycles as u64) as u32;
            while ticked < ticks_so_far {
                self.tick_timers();
                ticked += 1;
            }
        }
        Ok(Control::Continue)
    }

    fn execute(&mut self, instruction: Instruction, pc: u16) -> Result<Flow> {
        use Instruction::*;

        let state = &mut self.state;

        let flow = match instruction {
            Clear => {
                state.display.clear();
                Flow::Next
            }
            Return => Flow::Jump(state.pop_return()?),
            Jump { nnn } => Flow::Jump(nnn),
            Call { nnn } => {
                state.push_return(pc.wrapping_add(2))?;
                Flow::Jump(nnn)
            }
            SkipIfEqualByte { x, kk } => Flow::skip_if(state.register(x) == kk),
            SkipIfNotEqualByte { x, kk } => Flow::skip_if(state.register(x) != kk),
            SkipIfEqual { x, y } => Flow::skip_if(state.register(x) == state.register(y)),
            SkipIfNotEqual { x, y } => Flow::skip_if(state.register(x) != state.register(y)),
            LoadByte { x, kk } => {
                *state.register_mut(x) = kk;
                Flow::Next
            }
            AddByte { x, kk } => {
                *state.register_mut(x) = state.register(x).wrapping_add(kk);
                Flow::Next
            }
            Load { x, y } => {
                *state.register_mut(x) = state.register(y);
                Flow::Next
            }
            Or { x, y } => {
                *state.register_mut(x) |= state.register(y);
                Flow::Next
            }
            And { x, y } => {
                *state.register_mut(x) &= state.register(y);
                Flow::Next
            }
            Xor { x, y } => {
                *state.register_mut(x) ^= state.register(y);
                Flow::Next
            }
            // Flag-setting arithmetic reads both operands first and writes VF
            // last, so VF as a destination ends up holding the flag.
            Add { x, y } => {
                let (result, carry) = state.register(x).overflowing_add(state.register(y));
                *state.register_mut(x) = result;
                state.set_flag(carry);
                Flow::Next
            }
            Sub { x, y } => {
                let (vx, vy) = (state.register(x), state.register(y));
                *state.register_mut(x) = vx.wrapping_sub(vy);
                state.set_flag(vx > vy);
                Flow::Next
            }
            SubReversed { x, y } => {
                let (vx, vy) = (state.register(x), state.register(y));
                *state.register_mut(x) = vy.wrapping_sub(vx);
                state.set_flag(vy > vx);
                Flow::Next
            }
            ShiftRight { x, y } => {
                let source = state.register(if self.config.quirks.shift_reads_vy { y } else { x });
                *state.register_mut(x) = source >> 1;
                state.set_flag(source & 0x01 != 0);
                Flow::Next
            }
            ShiftLeft { x, y } => {
                let source = state.register(if self.config.quirks.shift_reads_vy { y } else { x });
                *state.register_mut(x) = source << 1;
                state.set_flag(source & 0x80 != 0);
                Flow::Next
            }
            LoadIndex { nnn } => {
                state.index_register = nnn;
                Flow::Next
            }
            OffsetByV0 { nnn } => {
                let target = nnn + state.register(0x0) as u16;
                if self.config.quirks.jump_with_offset {
                    Flow::Jump(target)
                } else {
                    state.index_register = target;
                    Flow::Next
                }
            }
            Random { x, kk } => {
                *state.register_mut(x) = self.rng.gen::<u8>() & kk;
                Flow::Next
            }
            Draw { x, y, n } => {
                let sprite = state.read_slice(state.index_register, n as usize);
                let (vx, vy) = (state.register(x), state.register(y));
                let erased = state.display.draw_sprite(vx, vy, &sprite);
                state.set_flag(erased);
                Flow::Next
            }
            SkipIfKey { x } => Flow::skip_if(state.keypad.is_key_down(state.register(x))),
            SkipIfNotKey { x } => Flow::skip_if(!state.keypad.is_key_down(state.register(x))),
            LoadDelay { x } => {
                *state.register_mut(x) = state.delay_timer;
                Flow::Next
            }
            WaitKey { x } => match state.keypad.first_pressed() {
                Some(key) => {
                    if self.waiting_for_key {
                        debug!("key {key:X} pressed, resuming at {pc:#05X}");
                        self.waiting_for_key = false;
                    }
                    *state.register_mut(x) = key;
                    Flow::Next
                }
                None => {
                    if !self.waiting_for_key {
                        debug!("waiting for a key press at {pc:#05X}");
                        self.waiting_for_key = true;
                    }
                    Flow::Hold
                }
            },
            SetDelay { x } => {
                state.delay_timer = state.register(x);
                Flow::Next
            }
            SetSound { x } => {
                state.sound_timer = state.register(x);
                Flow::Next
            }
            AddIndex { x } => {
                state.index_register = state.index_register.wrapping_add(state.register(x) as u16);
                Flow::Next
            }
            Glyph { x } => {
                state.index_register = state.glyph_address(state.register(x));
                Flow::Next
            }
            Bcd { x } => {
                let value = state.register(x);
                let i = state.index_register;
                state.write(i, value / 100);
                state.write(i.wrapping_add(1), value / 10 % 10);
                state.write(i.wrapping_add(2), value % 10);
                Flow::Next
            }
            StoreRegisters { x } => {
                for register in 0..=x {
                    let address = state.index_register.wrapping_add(register as u16);
                    state.write(address, state.register(register));
                }
                Flow::Next
            }
            LoadRegisters { x } => {
                for register in 0..=x {
                    let address = state.index_register.wrapping_add(register as u16);
                    *state.register_mut(register) = state.read(address);
                }
                Flow::Next
            }
            Unknown { .. } => Flow::Next,
        };

        Ok(flow)
    }
}
