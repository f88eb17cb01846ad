use std::{
    io::{self, stdout, Stdout, Write},
    time::{Duration, Instant},
};

use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{self, Stylize},
    terminal,
};
use nibble8_core::{
    Chip8Beeper, Chip8Display, Chip8Keyboard, Control, Framebuffer, Keypad, KEY_COUNT,
};

/// Left-hand side of a qwerty keyboard, laid out like the COSMAC VIP keypad:
///
/// ```text
/// 1 2 3 4      1 2 3 C
/// q w e r  ->  4 5 6 D
/// a s d f      7 8 9 E
/// z x c v      A 0 B F
/// ```
const KEYMAP: [(char, u8); KEY_COUNT] = [
    ('x', 0x0),
    ('1', 0x1),
    ('2', 0x2),
    ('3', 0x3),
    ('q', 0x4),
    ('w', 0x5),
    ('e', 0x6),
    ('a', 0x7),
    ('s', 0x8),
    ('d', 0x9),
    ('z', 0xA),
    ('c', 0xB),
    ('4', 0xC),
    ('r', 0xD),
    ('f', 0xE),
    ('v', 0xF),
];

/// Most terminals only report presses, so a key counts as held for this long
/// after its last press or auto-repeat.
const KEY_HOLD: Duration = Duration::from_millis(150);

fn map_key(key: char) -> Option<u8> {
    let key = key.to_ascii_lowercase();
    KEYMAP
        .iter()
        .find(|(mapped, _)| *mapped == key)
        .map(|&(_, code)| code)
}

/// Raw mode and the alternate screen, restored on drop.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // nothing useful to do with a failure while tearing down
        let _ = execute!(stdout(), cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Two terminal cells per pixel so the picture keeps its aspect ratio.
pub struct TerminalDisplay {
    stdout: Stdout,
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self { stdout: stdout() }
    }
}

impl Chip8Display for TerminalDisplay {
    fn present(&mut self, frame: &Framebuffer) -> io::Result<()> {
        for (y, row) in frame.rows().enumerate() {
            let line: String = row
                .iter()
                .map(|&lit| if lit { "██" } else { "  " })
                .collect();
            queue!(
                self.stdout,
                cursor::MoveTo(0, y as u16),
                style::PrintStyledContent(line.yellow())
            )?;
        }
        self.stdout.flush()
    }
}

pub struct TerminalKeyboard {
    last_pressed: [Option<Instant>; KEY_COUNT],
}

impl Default for TerminalKeyboard {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalKeyboard {
    pub fn new() -> Self {
        Self {
            last_pressed: [None; KEY_COUNT],
        }
    }

    fn handle(&mut self, key: KeyEvent) -> Control {
        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Control::Quit
            }
            KeyCode::Char(c) => match map_key(c) {
                Some(code) => {
                    self.last_pressed[code as usize] = match key.kind {
                        KeyEventKind::Release => None,
                        KeyEventKind::Press | KeyEventKind::Repeat => Some(Instant::now()),
                    };
                }
                None => log::debug!("no keypad mapping for {c:?}"),
            },
            _ => {}
        }
        Control::Continue
    }
}

impl Chip8Keyboard for TerminalKeyboard {
    fn update_keystates(
        &mut self,
        keypad: &mut Keypad,
        budget_micros: u64,
    ) -> io::Result<Control> {
        let mut timeout = Duration::from_micros(budget_micros);
        while event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if self.handle(key) == Control::Quit {
                    return Ok(Control::Quit);
                }
            }
            timeout = Duration::ZERO;
        }

        for (code, pressed) in self.last_pressed.iter().enumerate() {
            let held = pressed.is_some_and(|at| at.elapsed() < KEY_HOLD);
            keypad.set(code as u8, held);
        }
        Ok(Control::Continue)
    }
}

/// Rings the terminal bell when the sound timer starts.
pub struct TerminalBell {
    stdout: Stdout,
}

impl Default for TerminalBell {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalBell {
    pub fn new() -> Self {
        Self { stdout: stdout() }
    }
}

impl Chip8Beeper for TerminalBell {
    fn play(&mut self) -> io::Result<()> {
        self.stdout.write_all(b"\x07")?;
        self.stdout.flush()
    }

    fn pause(&mut self) -> io::Result<()> {
        Ok(())
    }
}
