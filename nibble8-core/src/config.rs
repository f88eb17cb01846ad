use crate::DEFAULT_CLOCK_HZ;

/// Behaviour switches for ROMs written against other CHIP-8 interpreters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// `8xy6`/`8xyE` shift `Vy` into `Vx` instead of shifting `Vx` in place.
    pub shift_reads_vy: bool,
    /// `Bnnn` jumps to `V0 + nnn` instead of loading it into `I`.
    pub jump_with_offset: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Instruction cycles per second.
    pub clock_hz: u32,
    /// Report unknown opcodes as errors instead of skipping them.
    pub strict: bool,
    /// Seed for `Cxkk`. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub quirks: Quirks,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            strict: false,
            seed: None,
            quirks: Quirks::default(),
        }
    }
}

impl Config {
    pub fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz.max(1);
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_quirks(mut self, quirks: Quirks) -> Self {
        self.quirks = quirks;
        self
    }
}
