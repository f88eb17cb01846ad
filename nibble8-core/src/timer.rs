use std::time::Duration;

use crate::TIMER_HZ;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Converts elapsed time into a whole number of ticks at a fixed frequency.
///
/// Ticks are derived from the total elapsed time rather than accumulated per
/// interval, so rounding never drifts: after exactly one second a 60 Hz timer
/// has produced exactly 60 ticks however the second was sliced.
#[derive(Debug, Clone)]
pub struct Timer {
    hz: u32,
    elapsed: Duration,
    fired: u128,
}

impl Timer {
    pub fn new(hz: u32) -> Self {
        Self {
            hz: hz.max(1),
            elapsed: Duration::ZERO,
            fired: 0,
        }
    }

    /// Ticks that fell due during `dt`.
    pub fn advance(&mut self, dt: Duration) -> u32 {
        self.elapsed += dt;
        let due = self.elapsed.as_nanos() * self.hz as u128 / NANOS_PER_SECOND;
        let ticks = due - self.fired;
        self.fired = due;
        ticks.min(u32::MAX as u128) as u32
    }

    /// Time left until the next tick.
    pub fn until_next(&self) -> Duration {
        let next = (self.fired + 1) * NANOS_PER_SECOND;
        let next_nanos = next.div_ceil(self.hz as u128);
        let next_at = Duration::from_nanos(next_nanos.min(u64::MAX as u128) as u64);
        next_at.saturating_sub(self.elapsed)
    }
}

/// Work that fell due during one [`Scheduler::advance`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Due {
    pub cycles: u32,
    pub timer_ticks: u32,
}

/// Runs the instruction clock and the 60 Hz timer clock side by side.
#[derive(Debug, Clone)]
pub struct Scheduler {
    cpu: Timer,
    timers: Timer,
}

impl Scheduler {
    pub fn new(clock_hz: u32) -> Self {
        Self {
            cpu: Timer::new(clock_hz),
            timers: Timer::new(TIMER_HZ),
        }
    }

    pub fn advance(&mut self, dt: Duration) -> Due {
        Due {
            cycles: self.cpu.advance(dt),
            timer_ticks: self.timers.advance(dt),
        }
    }

    /// How long the caller can wait before either clock fires.
    pub fn until_next(&self) -> Duration {
        self.cpu.until_next().min(self.timers.until_next())
    }
}
