//! Round countdown.

use std::time::Duration;

pub const TICK: Duration = Duration::from_secs(1);
pub const MIN_ROUND_SECS: u32 = 30;
pub const SECS_PER_CARD: u32 = 3;

/// Seconds on the clock when a round with `total_cards` cards starts.
pub fn starting_time(total_cards: usize) -> u32 {
    let per_cards = u32::try_from(total_cards).unwrap_or(u32::MAX).saturating_mul(SECS_PER_CARD);
    per_cards.max(MIN_ROUND_SECS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Running(u32),
    /// Reached zero on this tick. Reported exactly once.
    Expired,
    Stopped,
}

#[derive(Debug)]
pub struct RoundTimer {
    remaining: u32,
    stopped: bool,
}

impl RoundTimer {
    pub fn for_cards(total_cards: usize) -> Self {
        Self { remaining: starting_time(total_cards), stopped: false }
    }

    pub fn remaining(&self) -> u32 { self.remaining }

    pub fn tick(&mut self) -> Tick {
        if self.stopped {
            return Tick::Stopped;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.stopped = true;
            Tick::Expired
        } else {
            Tick::Running(self.remaining)
        }
    }

    pub fn stop(&mut self) { self.stopped = true; }
}
