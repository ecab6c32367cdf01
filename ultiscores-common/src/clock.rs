use crate::game_snapshot::{GameSnapshot, ServerClock};
use derivative::Derivative;
use serde::Serialize;
use std::time::Duration;
use time::OffsetDateTime;

const TENTHS_PER_SEC: i64 = 10;

/// Local estimate of the game clock, as of the last resync.
///
/// The value is always replaced as a whole, never updated field by field, so
/// anyone holding a copy sees a consistent checkpoint.
#[derive(Derivative, Serialize)]
#[derivative(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ClockState {
    /// Game seconds elapsed at `reference_wall_clock_secs`
    pub accumulated_secs: i64,
    pub reference_wall_clock_secs: i64,
    #[derivative(Default(value = "true"))]
    pub stopped: bool,
}

impl ClockState {
    pub fn from_server(clock: &ServerClock) -> Self {
        Self {
            accumulated_secs: ceil_tenths(clock.elapsed_tenths),
            reference_wall_clock_secs: round_tenths(clock.stopwatch_timestamp_tenths),
            // Without a stop flag there is nothing to extrapolate from safely
            stopped: clock.is_stopped.unwrap_or(true),
        }
    }

    /// Game seconds elapsed at wall clock second `now`
    pub fn elapsed_at(&self, now: i64) -> i64 {
        if self.stopped {
            self.accumulated_secs
        } else {
            self.accumulated_secs + (now - self.reference_wall_clock_secs)
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClockSynchronizer {
    total_secs: i64,
    state: ClockState,
}

impl ClockSynchronizer {
    pub fn new(game_duration: Duration) -> Self {
        Self {
            total_secs: i64::try_from(game_duration.as_secs()).unwrap_or(i64::MAX),
            state: ClockState::default(),
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Replaces the local clock with the checkpoint in `snapshot`. Returns
    /// `false`, leaving the clock alone, if the server has not started timing.
    pub fn resync(&mut self, snapshot: &GameSnapshot) -> bool {
        match &snapshot.clock {
            Some(clock) => {
                self.state = ClockState::from_server(clock);
                true
            }
            None => false,
        }
    }

    pub fn remaining_at(&self, now: i64) -> u64 {
        let remaining = self.total_secs.saturating_sub(self.state.elapsed_at(now));
        u64::try_from(remaining).unwrap_or(0)
    }

    pub fn render(&self, now: i64) -> String {
        format_clock(self.remaining_at(now))
    }

    /// The server has stopped the clock and no time is left
    pub fn is_finished(&self, now: i64) -> bool {
        self.state.stopped && self.remaining_at(now) == 0
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn ceil_tenths(tenths: i64) -> i64 {
    tenths.div_euclid(TENTHS_PER_SEC) + i64::from(tenths.rem_euclid(TENTHS_PER_SEC) != 0)
}

// Ties go to the even second
fn round_tenths(tenths: i64) -> i64 {
    let secs = tenths.div_euclid(TENTHS_PER_SEC);
    let rem = tenths.rem_euclid(TENTHS_PER_SEC);
    if rem > 5 || (rem == 5 && secs.rem_euclid(2) == 1) {
        secs + 1
    } else {
        secs
    }
}

pub trait WallClock {
    /// Whole seconds since the unix epoch, rounded to the nearest second
    fn now_secs(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now_secs(&self) -> i64 {
        let now = OffsetDateTime::now_utc();
        now.unix_timestamp() + i64::from(now.nanosecond() >= 500_000_000)
    }
}
