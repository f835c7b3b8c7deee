//! Pausable stopwatch tracking the elapsed judging time.
//!
//! The clock is a plain value embedded in the options record. It keeps two
//! integer registers plus a flag: `start_time` is the epoch timestamp of the
//! last resume and `pause_time` holds the running duration accumulated up to
//! the last pause. Every operation has an `*_at` variant taking an explicit
//! timestamp so callers (and tests) can drive it deterministically.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

/// Stopwatch state persisted inside the options record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClockState {
    /// Epoch milliseconds of the last resume; 0 when never started.
    pub start_time: i64,
    /// Running duration (milliseconds) accumulated as of the last pause.
    pub pause_time: i64,
    /// Whether the clock is currently running.
    pub running: bool,
}

impl ClockState {
    /// Fresh clock in the stopped state with no accumulated time.
    pub const fn new() -> Self {
        Self {
            start_time: 0,
            pause_time: 0,
            running: false,
        }
    }

    /// Stop the clock, folding the time since the last resume into the total.
    pub fn pause(&mut self) {
        self.pause_at(now_millis());
    }

    /// [`ClockState::pause`] with an explicit timestamp.
    pub fn pause_at(&mut self, now: i64) {
        if !self.running {
            return;
        }
        self.running = false;
        self.pause_time = self.pause_time.saturating_add(self.elapsed_since_start(now));
    }

    /// Start the clock again, keeping the accumulated total.
    pub fn resume(&mut self) {
        self.resume_at(now_millis());
    }

    /// [`ClockState::resume`] with an explicit timestamp.
    pub fn resume_at(&mut self, now: i64) {
        if self.running {
            return;
        }
        self.running = true;
        self.start_time = now;
    }

    /// Return to the initial stopped state, whatever the current registers hold.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Total running time in milliseconds.
    pub fn duration(&self) -> i64 {
        self.duration_at(now_millis())
    }

    /// [`ClockState::duration`] evaluated at `now`.
    pub fn duration_at(&self, now: i64) -> i64 {
        if !self.running {
            return self.pause_time;
        }
        self.pause_time.saturating_add(self.elapsed_since_start(now))
    }

    fn elapsed_since_start(&self, now: i64) -> i64 {
        // A timestamp from before the resume (skewed host) counts as no progress.
        now.saturating_sub(self.start_time).max(0)
    }
}
