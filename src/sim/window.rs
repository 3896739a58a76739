use chrono::NaiveTime;

use super::clock::{self, MINUTES_PER_DAY};

/// Range of the day `[start_minute, end_minute)` in which the optimizer may
/// place a routine's start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    start_minute: usize,
    end_minute: usize,
}

impl ActivityWindow {
    pub fn full_day() -> Self {
        Self {
            start_minute: 0,
            end_minute: MINUTES_PER_DAY,
        }
    }

    /// Window from `start` to `end`. An `end` of 00:00 means midnight at the
    /// close of the day.
    ///
    /// Returns `None` when the window would be empty.
    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Option<Self> {
        let start_minute = clock::minute_of_day(&start);
        let end_minute = match clock::minute_of_day(&end) {
            0 => MINUTES_PER_DAY,
            m => m,
        };
        (start_minute < end_minute).then_some(Self {
            start_minute,
            end_minute,
        })
    }

    pub fn start_minute(&self) -> usize {
        self.start_minute
    }

    pub fn end_minute(&self) -> usize {
        self.end_minute
    }

    /// Returns `true` when `minute` falls within the window.
    pub fn contains(&self, minute: usize) -> bool {
        minute >= self.start_minute && minute < self.end_minute
    }
}

impl Default for ActivityWindow {
    fn default() -> Self {
        Self::full_day()
    }
}
