//! Tariff-aware start-time search for a single routine.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::{debug, info};

use crate::error::ScheduleError;
use crate::model::{Routine, RoutineId};

use super::clock;
use super::state_matrix::StateMatrix;
use super::tariff::TariffMatrix;
use super::window::ActivityWindow;

/// Costs within this distance count as equal.
const COST_EPSILON: f64 = 1e-9;

/// A cheaper feasible start time for a routine.
#[derive(Debug, Clone, PartialEq)]
pub struct StartTimeRecommendation {
    pub routine: RoutineId,
    /// Start time the routine asked for.
    pub requested: NaiveTime,
    /// Recommended start time.
    pub start: NaiveTime,
    pub requested_cost: f64,
    pub cost: f64,
    /// `requested_cost - cost`, always positive.
    pub savings: f64,
}

impl fmt::Display for StartTimeRecommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "routine {}: start at {} instead of {} (cost {:.2} -> {:.2}, saves {:.2})",
            self.routine,
            self.start.format("%H:%M"),
            self.requested.format("%H:%M"),
            self.requested_cost,
            self.cost,
            self.savings
        )
    }
}

/// Greedy search for a cheaper start time against a committed matrix.
///
/// Only starts at or after the requested time are considered.
#[derive(Debug, Clone, Copy)]
pub struct RoutineOptimizer<'a> {
    matrix: &'a StateMatrix,
    tariff: &'a TariffMatrix,
    window: ActivityWindow,
    date: NaiveDate,
}

impl<'a> RoutineOptimizer<'a> {
    /// Creates an optimizer pricing starts on `date` over the whole day.
    pub fn new(matrix: &'a StateMatrix, tariff: &'a TariffMatrix, date: NaiveDate) -> Self {
        Self {
            matrix,
            tariff,
            window: ActivityWindow::full_day(),
            date,
        }
    }

    /// Restricts candidate starts to `window`.
    #[must_use]
    pub fn with_window(mut self, window: ActivityWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> ActivityWindow {
        self.window
    }

    /// Tariff cost of running `routine` from `minute`, summed over its timed
    /// actions. `durations` are the timed actions' run lengths.
    fn cost_at(&self, durations: &[u32], minute: usize) -> f64 {
        let start = self.instant(minute);
        durations
            .iter()
            .map(|&d| self.tariff.get_duration_cost(start, d))
            .sum()
    }

    fn instant(&self, minute: usize) -> NaiveDateTime {
        self.date.and_time(clock::time_of_minute(minute))
    }

    /// Finds the cheapest feasible start for `routine` that is strictly
    /// cheaper than its requested start.
    ///
    /// Candidates are visited in ascending cost order, lower minutes first on
    /// ties. The walk stops at the first candidate that is not cheaper than
    /// the requested start; otherwise the first candidate the committed
    /// matrix accepts wins. Routines without timed actions get no
    /// recommendation.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Integrity`] when the routine references an
    /// appliance or mode the household does not have. Conflicts and budget
    /// violations of individual candidates are skipped.
    pub fn find_best_start_time(
        &self,
        routine: &Routine,
    ) -> Result<Option<StartTimeRecommendation>, ScheduleError> {
        let resolved = routine.resolve(self.matrix.appliances())?;
        let durations: Vec<u32> = resolved
            .actions
            .iter()
            .filter_map(|a| a.action.effective_duration(a.mode))
            .collect();
        let Some(&longest) = durations.iter().max() else {
            debug!(routine = %routine.id, "no timed actions, nothing to price");
            return Ok(None);
        };

        let requested = routine.start_minute();
        let first = self.window.start_minute().max(requested);
        let Some(latest) = self.window.end_minute().checked_sub(longest as usize) else {
            return Ok(None);
        };
        if first > latest {
            debug!(routine = %routine.id, first, latest, "no room left in the activity window");
            return Ok(None);
        }

        let requested_cost = self.cost_at(&durations, requested);
        let mut candidates: Vec<(usize, f64)> = (first..=latest)
            .map(|m| (m, self.cost_at(&durations, m)))
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (minute, cost) in candidates {
            if cost >= requested_cost - COST_EPSILON {
                break;
            }
            match self.matrix.add_routine(routine.with_start(minute)) {
                Ok(_) => {
                    let rec = StartTimeRecommendation {
                        routine: routine.id,
                        requested: routine.when,
                        start: clock::time_of_minute(minute),
                        requested_cost,
                        cost,
                        savings: requested_cost - cost,
                    };
                    info!(%rec, "found cheaper start time");
                    return Ok(Some(rec));
                }
                Err(e) if e.is_infeasible() => {
                    debug!(routine = %routine.id, minute, error = %e, "candidate rejected");
                }
                Err(e) => return Err(e),
            }
        }

        debug!(routine = %routine.id, requested_cost, "requested start is already the cheapest");
        Ok(None)
    }
}
