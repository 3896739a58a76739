//! Per-minute appliance mode grid for one day.
//!
//! A [`StateMatrix`] only exists for routine sets that are conflict-free and
//! stay under the power ceiling at every minute. It is never mutated:
//! [`StateMatrix::add_routine`] builds a new matrix and leaves the receiver as
//! it was, so what-if probes can share one committed baseline.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Timelike;
use tracing::debug;

use crate::error::{
    InconsistentRoutinesError, IntegrityError, MaxPowerExceededError, ScheduleError,
};
use crate::model::{ApplianceId, Appliances, ModeId, ResolvedRoutine, Routine, RoutineId};

use super::budget::PowerBudget;
use super::clock::{self, MINUTES_PER_DAY};

/// Validated full-day projection of a routine set.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMatrix {
    appliances: Arc<Appliances>,
    routines: Vec<Routine>,
    budget: PowerBudget,
    /// Row-major `[minute][column]` mode ids.
    cells: Vec<ModeId>,
}

impl StateMatrix {
    /// Projects `routines` onto a day for the given appliance set.
    ///
    /// Construction checks references first, then scans every pair of enabled
    /// routines for conflicting actions, writes each enabled action into its
    /// appliance column, and finally checks every minute against the ceiling.
    ///
    /// # Arguments
    ///
    /// * `appliances` - Household inventory; its order fixes the column order
    /// * `routines` - Routines to project, disabled ones included
    /// * `max_power_w` - Ceiling on the summed draw (W)
    ///
    /// # Errors
    ///
    /// * [`ScheduleError::Integrity`] when an action names an unknown appliance or mode
    /// * [`ScheduleError::Inconsistent`] when two enabled routines conflict
    /// * [`ScheduleError::MaxPowerExceeded`] when some minute goes over the ceiling
    ///
    /// # Panics
    ///
    /// Panics if `max_power_w` is negative or NaN.
    pub fn new(
        appliances: impl Into<Arc<Appliances>>,
        routines: Vec<Routine>,
        max_power_w: f64,
    ) -> Result<Self, ScheduleError> {
        Self::build(appliances.into(), routines, PowerBudget::new(max_power_w))
    }

    fn build(
        appliances: Arc<Appliances>,
        routines: Vec<Routine>,
        budget: PowerBudget,
    ) -> Result<Self, ScheduleError> {
        match project(&appliances, &routines, budget) {
            Ok(cells) => {
                debug!(
                    routines = routines.len(),
                    appliances = appliances.len(),
                    "state matrix built"
                );
                Ok(Self {
                    appliances,
                    routines,
                    budget,
                    cells,
                })
            }
            Err(e) => {
                debug!(error = %e, "state matrix rejected");
                Err(e)
            }
        }
    }

    /// Builds a new matrix from this one's routines plus `routine`.
    ///
    /// The receiver is left untouched whatever the outcome.
    ///
    /// # Errors
    ///
    /// Same as [`StateMatrix::new`].
    pub fn add_routine(&self, routine: Routine) -> Result<Self, ScheduleError> {
        let mut routines = Vec::with_capacity(self.routines.len() + 1);
        routines.extend(self.routines.iter().cloned());
        routines.push(routine);
        Self::build(Arc::clone(&self.appliances), routines, self.budget)
    }

    pub fn appliances(&self) -> &Appliances {
        &self.appliances
    }

    pub fn routines(&self) -> &[Routine] {
        &self.routines
    }

    pub fn max_power_w(&self) -> f64 {
        self.budget.max_power_w()
    }

    pub fn budget(&self) -> PowerBudget {
        self.budget
    }

    /// Mode ids of every appliance at `minute`, in column order.
    ///
    /// Minutes past the end of the day wrap around.
    pub fn row(&self, minute: usize) -> &[ModeId] {
        let width = self.appliances.len();
        let start = (minute % MINUTES_PER_DAY) * width;
        &self.cells[start..start + width]
    }

    /// Mode the appliance is in at the minute containing `instant`.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::NotInInventory`] for an unknown appliance.
    pub fn mode(
        &self,
        appliance: ApplianceId,
        instant: impl Timelike,
    ) -> Result<ModeId, IntegrityError> {
        let col = self.column(appliance)?;
        Ok(self.row(clock::minute_of_day(&instant))[col])
    }

    /// The appliance's mode for each minute of the day.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::NotInInventory`] for an unknown appliance.
    pub fn timeline(&self, appliance: ApplianceId) -> Result<Vec<ModeId>, IntegrityError> {
        let col = self.column(appliance)?;
        Ok((0..MINUTES_PER_DAY).map(|m| self.row(m)[col]).collect())
    }

    /// Summed draw of all appliances at the minute containing `instant` (W).
    pub fn total_consumption(&self, instant: impl Timelike) -> f64 {
        self.total_at(clock::minute_of_day(&instant))
    }

    /// Summed draw of all appliances at `minute` (W).
    pub fn total_at(&self, minute: usize) -> f64 {
        row_power(&self.appliances, self.row(minute))
    }

    /// Draw of one appliance at the minute containing `instant` (W).
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::NotInInventory`] for an unknown appliance.
    pub fn consumption(
        &self,
        appliance: ApplianceId,
        instant: impl Timelike,
    ) -> Result<f64, IntegrityError> {
        let col = self.column(appliance)?;
        Ok(self.power_at(col, clock::minute_of_day(&instant)))
    }

    /// Draw of every appliance at the minute containing `instant` (W).
    pub fn consumptions(&self, instant: impl Timelike) -> BTreeMap<ApplianceId, f64> {
        let minute = clock::minute_of_day(&instant);
        self.appliances
            .iter()
            .enumerate()
            .map(|(col, a)| (a.id, self.power_at(col, minute)))
            .collect()
    }

    /// Draw of the appliance in column `col` at `minute` (W).
    pub fn power_at(&self, col: usize, minute: usize) -> f64 {
        match (self.appliances.at(col), self.row(minute).get(col)) {
            (Some(appliance), Some(&mode)) => appliance.power_of(mode),
            _ => 0.0,
        }
    }

    fn column(&self, appliance: ApplianceId) -> Result<usize, IntegrityError> {
        self.appliances
            .column(appliance)
            .ok_or(IntegrityError::NotInInventory(appliance))
    }
}

fn row_power(appliances: &Appliances, row: &[ModeId]) -> f64 {
    appliances
        .iter()
        .zip(row)
        .map(|(a, &mode)| a.power_of(mode))
        .sum()
}

/// Runs the reference check, conflict scan, projection and budget check.
fn project(
    appliances: &Appliances,
    routines: &[Routine],
    budget: PowerBudget,
) -> Result<Vec<ModeId>, ScheduleError> {
    let resolved = routines
        .iter()
        .map(|r| r.resolve(appliances))
        .collect::<Result<Vec<_>, IntegrityError>>()?;
    let enabled: Vec<&ResolvedRoutine<'_>> = resolved.iter().filter(|r| r.is_enabled()).collect();

    for (i, first) in enabled.iter().enumerate() {
        for second in &enabled[i + 1..] {
            if let Some((a, b)) = first.conflicting_actions(second) {
                return Err(InconsistentRoutinesError {
                    first: first.routine.id,
                    second: second.routine.id,
                    first_action: a.action.id,
                    second_action: b.action.id,
                    appliance: a.action.appliance_id,
                }
                .into());
            }
        }
    }

    let width = appliances.len();
    let mut cells = vec![ModeId::OFF; MINUTES_PER_DAY * width];
    for routine in &enabled {
        for action in &routine.actions {
            for minute in action.interval.start..action.interval.end {
                cells[minute * width + action.column] = action.mode.id;
            }
        }
    }

    for minute in 0..MINUTES_PER_DAY {
        let row = &cells[minute * width..(minute + 1) * width];
        let total = row_power(appliances, row);
        if !budget.within_limits(total) {
            return Err(MaxPowerExceededError {
                max_power: budget.max_power_w(),
                when: clock::time_of_minute(minute),
                total,
                routines: ranked_contributors(&enabled, minute),
            }
            .into());
        }
    }

    Ok(cells)
}

/// Routines drawing power at `minute`, highest draw first.
fn ranked_contributors(enabled: &[&ResolvedRoutine<'_>], minute: usize) -> Vec<RoutineId> {
    let mut draws: Vec<(RoutineId, f64)> = enabled
        .iter()
        .map(|r| (r.routine.id, r.power_at(minute)))
        .filter(|&(_, w)| w > 0.0)
        .collect();
    draws.sort_by(|a, b| b.1.total_cmp(&a.1));
    draws.into_iter().map(|(id, _)| id).collect()
}
