//! Routines: named bundles of appliance-mode assignments starting at one time of day.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;
use crate::sim::clock::{self, MINUTES_PER_DAY};

use super::appliance::{Appliances, OperationMode};
use super::id::{ActionId, ApplianceId, ModeId, RoutineId};

/// Half-open minute range `[start, end)` within a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionInterval {
    pub start: usize,
    pub end: usize,
}

impl ActionInterval {
    /// Interval starting at minute `start` and lasting `duration` minutes.
    ///
    /// Open-ended runs (`None`) and runs past midnight stop at the end of the day.
    pub fn new(start: usize, duration: Option<u32>) -> Self {
        let start = start.min(MINUTES_PER_DAY);
        let end = duration.map_or(MINUTES_PER_DAY, |d| {
            (start + d as usize).min(MINUTES_PER_DAY)
        });
        Self { start, end }
    }

    pub fn contains(&self, minute: usize) -> bool {
        minute >= self.start && minute < self.end
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One appliance-mode assignment inside a routine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutineAction {
    pub id: ActionId,
    pub appliance_id: ApplianceId,
    pub mode_id: ModeId,
    /// Run length in minutes; falls back to the mode's default duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

impl RoutineAction {
    pub fn new(id: u32, appliance_id: u32, mode_id: u32, duration: Option<u32>) -> Self {
        Self {
            id: ActionId(id),
            appliance_id: ApplianceId(appliance_id),
            mode_id: ModeId(mode_id),
            duration,
        }
    }

    /// Explicit duration, else the mode's default, else `None` (open-ended).
    pub fn effective_duration(&self, mode: &OperationMode) -> Option<u32> {
        self.duration.or(mode.default_duration)
    }
}

/// A schedulable bundle of actions that all start at [`Routine::when`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Routine {
    pub id: RoutineId,
    pub name: String,
    /// Start time of day.
    #[serde(with = "clock::hhmm")]
    pub when: NaiveTime,
    #[serde(default)]
    pub actions: Vec<RoutineAction>,
    /// Disabled routines never take part in projections.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Routine {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        when: NaiveTime,
        actions: Vec<RoutineAction>,
    ) -> Self {
        Self {
            id: RoutineId(id),
            name: name.into(),
            when,
            actions,
            enabled: true,
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Minute of the day the routine starts at.
    pub fn start_minute(&self) -> usize {
        clock::minute_of_day(&self.when)
    }

    /// Copy of this routine moved to start at `minute`.
    #[must_use]
    pub fn with_start(&self, minute: usize) -> Self {
        Self {
            when: clock::time_of_minute(minute),
            ..self.clone()
        }
    }

    /// Resolves every action against the appliance inventory.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrityError`] when an action names an appliance or mode
    /// that does not exist.
    pub fn resolve<'a>(
        &'a self,
        appliances: &'a Appliances,
    ) -> Result<ResolvedRoutine<'a>, IntegrityError> {
        let start = self.start_minute();
        let actions = self
            .actions
            .iter()
            .map(|action| -> Result<ResolvedAction<'a>, IntegrityError> {
                let column = appliances.column(action.appliance_id).ok_or(
                    IntegrityError::UnknownAppliance {
                        routine: self.id,
                        appliance: action.appliance_id,
                    },
                )?;
                let mode = appliances
                    .at(column)
                    .and_then(|a| a.mode(action.mode_id))
                    .ok_or(IntegrityError::UnknownMode {
                        routine: self.id,
                        appliance: action.appliance_id,
                        mode: action.mode_id,
                    })?;
                Ok(ResolvedAction {
                    action,
                    column,
                    mode,
                    interval: ActionInterval::new(start, action.effective_duration(mode)),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResolvedRoutine {
            routine: self,
            actions,
        })
    }

    /// First pair of actions (self's, other's) that drive the same appliance
    /// into different modes over overlapping minutes.
    ///
    /// Always `None` when either routine is disabled.
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrityError`] when either routine references unknown
    /// appliances or modes.
    pub fn conflicting_actions<'a>(
        &'a self,
        other: &'a Routine,
        appliances: &'a Appliances,
    ) -> Result<Option<(&'a RoutineAction, &'a RoutineAction)>, IntegrityError> {
        let mine = self.resolve(appliances)?;
        let theirs = other.resolve(appliances)?;
        Ok(mine
            .conflicting_actions(&theirs)
            .map(|(a, b)| (a.action, b.action)))
    }

    /// Power the routine itself draws at `minute` (W).
    ///
    /// # Errors
    ///
    /// Returns an [`IntegrityError`] for unknown appliance or mode references.
    pub fn power_at(&self, minute: usize, appliances: &Appliances) -> Result<f64, IntegrityError> {
        Ok(self.resolve(appliances)?.power_at(minute))
    }
}

/// A routine action bound to its appliance column, mode and minute interval.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedAction<'a> {
    pub action: &'a RoutineAction,
    /// State matrix column of the target appliance.
    pub column: usize,
    pub mode: &'a OperationMode,
    pub interval: ActionInterval,
}

impl ResolvedAction<'_> {
    /// Same appliance, different modes, overlapping minutes.
    pub fn conflicts_with(&self, other: &ResolvedAction<'_>) -> bool {
        self.column == other.column
            && self.mode.id != other.mode.id
            && self.interval.overlaps(&other.interval)
    }

    /// Whether the action has a finite run length.
    pub fn is_timed(&self) -> bool {
        self.action.effective_duration(self.mode).is_some()
    }
}

/// A routine whose actions have all been resolved against the inventory.
#[derive(Debug, Clone)]
pub struct ResolvedRoutine<'a> {
    pub routine: &'a Routine,
    pub actions: Vec<ResolvedAction<'a>>,
}

impl<'a> ResolvedRoutine<'a> {
    pub fn is_enabled(&self) -> bool {
        self.routine.enabled
    }

    pub fn conflicting_actions<'b>(
        &'b self,
        other: &'b ResolvedRoutine<'a>,
    ) -> Option<(&'b ResolvedAction<'a>, &'b ResolvedAction<'a>)> {
        if !self.is_enabled() || !other.is_enabled() {
            return None;
        }
        self.actions.iter().find_map(|mine| {
            other
                .actions
                .iter()
                .find(|theirs| mine.conflicts_with(theirs))
                .map(|theirs| (mine, theirs))
        })
    }

    /// Sum of the draws of every action active at `minute` (W).
    pub fn power_at(&self, minute: usize) -> f64 {
        if !self.is_enabled() {
            return 0.0;
        }
        self.actions
            .iter()
            .filter(|a| a.interval.contains(minute))
            .map(|a| a.mode.power_consumption)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Appliance;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn inventory() -> Appliances {
        Appliances::new(vec![
            Appliance::new(
                0,
                "washer",
                vec![
                    OperationMode::off(),
                    OperationMode::new(1, "wash", 2000.0).with_default_duration(90),
                    OperationMode::new(2, "rinse", 500.0).with_default_duration(20),
                ],
            ),
            Appliance::new(
                1,
                "heater",
                vec![OperationMode::off(), OperationMode::new(1, "on", 1500.0)],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn interval_clamps_to_end_of_day() {
        let i = ActionInterval::new(1400, Some(90));
        assert_eq!(i.end, MINUTES_PER_DAY);
        assert_eq!(i.len(), 40);
    }

    #[test]
    fn open_ended_interval_runs_to_end_of_day() {
        let i = ActionInterval::new(600, None);
        assert_eq!(i, ActionInterval { start: 600, end: MINUTES_PER_DAY });
    }

    #[test]
    fn intervals_touching_at_boundary_do_not_overlap() {
        let a = ActionInterval::new(540, Some(90));
        let b = ActionInterval::new(630, Some(10));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&ActionInterval::new(629, Some(1))));
    }

    #[test]
    fn zero_length_interval_is_empty() {
        let i = ActionInterval::new(100, Some(0));
        assert!(i.is_empty());
        assert!(!i.contains(100));
    }

    #[test]
    fn effective_duration_prefers_explicit_value() {
        let mode = OperationMode::new(1, "wash", 2000.0).with_default_duration(90);
        assert_eq!(RoutineAction::new(0, 0, 1, Some(30)).effective_duration(&mode), Some(30));
        assert_eq!(RoutineAction::new(0, 0, 1, None).effective_duration(&mode), Some(90));
        let open = OperationMode::new(1, "on", 1500.0);
        assert_eq!(RoutineAction::new(0, 1, 1, None).effective_duration(&open), None);
    }

    #[test]
    fn detects_conflicting_modes_on_same_appliance() {
        let set = inventory();
        let wash = Routine::new(1, "wash", at(9, 0), vec![RoutineAction::new(0, 0, 1, None)]);
        let rinse = Routine::new(2, "rinse", at(10, 0), vec![RoutineAction::new(0, 0, 2, None)]);
        let pair = wash.conflicting_actions(&rinse, &set).unwrap();
        assert!(pair.is_some());
    }

    #[test]
    fn same_mode_is_not_a_conflict() {
        let set = inventory();
        let a = Routine::new(1, "a", at(9, 0), vec![RoutineAction::new(0, 0, 1, None)]);
        let b = Routine::new(2, "b", at(9, 30), vec![RoutineAction::new(0, 0, 1, None)]);
        assert!(a.conflicting_actions(&b, &set).unwrap().is_none());
    }

    #[test]
    fn disabled_routine_never_conflicts() {
        let set = inventory();
        let a = Routine::new(1, "a", at(9, 0), vec![RoutineAction::new(0, 0, 1, None)]);
        let b = Routine::new(2, "b", at(9, 30), vec![RoutineAction::new(0, 0, 2, None)]).disabled();
        assert!(a.conflicting_actions(&b, &set).unwrap().is_none());
        assert_eq!(b.power_at(9 * 60 + 35, &set).unwrap(), 0.0);
    }

    #[test]
    fn power_at_sums_active_actions() {
        let set = inventory();
        let r = Routine::new(
            1,
            "morning",
            at(7, 0),
            vec![RoutineAction::new(0, 0, 1, Some(30)), RoutineAction::new(1, 1, 1, None)],
        );
        assert_eq!(r.power_at(7 * 60, &set).unwrap(), 3500.0);
        assert_eq!(r.power_at(7 * 60 + 30, &set).unwrap(), 1500.0);
        assert_eq!(r.power_at(6 * 60 + 59, &set).unwrap(), 0.0);
    }

    #[test]
    fn resolve_reports_unknown_references() {
        let set = inventory();
        let ghost = Routine::new(4, "ghost", at(8, 0), vec![RoutineAction::new(0, 9, 1, None)]);
        assert!(matches!(
            ghost.resolve(&set),
            Err(IntegrityError::UnknownAppliance { appliance: ApplianceId(9), .. })
        ));
        let bad_mode = Routine::new(5, "bad", at(8, 0), vec![RoutineAction::new(0, 0, 7, None)]);
        assert!(matches!(
            bad_mode.resolve(&set),
            Err(IntegrityError::UnknownMode { mode: ModeId(7), .. })
        ));
    }

    #[test]
    fn with_start_moves_only_the_start_time() {
        let r = Routine::new(1, "wash", at(9, 0), vec![RoutineAction::new(0, 0, 1, None)]);
        let moved = r.with_start(18 * 60);
        assert_eq!(moved.when, at(18, 0));
        assert_eq!(moved.actions, r.actions);
        assert_eq!(r.when, at(9, 0));
    }

    #[test]
    fn deserializes_from_toml_with_defaults() {
        let raw = r#"
id = 3
name = "laundry"
when = "09:00"
actions = [{ id = 0, appliance_id = 0, mode_id = 1 }]
"#;
        let r: Routine = toml::from_str(raw).unwrap();
        assert!(r.enabled);
        assert_eq!(r.when, at(9, 0));
        assert_eq!(r.actions[0].duration, None);
    }
}
