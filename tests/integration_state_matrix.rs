//! Integration tests for state matrix construction and what-if probes.

mod common;

use common::{MAX_POWER_W, at, empty_matrix, heat, household, oven, wash};
use home_twin::error::ScheduleError;
use home_twin::model::{ApplianceId, ModeId, Routine, RoutineAction, RoutineId};
use home_twin::sim::StateMatrix;
use home_twin::sim::clock::MINUTES_PER_DAY;
use rand::{Rng, SeedableRng, rngs::StdRng};

#[test]
fn conflicting_routines_name_both_routines_and_the_appliance() {
    let err = StateMatrix::new(
        household(),
        vec![oven(1, 1, at(19, 0)), oven(2, 2, at(19, 30))],
        MAX_POWER_W,
    )
    .unwrap_err();
    match err {
        ScheduleError::Inconsistent(e) => {
            assert_eq!((e.first, e.second), (RoutineId(1), RoutineId(2)));
            assert_eq!(e.appliance, ApplianceId(2));
        }
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[test]
fn back_to_back_runs_do_not_conflict() {
    // Bake covers 19:00-20:00, grill starts exactly when it ends.
    let m = StateMatrix::new(
        household(),
        vec![oven(1, 1, at(19, 0)), oven(2, 2, at(20, 0))],
        MAX_POWER_W,
    )
    .unwrap();
    assert_eq!(m.mode(ApplianceId(2), at(19, 59)).unwrap(), ModeId(1));
    assert_eq!(m.mode(ApplianceId(2), at(20, 0)).unwrap(), ModeId(2));
    assert_eq!(m.mode(ApplianceId(2), at(20, 30)).unwrap(), ModeId::OFF);
}

#[test]
fn explicit_off_action_conflicts_with_a_running_mode() {
    let off = Routine::new(3, "stop", at(9, 30), vec![RoutineAction::new(0, 0, 0, Some(10))]);
    let err = StateMatrix::new(household(), vec![wash(1, at(9, 0)), off], MAX_POWER_W).unwrap_err();
    assert!(matches!(err, ScheduleError::Inconsistent(_)));
}

#[test]
fn open_ended_heater_blocks_the_rest_of_the_day() {
    let base = StateMatrix::new(household(), vec![heat(1, at(12, 0), None)], MAX_POWER_W).unwrap();
    assert_eq!(base.total_consumption(at(23, 59)), 1500.0);
    // 1500 W heater + 2000 W wash at 22:00 exceeds 3000 W.
    let err = base.add_routine(wash(2, at(22, 0))).unwrap_err();
    match err {
        ScheduleError::MaxPowerExceeded(e) => {
            assert_eq!(e.when, at(22, 0));
            assert_eq!(e.routines, vec![RoutineId(2), RoutineId(1)]);
            assert!(e.total > e.max_power);
        }
        other => panic!("expected budget error, got {other:?}"),
    }
    // Before noon the heater is still off.
    assert!(base.add_routine(wash(2, at(9, 0))).is_ok());
}

#[test]
fn add_routine_is_pure_and_repeatable() {
    let base = StateMatrix::new(household(), vec![oven(1, 1, at(19, 0))], MAX_POWER_W).unwrap();
    let snapshot = base.clone();

    let first = base.add_routine(wash(2, at(9, 0))).unwrap();
    let second = base.add_routine(wash(2, at(9, 0))).unwrap();
    assert_eq!(first, second);
    assert_eq!(base, snapshot);

    let rejected = base.add_routine(oven(3, 2, at(19, 15)));
    assert!(rejected.is_err());
    assert_eq!(base, snapshot);
    assert_eq!(base.routines().len(), 1);
}

#[test]
fn timeline_matches_point_queries() {
    let m = StateMatrix::new(household(), vec![wash(1, at(9, 0))], MAX_POWER_W).unwrap();
    let timeline = m.timeline(ApplianceId(0)).unwrap();
    assert_eq!(timeline.len(), MINUTES_PER_DAY);
    assert_eq!(timeline.iter().filter(|mode| **mode == ModeId(1)).count(), 90);
    assert_eq!(timeline[9 * 60], m.mode(ApplianceId(0), at(9, 0)).unwrap());
}

#[test]
fn integrity_faults_are_not_infeasible() {
    let ghost = Routine::new(5, "ghost", at(9, 0), vec![RoutineAction::new(0, 0, 9, None)]);
    let err = empty_matrix(household()).add_routine(ghost).unwrap_err();
    assert!(matches!(err, ScheduleError::Integrity(_)));
    assert!(!err.is_infeasible());
}

fn random_routine(rng: &mut StdRng, id: u32) -> Routine {
    let actions = (0..rng.random_range(1..=2))
        .map(|a| {
            let appliance = rng.random_range(0..3);
            // Only the oven has a third mode.
            let mode = rng.random_range(0..=if appliance == 2 { 2 } else { 1 });
            let duration = rng.random_bool(0.7).then(|| rng.random_range(1..=180));
            RoutineAction::new(a, appliance, mode, duration)
        })
        .collect();
    let start = rng.random_range(0..MINUTES_PER_DAY);
    let mut routine = Routine::new(id, format!("r{id}"), at(0, 0), actions).with_start(start);
    routine.enabled = rng.random_bool(0.85);
    routine
}

#[test]
fn accepted_matrices_stay_within_budget_and_conflict_free() {
    let mut rng = StdRng::seed_from_u64(42);
    let appliances = household();
    let mut accepted = 0;

    for _ in 0..200 {
        let routines: Vec<Routine> = (0..rng.random_range(1..=4))
            .map(|id| random_routine(&mut rng, id))
            .collect();
        let Ok(m) = StateMatrix::new(appliances.clone(), routines.clone(), MAX_POWER_W) else {
            continue;
        };
        accepted += 1;

        for minute in 0..MINUTES_PER_DAY {
            assert!(m.total_at(minute) <= MAX_POWER_W);
        }
        for (i, a) in routines.iter().enumerate() {
            for b in &routines[i + 1..] {
                assert!(a.conflicting_actions(b, &appliances).unwrap().is_none());
            }
        }
    }

    assert!(accepted > 0, "seeded run should accept some routine sets");
}
