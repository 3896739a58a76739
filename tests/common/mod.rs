//! Shared test fixtures for integration tests.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use home_twin::model::{Appliance, Appliances, OperationMode, Routine, RoutineAction};
use home_twin::sim::{StateMatrix, TariffMatrix};

/// Household ceiling used across the suites (W).
pub const MAX_POWER_W: f64 = 3000.0;

pub fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// A Wednesday.
pub fn weekday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

/// A Saturday.
pub fn weekend() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 13).unwrap()
}

/// Single washer: mode 0 off, mode 1 wash (2000 W, 90 min).
pub fn washer_only() -> Appliances {
    Appliances::new(vec![washer()]).unwrap()
}

/// Washer, heater (open-ended 1500 W) and oven (bake 2400 W / 60 min, grill 1800 W / 30 min).
pub fn household() -> Appliances {
    Appliances::new(vec![
        washer(),
        Appliance::new(
            1,
            "heater",
            vec![OperationMode::off(), OperationMode::new(1, "on", 1500.0)],
        ),
        Appliance::new(
            2,
            "oven",
            vec![
                OperationMode::off(),
                OperationMode::new(1, "bake", 2400.0).with_default_duration(60),
                OperationMode::new(2, "grill", 1800.0).with_default_duration(30),
            ],
        ),
    ])
    .unwrap()
}

fn washer() -> Appliance {
    Appliance::new(
        0,
        "washer",
        vec![
            OperationMode::off(),
            OperationMode::new(1, "wash", 2000.0).with_default_duration(90),
        ],
    )
}

/// Wash cycle using the mode's default duration.
pub fn wash(id: u32, when: NaiveTime) -> Routine {
    Routine::new(id, "wash", when, vec![RoutineAction::new(0, 0, 1, None)])
}

/// Oven action in `mode` using the mode's default duration.
pub fn oven(id: u32, mode: u32, when: NaiveTime) -> Routine {
    Routine::new(id, "oven", when, vec![RoutineAction::new(0, 2, mode, None)])
}

/// Heater on for `minutes`, or until midnight when `None`.
pub fn heat(id: u32, when: NaiveTime, minutes: Option<u32>) -> Routine {
    Routine::new(id, "heat", when, vec![RoutineAction::new(0, 1, 1, minutes)])
}

/// Peak 0.25 on weekdays 08:00-18:00, 0.10 otherwise.
pub fn two_tier() -> TariffMatrix {
    TariffMatrix::new(&[0.25, 0.10]).unwrap()
}

pub fn empty_matrix(appliances: Appliances) -> StateMatrix {
    StateMatrix::new(appliances, Vec::new(), MAX_POWER_W).unwrap()
}
