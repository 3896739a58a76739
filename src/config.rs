//! TOML-based household scenario configuration and preset definitions.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ScheduleError;
use crate::model::{Appliance, Appliances, OperationMode, Routine, RoutineAction};
use crate::sim::clock;
use crate::sim::{ActivityWindow, StateMatrix, TariffMatrix};

/// Top-level scenario configuration parsed from TOML.
///
/// Load from TOML with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::demo`] for the built-in household.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Contract and optimizer parameters.
    #[serde(default)]
    pub home: HomeConfig,
    /// Appliance inventory; order fixes the state matrix columns.
    #[serde(default)]
    pub appliances: Vec<Appliance>,
    /// Committed routines.
    #[serde(default)]
    pub routines: Vec<Routine>,
    /// Candidate routines evaluated against the committed ones.
    #[serde(default)]
    pub test_routines: Vec<Routine>,
}

/// Household contract: power ceiling, tariff tiers and activity hours.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    /// Power ceiling (kW, must be > 0).
    pub max_power: f64,
    /// Number of tariff tiers (1 to 3).
    pub energy_rates_number: usize,
    /// Price per kWh for each tier, tier 1 first.
    pub energy_rates_prices: Vec<f64>,
    /// Optional `["HH:MM", "HH:MM"]` window for recommended start times.
    #[serde(
        with = "clock::hhmm_range",
        skip_serializing_if = "Option::is_none"
    )]
    pub activity_hours: Option<(NaiveTime, NaiveTime)>,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            max_power: 3.0,
            energy_rates_number: 2,
            energy_rates_prices: vec![0.25, 0.10],
            activity_hours: None,
        }
    }
}

impl HomeConfig {
    /// Power ceiling in W.
    pub fn max_power_w(&self) -> f64 {
        self.max_power * 1000.0
    }

    /// Builds the weekly price table.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the tier count and price list disagree or a
    /// price is rejected.
    pub fn tariff(&self) -> Result<TariffMatrix, ConfigError> {
        if self.energy_rates_prices.len() != self.energy_rates_number {
            return Err(ConfigError::new(
                "home.energy_rates_prices",
                format!(
                    "expected {} prices, got {}",
                    self.energy_rates_number,
                    self.energy_rates_prices.len()
                ),
            ));
        }
        TariffMatrix::new(&self.energy_rates_prices)
            .map_err(|e| ConfigError::new("home.energy_rates_prices", e.to_string()))
    }

    /// Window for recommended start times; the whole day when unset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the window is empty.
    pub fn activity_window(&self) -> Result<ActivityWindow, ConfigError> {
        match self.activity_hours {
            None => Ok(ActivityWindow::full_day()),
            Some((start, end)) => ActivityWindow::from_times(start, end).ok_or_else(|| {
                ConfigError::new("home.activity_hours", "start must be before end")
            }),
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"home.max_power"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or_default()
}

impl ScenarioConfig {
    /// Returns the demo household: washer, fridge and oven on a 3 kW,
    /// two-tier contract, with one laundry run to place.
    pub fn demo() -> Self {
        let appliances = vec![
            Appliance {
                manufacturer: Some("Whirlpool".to_string()),
                location: Some("laundry room".to_string()),
                ..Appliance::new(
                    0,
                    "washer",
                    vec![
                        OperationMode::off(),
                        OperationMode::new(1, "wash", 2000.0).with_default_duration(90),
                        OperationMode::new(2, "quick", 1200.0).with_default_duration(30),
                    ],
                )
            },
            Appliance {
                location: Some("kitchen".to_string()),
                ..Appliance::new(
                    1,
                    "fridge",
                    vec![OperationMode::off(), OperationMode::new(1, "cooling", 150.0)],
                )
            },
            Appliance {
                location: Some("kitchen".to_string()),
                ..Appliance::new(
                    2,
                    "oven",
                    vec![
                        OperationMode::off(),
                        OperationMode::new(1, "bake", 2400.0).with_default_duration(60),
                        OperationMode::new(2, "grill", 1800.0).with_default_duration(30),
                    ],
                )
            },
        ];

        Self {
            home: HomeConfig {
                activity_hours: Some((at(7, 0), at(23, 0))),
                ..HomeConfig::default()
            },
            appliances,
            routines: vec![
                Routine::new(1, "fridge", at(0, 0), vec![RoutineAction::new(0, 1, 1, None)]),
                Routine::new(2, "dinner", at(19, 0), vec![RoutineAction::new(0, 2, 1, None)]),
            ],
            test_routines: vec![
                Routine::new(10, "laundry", at(9, 0), vec![RoutineAction::new(0, 0, 1, None)]),
                Routine::new(11, "grill", at(19, 30), vec![RoutineAction::new(0, 2, 2, None)]),
            ],
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["demo"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "demo" => Ok(Self::demo()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("scenario", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Builds the committed state matrix from the inventory and routines.
    ///
    /// # Errors
    ///
    /// Returns a `ScheduleError` if the inventory is inconsistent or the
    /// committed routines conflict or exceed the ceiling.
    pub fn committed_matrix(&self) -> Result<StateMatrix, ScheduleError> {
        let appliances = Appliances::new(self.appliances.clone())?;
        StateMatrix::new(appliances, self.routines.clone(), self.home.max_power_w())
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let h = &self.home;

        if !(h.max_power.is_finite() && h.max_power > 0.0) {
            errors.push(ConfigError::new("home.max_power", "must be > 0"));
        }
        if !(1..=3).contains(&h.energy_rates_number) {
            errors.push(ConfigError::new(
                "home.energy_rates_number",
                format!("must be 1, 2 or 3, got {}", h.energy_rates_number),
            ));
        }
        if h.energy_rates_prices.len() != h.energy_rates_number {
            errors.push(ConfigError::new(
                "home.energy_rates_prices",
                "must list one price per tier",
            ));
        }
        if h.energy_rates_prices.iter().any(|p| !p.is_finite() || *p < 0.0) {
            errors.push(ConfigError::new(
                "home.energy_rates_prices",
                "prices must be >= 0",
            ));
        }
        if let Err(e) = h.activity_window() {
            errors.push(e);
        }

        let mut appliance_ids = HashSet::new();
        for (i, appliance) in self.appliances.iter().enumerate() {
            if !appliance_ids.insert(appliance.id) {
                errors.push(ConfigError::new(
                    format!("appliances[{i}].id"),
                    format!("duplicate appliance id {}", appliance.id),
                ));
            }
            let mut mode_ids = HashSet::new();
            for (j, mode) in appliance.modes.iter().enumerate() {
                if !mode_ids.insert(mode.id) {
                    errors.push(ConfigError::new(
                        format!("appliances[{i}].modes[{j}].id"),
                        format!("duplicate mode id {}", mode.id),
                    ));
                }
                if !(mode.power_consumption.is_finite() && mode.power_consumption >= 0.0) {
                    errors.push(ConfigError::new(
                        format!("appliances[{i}].modes[{j}].power_consumption"),
                        "must be >= 0",
                    ));
                }
            }
        }

        let mut routine_ids = HashSet::new();
        let groups = [("routines", &self.routines), ("test_routines", &self.test_routines)];
        for (group, routines) in groups {
            for (i, routine) in routines.iter().enumerate() {
                if !routine_ids.insert(routine.id) {
                    errors.push(ConfigError::new(
                        format!("{group}[{i}].id"),
                        format!("duplicate routine id {}", routine.id),
                    ));
                }
                for (j, action) in routine.actions.iter().enumerate() {
                    let appliance = self.appliances.iter().find(|a| a.id == action.appliance_id);
                    match appliance {
                        None => errors.push(ConfigError::new(
                            format!("{group}[{i}].actions[{j}].appliance_id"),
                            format!("unknown appliance {}", action.appliance_id),
                        )),
                        Some(a) if a.mode(action.mode_id).is_none() => {
                            errors.push(ConfigError::new(
                                format!("{group}[{i}].actions[{j}].mode_id"),
                                format!("appliance {} has no mode {}", a.id, action.mode_id),
                            ))
                        }
                        Some(_) => {}
                    }
                }
            }
        }

        errors
    }
}
