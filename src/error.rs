//! Error types for routine validation, state projection and tariffs.

use chrono::NaiveTime;
use thiserror::Error;

use crate::model::{ActionId, ApplianceId, ModeId, RoutineId};

/// Two enabled routines drive one appliance into different modes at once.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "routines {first} and {second} conflict on appliance {appliance} \
     (actions {first_action} and {second_action})"
)]
pub struct InconsistentRoutinesError {
    pub first: RoutineId,
    pub second: RoutineId,
    pub first_action: ActionId,
    pub second_action: ActionId,
    pub appliance: ApplianceId,
}

impl InconsistentRoutinesError {
    /// Routines that could be disabled to clear the conflict.
    pub fn culprits(&self) -> Vec<RoutineId> {
        vec![self.first, self.second]
    }
}

/// Total draw goes over the household ceiling at some minute.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "power draw {total:.0} W exceeds ceiling {max_power:.0} W at {}",
    .when.format("%H:%M")
)]
pub struct MaxPowerExceededError {
    /// Ceiling in W.
    pub max_power: f64,
    /// First minute at which the ceiling is exceeded.
    pub when: NaiveTime,
    /// Total draw at `when` in W.
    pub total: f64,
    /// Routines drawing power at `when`, highest draw first.
    pub routines: Vec<RoutineId>,
}

impl MaxPowerExceededError {
    pub fn culprits(&self) -> Vec<RoutineId> {
        self.routines.clone()
    }
}

/// Inconsistent inventory or references into it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("duplicate appliance id {0}")]
    DuplicateAppliance(ApplianceId),
    #[error("appliance {appliance} declares mode {mode} twice")]
    DuplicateMode { appliance: ApplianceId, mode: ModeId },
    #[error("routine {routine} references unknown appliance {appliance}")]
    UnknownAppliance {
        routine: RoutineId,
        appliance: ApplianceId,
    },
    #[error("routine {routine} references unknown mode {mode} of appliance {appliance}")]
    UnknownMode {
        routine: RoutineId,
        appliance: ApplianceId,
        mode: ModeId,
    },
    #[error("appliance {0} is not part of the household")]
    NotInInventory(ApplianceId),
}

/// Why a set of routines cannot be projected onto a day.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    Inconsistent(#[from] InconsistentRoutinesError),
    #[error(transparent)]
    MaxPowerExceeded(#[from] MaxPowerExceededError),
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}

impl ScheduleError {
    /// True for domain conflicts, false for integrity faults.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Inconsistent(_) | Self::MaxPowerExceeded(_))
    }

    /// Routines implicated in a domain conflict. Empty for integrity faults.
    pub fn culprits(&self) -> Vec<RoutineId> {
        match self {
            Self::Inconsistent(e) => e.culprits(),
            Self::MaxPowerExceeded(e) => e.culprits(),
            Self::Integrity(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TariffError {
    #[error("unsupported number of tariff tiers: {0} (expected 1 to 3)")]
    UnsupportedTiers(usize),
    #[error("tariff price {price} for tier {tier} must be finite and non-negative")]
    InvalidPrice { tier: usize, price: f64 },
}
