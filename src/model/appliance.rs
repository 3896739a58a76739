//! Appliances and their operation modes.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::IntegrityError;

use super::id::{ApplianceId, ModeId};

/// One way an appliance can run (e.g. "off", "eco wash", "defrost").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperationMode {
    /// Unique within the owning appliance.
    pub id: ModeId,
    pub name: String,
    /// Instantaneous draw while in this mode (W, >= 0).
    pub power_consumption: f64,
    /// Default run length in minutes; `None` means the mode runs until superseded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_duration: Option<u32>,
}

impl OperationMode {
    /// Creates a mode with no default duration.
    pub fn new(id: u32, name: impl Into<String>, power_consumption: f64) -> Self {
        Self {
            id: ModeId(id),
            name: name.into(),
            power_consumption,
            default_duration: None,
        }
    }

    /// Creates the conventional zero-draw "off" mode.
    pub fn off() -> Self {
        Self::new(0, "off", 0.0)
    }

    /// Sets the default run length in minutes.
    #[must_use]
    pub fn with_default_duration(mut self, minutes: u32) -> Self {
        self.default_duration = Some(minutes);
        self
    }
}

/// A household appliance and the modes it supports.
///
/// By convention the first mode has id `0`, is called "off" and draws nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Appliance {
    pub id: ApplianceId,
    /// Device category, e.g. `"washer"` or `"fridge"`.
    pub device: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub modes: Vec<OperationMode>,
}

impl Appliance {
    pub fn new(id: u32, device: impl Into<String>, modes: Vec<OperationMode>) -> Self {
        Self {
            id: ApplianceId(id),
            device: device.into(),
            manufacturer: None,
            model: None,
            location: None,
            modes,
        }
    }

    /// Looks up one of this appliance's modes.
    pub fn mode(&self, id: ModeId) -> Option<&OperationMode> {
        self.modes.iter().find(|m| m.id == id)
    }

    /// Draw in watts while in mode `id`.
    ///
    /// An idle cell holds [`ModeId::OFF`]; appliances that do not declare an
    /// explicit off mode still draw nothing there.
    pub fn power_of(&self, id: ModeId) -> f64 {
        self.mode(id).map_or(0.0, |m| m.power_consumption)
    }

    fn check_modes(&self) -> Result<(), IntegrityError> {
        let mut seen = HashSet::with_capacity(self.modes.len());
        for mode in &self.modes {
            if !seen.insert(mode.id) {
                return Err(IntegrityError::DuplicateMode {
                    appliance: self.id,
                    mode: mode.id,
                });
            }
        }
        Ok(())
    }
}

/// The household's appliance inventory, with an index from id to matrix column.
///
/// Column order is the order appliances were supplied in.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Appliances {
    items: Vec<Appliance>,
    columns: HashMap<ApplianceId, usize>,
}

impl Appliances {
    /// Builds the inventory, rejecting duplicate appliance or mode ids.
    ///
    /// # Errors
    ///
    /// Returns [`IntegrityError::DuplicateAppliance`] or
    /// [`IntegrityError::DuplicateMode`] when ids are not unique.
    pub fn new(items: Vec<Appliance>) -> Result<Self, IntegrityError> {
        let mut columns = HashMap::with_capacity(items.len());
        for (col, appliance) in items.iter().enumerate() {
            appliance.check_modes()?;
            if columns.insert(appliance.id, col).is_some() {
                return Err(IntegrityError::DuplicateAppliance(appliance.id));
            }
        }
        Ok(Self { items, columns })
    }

    /// Matrix column assigned to appliance `id`.
    pub fn column(&self, id: ApplianceId) -> Option<usize> {
        self.columns.get(&id).copied()
    }

    pub fn get(&self, id: ApplianceId) -> Option<&Appliance> {
        self.column(id).map(|col| &self.items[col])
    }

    /// Appliance stored in matrix column `col`.
    pub fn at(&self, col: usize) -> Option<&Appliance> {
        self.items.get(col)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Appliance> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
