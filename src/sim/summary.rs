//! Day-level figures derived from a committed state matrix.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime};

use crate::model::ApplianceId;

use super::clock::{self, MINUTES_PER_DAY, MINUTES_PER_HOUR};
use super::state_matrix::StateMatrix;
use super::tariff::TariffMatrix;

/// Energy one appliance uses over the day.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplianceEnergy {
    pub appliance: ApplianceId,
    pub device: String,
    pub energy_kwh: f64,
}

/// Aggregate figures for one projected day.
///
/// Computed post-hoc from the matrix so the report always agrees with it.
#[derive(Debug, Clone, PartialEq)]
pub struct DaySummary {
    pub date: NaiveDate,
    /// Highest summed draw over the day (W).
    pub peak_power_w: f64,
    /// First minute reaching the peak.
    pub peak_at: NaiveTime,
    /// Smallest gap between draw and ceiling (W).
    pub min_headroom_w: f64,
    /// Total energy over the day (kWh).
    pub energy_kwh: f64,
    /// Energy priced at each minute's hourly rate.
    pub cost: f64,
    /// Per-appliance energy, largest consumer first.
    pub appliances: Vec<ApplianceEnergy>,
}

impl DaySummary {
    /// Computes the summary of `matrix` for `date`.
    ///
    /// # Arguments
    ///
    /// * `matrix` - Committed projection
    /// * `tariff` - Prices per kWh
    /// * `date` - Day being reported, which selects the tariff weekday
    pub fn from_matrix(matrix: &StateMatrix, tariff: &TariffMatrix, date: NaiveDate) -> Self {
        let weekday = date.weekday();
        let budget = matrix.budget();
        let minute_kwh = |w: f64| w / 1000.0 / MINUTES_PER_HOUR as f64;

        let mut peak = 0.0_f64;
        let mut peak_minute = 0;
        let mut energy = 0.0;
        let mut cost = 0.0;

        for minute in 0..MINUTES_PER_DAY {
            let total = matrix.total_at(minute);
            if total > peak {
                peak = total;
                peak_minute = minute;
            }
            let kwh = minute_kwh(total);
            energy += kwh;
            cost += kwh * tariff.price(weekday, (minute / MINUTES_PER_HOUR) as u32);
        }

        let mut appliances: Vec<ApplianceEnergy> = matrix
            .appliances()
            .iter()
            .enumerate()
            .map(|(col, a)| ApplianceEnergy {
                appliance: a.id,
                device: a.device.clone(),
                energy_kwh: (0..MINUTES_PER_DAY)
                    .map(|m| minute_kwh(matrix.power_at(col, m)))
                    .sum(),
            })
            .collect();
        appliances.sort_by(|a, b| b.energy_kwh.total_cmp(&a.energy_kwh));

        Self {
            date,
            peak_power_w: peak,
            peak_at: clock::time_of_minute(peak_minute),
            min_headroom_w: budget.headroom(peak),
            energy_kwh: energy,
            cost,
            appliances,
        }
    }
}

impl fmt::Display for DaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Day Summary ({}) ---", self.date)?;
        writeln!(
            f,
            "Peak power:            {:.0} W at {}",
            self.peak_power_w,
            self.peak_at.format("%H:%M")
        )?;
        if self.min_headroom_w.is_finite() {
            writeln!(f, "Minimum headroom:      {:.0} W", self.min_headroom_w)?;
        }
        writeln!(f, "Energy:                {:.2} kWh", self.energy_kwh)?;
        write!(f, "Cost:                  {:.2}", self.cost)?;
        for a in &self.appliances {
            write!(f, "\n  {:<20} {:.2} kWh", a.device, a.energy_kwh)?;
        }
        Ok(())
    }
}
