//! Time-of-use tariff: a day-of-week by hour-of-day price table.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};

use crate::error::TariffError;

use super::clock::{self, DAYS_PER_WEEK, HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR};

/// Price band. `F1` is the first configured price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    F1,
    F2,
    F3,
}

impl Tier {
    /// Position of this tier's price in the configured price list.
    pub fn index(self) -> usize {
        match self {
            Tier::F1 => 0,
            Tier::F2 => 1,
            Tier::F3 => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{}", self.index() + 1)
    }
}

/// Calendar rule mapping each (weekday, hour) cell to a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TariffPlan {
    /// Flat price all week.
    Single,
    /// Weekday working hours on `F1`, everything else on `F2`.
    Dual,
    /// Weekday working hours on `F1`, weekday shoulders on `F2`, the rest on `F3`.
    Triple,
}

impl TariffPlan {
    /// # Errors
    ///
    /// Returns [`TariffError::UnsupportedTiers`] unless `count` is 1, 2 or 3.
    pub fn from_tier_count(count: usize) -> Result<Self, TariffError> {
        match count {
            1 => Ok(Self::Single),
            2 => Ok(Self::Dual),
            3 => Ok(Self::Triple),
            n => Err(TariffError::UnsupportedTiers(n)),
        }
    }

    pub fn tier_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::Dual => 2,
            Self::Triple => 3,
        }
    }

    /// Tier of the hour starting at `hour:00` on `weekday`.
    ///
    /// Working hours are 08:00 to 18:00 (hours 8 through 17). Under three
    /// tiers the shoulders are hour 7 and hours 19 through 21; hours 18, 22
    /// and 23 fall on `F3`.
    pub fn tier(self, weekday: Weekday, hour: u32) -> Tier {
        let weekday = clock::is_weekday(weekday);
        match (self, weekday, hour) {
            (Self::Single, _, _) => Tier::F1,
            (_, true, 8..=17) => Tier::F1,
            (Self::Dual, _, _) => Tier::F2,
            (Self::Triple, true, 7 | 19..=21) => Tier::F2,
            (Self::Triple, _, _) => Tier::F3,
        }
    }
}

/// Hourly prices for a whole week, Monday first.
#[derive(Debug, Clone, PartialEq)]
pub struct TariffMatrix {
    plan: TariffPlan,
    prices: Vec<f64>,
    table: [[f64; HOURS_PER_DAY]; DAYS_PER_WEEK],
}

impl TariffMatrix {
    /// Builds the table from one price per tier, `F1` first.
    ///
    /// # Errors
    ///
    /// * [`TariffError::UnsupportedTiers`] unless one to three prices are given
    /// * [`TariffError::InvalidPrice`] for a negative or non-finite price
    pub fn new(prices: &[f64]) -> Result<Self, TariffError> {
        let plan = TariffPlan::from_tier_count(prices.len())?;
        if let Some((tier, &price)) = prices
            .iter()
            .enumerate()
            .find(|&(_, &p)| !p.is_finite() || p < 0.0)
        {
            return Err(TariffError::InvalidPrice {
                tier: tier + 1,
                price,
            });
        }

        let mut table = [[0.0; HOURS_PER_DAY]; DAYS_PER_WEEK];
        for (day, weekday) in WEEK.iter().enumerate() {
            for (hour, cell) in table[day].iter_mut().enumerate() {
                *cell = prices[plan.tier(*weekday, hour as u32).index()];
            }
        }

        Ok(Self {
            plan,
            prices: prices.to_vec(),
            table,
        })
    }

    pub fn plan(&self) -> TariffPlan {
        self.plan
    }

    /// Configured per-tier prices, `F1` first.
    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Price of the hour starting at `hour:00` on `weekday`.
    pub fn price(&self, weekday: Weekday, hour: u32) -> f64 {
        self.table[clock::day_index(weekday)][hour as usize % HOURS_PER_DAY]
    }

    /// Price of the hour containing `instant`.
    pub fn get_cost(&self, instant: NaiveDateTime) -> f64 {
        self.price(instant.weekday(), instant.hour())
    }

    /// Sum of the full-hour prices of every hour `[start, start + minutes)`
    /// touches. Partial hours count as whole ones and the range may run into
    /// following days.
    pub fn get_duration_cost(&self, start: NaiveDateTime, minutes: u32) -> f64 {
        if minutes == 0 {
            return 0.0;
        }
        let first = minute_of_week(start);
        let last = first + minutes as usize - 1;
        (first / MINUTES_PER_HOUR..=last / MINUTES_PER_HOUR)
            .map(|h| self.table[(h / HOURS_PER_DAY) % DAYS_PER_WEEK][h % HOURS_PER_DAY])
            .sum()
    }
}

const WEEK: [Weekday; DAYS_PER_WEEK] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn minute_of_week(instant: NaiveDateTime) -> usize {
    clock::day_index(instant.weekday()) * MINUTES_PER_DAY + clock::minute_of_day(&instant)
}
