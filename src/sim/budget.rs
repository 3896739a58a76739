/// Household power ceiling that the summed appliance draw must stay under.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerBudget {
    max_power_w: f64,
}

impl PowerBudget {
    /// Creates a budget capped at `max_power_w` watts.
    ///
    /// # Panics
    ///
    /// Panics if `max_power_w` is negative or NaN.
    pub fn new(max_power_w: f64) -> Self {
        assert!(max_power_w >= 0.0, "power ceiling must be non-negative");
        Self { max_power_w }
    }

    /// Creates a budget with no ceiling.
    pub fn unlimited() -> Self {
        Self {
            max_power_w: f64::INFINITY,
        }
    }

    /// Returns the ceiling in W.
    pub fn max_power_w(&self) -> f64 {
        self.max_power_w
    }

    /// Returns `true` when `total_w` does not exceed the ceiling.
    pub fn within_limits(&self, total_w: f64) -> bool {
        total_w <= self.max_power_w
    }

    /// Remaining capacity in W. Negative once the ceiling is exceeded.
    pub fn headroom(&self, total_w: f64) -> f64 {
        self.max_power_w - total_w
    }
}

impl Default for PowerBudget {
    fn default() -> Self {
        Self::unlimited()
    }
}
