/// Power ceiling check.
pub mod budget;
/// Minute-of-day arithmetic and time-of-day serde adapters.
pub mod clock;
pub mod optimizer;
pub mod state_matrix;
/// Day report derived from a state matrix.
pub mod summary;
pub mod tariff;
/// Activity window for recommended start times.
pub mod window;

pub use budget::PowerBudget;
pub use optimizer::{RoutineOptimizer, StartTimeRecommendation};
pub use state_matrix::StateMatrix;
pub use summary::{ApplianceEnergy, DaySummary};
pub use tariff::{TariffMatrix, TariffPlan, Tier};
pub use window::ActivityWindow;
