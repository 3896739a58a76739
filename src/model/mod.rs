//! Household inventory and routine definitions.

pub mod appliance;
pub mod id;
pub mod routine;

pub use appliance::{Appliance, Appliances, OperationMode};
pub use id::{ActionId, ApplianceId, ModeId, RoutineId};
pub use routine::{ActionInterval, ResolvedAction, ResolvedRoutine, Routine, RoutineAction};
