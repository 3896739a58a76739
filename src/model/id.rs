//! Typed integer identifiers for the domain objects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Access the raw integer.
            #[must_use]
            pub fn get(self) -> u32 {
                self.0
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

define_id!(
    /// Identifier of an [`Appliance`](crate::model::Appliance), unique across the household.
    ApplianceId
);

define_id!(
    /// Identifier of an [`OperationMode`](crate::model::OperationMode), unique within its appliance.
    ModeId
);

define_id!(
    /// Identifier of a [`Routine`](crate::model::Routine).
    RoutineId
);

define_id!(
    /// Identifier of a [`RoutineAction`](crate::model::RoutineAction) within its routine.
    ActionId
);

impl ModeId {
    /// The conventional "off" mode every appliance idles in.
    pub const OFF: Self = Self(0);

    /// Returns `true` for the conventional "off" mode.
    #[must_use]
    pub fn is_off(self) -> bool {
        self == Self::OFF
    }
}
