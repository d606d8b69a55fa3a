//! Inventory vocabulary
//!
//! Every enum here is stored as its canonical string in the database and
//! travels over the API in the same form.

use crate::error::CommonError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:literal {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $text)] $variant),+
        }

        impl $name {
            /// Every variant in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CommonError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(trimmed))
                    .ok_or_else(|| CommonError::invalid($field, s))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum! {
    /// Physical condition of a device
    DeviceCondition, "condition" {
        New => "New",
        ApprovedForUse => "Approved for use",
        InMaintenance => "In maintenance",
        Damaged => "Damaged",
        /// Theft, loss or an insurance claim has been reported
        LossReported => "Loss reported",
        Defective => "Defective",
    }
}

impl DeviceCondition {
    /// Conditions in which an idle device can be handed out
    pub fn is_assignable(&self) -> bool {
        matches!(self, Self::New | Self::ApprovedForUse)
    }

    pub fn is_eligible_for_maintenance(&self) -> bool {
        matches!(self, Self::Defective | Self::Damaged)
    }

    /// Conditions counted as unavailable on the dashboard
    pub fn is_unavailable(&self) -> bool {
        !self.is_assignable()
    }
}

string_enum! {
    /// Derived availability shown next to each device
    DeviceStatus, "device status" {
        InUse => "In use",
        Available => "Available",
        Unavailable => "Unavailable",
    }
}

impl DeviceStatus {
    pub fn derive(condition: DeviceCondition, in_use: bool) -> Self {
        if in_use {
            Self::InUse
        } else if condition.is_assignable() {
            Self::Available
        } else {
            Self::Unavailable
        }
    }
}

string_enum! {
    /// Lifecycle of a device assignment record
    AssignmentStatus, "assignment status" {
        InUse => "In use",
        Returned => "Returned",
    }
}

string_enum! {
    MaintenanceStatus, "maintenance status" {
        Open => "Open",
        InProgress => "In progress",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

string_enum! {
    /// Whether a line term is the current one for its line
    TermStatus, "term status" {
        Active => "Active",
        Inactive => "Inactive",
    }
}
