//! Due axes and the unit enums attached to each axis.
//!
//! Units serialise as `snake_case` names and also accept the one-letter codes
//! stored with requirement data (`M`, `D`, `P`, `H`, `C`).

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the three independent due-tracking dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Calendar,
    Hours,
    Cycles,
}

impl Axis {
    /// Evaluation order used by every recompute.
    pub const ALL: [Axis; 3] = [Axis::Calendar, Axis::Hours, Axis::Cycles];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "calendar",
            Self::Hours => "hours",
            Self::Cycles => "cycles",
        }
    }
}

impl Display for Axis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of a calendar due amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueMonthsUnit {
    /// Calendar months (end-of-month clamped).
    #[serde(alias = "M")]
    Months,
    /// Exact days.
    #[serde(alias = "D")]
    Days,
}

/// Unit of a calendar tolerance amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarToleranceUnit {
    #[serde(alias = "M")]
    Months,
    #[serde(alias = "D")]
    Days,
    /// Percentage of the calendar due interval expressed in days.
    #[serde(alias = "P")]
    Percent,
}

/// Unit of a flight-hours tolerance amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursToleranceUnit {
    #[serde(alias = "H")]
    Hours,
    #[serde(alias = "P")]
    Percent,
}

/// Unit of a flight-cycles tolerance amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclesToleranceUnit {
    #[serde(alias = "C")]
    Cycles,
    #[serde(alias = "P")]
    Percent,
}
