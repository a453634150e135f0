//! Requirement domain model.
//!
//! # Responsibility
//! - Describe how often a task is due on each axis and how far a compliance
//!   may drift from the theoretical due value while staying on schedule.
//! - Reject incomplete or contradictory due/tolerance configurations.
//!
//! # Invariants
//! - A due amount requires its unit.
//! - A tolerance amount requires its unit and a due amount on the same axis.
//! - Amounts are never negative; `Days` and `Cycles` tolerances are whole.
//! - At most one active requirement exists per task. The repository enforces
//!   this through `activate`, not this type.

use crate::model::decimal::Decimal2;
use crate::model::task::TaskId;
use crate::model::units::{
    Axis, CalendarToleranceUnit, CyclesToleranceUnit, DueMonthsUnit, HoursToleranceUnit,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a requirement.
pub type RequirementId = Uuid;

/// Calendar due interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDue {
    pub amount: u32,
    pub unit: DueMonthsUnit,
}

/// Positive/negative tolerance pair for one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance<U> {
    pub positive: Option<Decimal2>,
    pub negative: Option<Decimal2>,
    pub unit: Option<U>,
}

impl<U> Tolerance<U> {
    pub fn is_empty(&self) -> bool {
        self.positive.is_none() && self.negative.is_none()
    }
}

/// Due interval and tolerance rules for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub uuid: RequirementId,
    pub task_uuid: TaskId,
    #[serde(default)]
    pub due_months: Option<u32>,
    #[serde(default)]
    pub due_months_unit: Option<DueMonthsUnit>,
    #[serde(default)]
    pub due_hrs: Option<Decimal2>,
    #[serde(default)]
    pub due_cyc: Option<i64>,
    #[serde(default)]
    pub tol_pos_mos: Option<Decimal2>,
    #[serde(default)]
    pub tol_neg_mos: Option<Decimal2>,
    #[serde(default)]
    pub tol_mos_unit: Option<CalendarToleranceUnit>,
    #[serde(default)]
    pub tol_pos_hrs: Option<Decimal2>,
    #[serde(default)]
    pub tol_neg_hrs: Option<Decimal2>,
    #[serde(default)]
    pub tol_hrs_unit: Option<HoursToleranceUnit>,
    #[serde(default)]
    pub tol_pos_cyc: Option<Decimal2>,
    #[serde(default)]
    pub tol_neg_cyc: Option<Decimal2>,
    #[serde(default)]
    pub tol_cyc_unit: Option<CyclesToleranceUnit>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Requirement {
    /// Creates an inactive requirement with no due configuration.
    pub fn new(task_uuid: TaskId) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            task_uuid,
            due_months: None,
            due_months_unit: None,
            due_hrs: None,
            due_cyc: None,
            tol_pos_mos: None,
            tol_neg_mos: None,
            tol_mos_unit: None,
            tol_pos_hrs: None,
            tol_neg_hrs: None,
            tol_hrs_unit: None,
            tol_pos_cyc: None,
            tol_neg_cyc: None,
            tol_cyc_unit: None,
            is_active: false,
            is_deleted: false,
        }
    }

    /// Calendar due interval, `None` when unset, zero, or missing its unit.
    pub fn calendar_due(&self) -> Option<CalendarDue> {
        match (self.due_months, self.due_months_unit) {
            (Some(amount), Some(unit)) if amount > 0 => Some(CalendarDue { amount, unit }),
            _ => None,
        }
    }

    /// Flight-hours due interval, `None` when unset or not positive.
    pub fn hours_due(&self) -> Option<Decimal2> {
        self.due_hrs.filter(|due| *due > Decimal2::ZERO)
    }

    /// Flight-cycles due interval, `None` when unset or not positive.
    pub fn cycles_due(&self) -> Option<i64> {
        self.due_cyc.filter(|due| *due > 0)
    }

    pub fn calendar_tolerance(&self) -> Tolerance<CalendarToleranceUnit> {
        Tolerance {
            positive: self.tol_pos_mos,
            negative: self.tol_neg_mos,
            unit: self.tol_mos_unit,
        }
    }

    pub fn hours_tolerance(&self) -> Tolerance<HoursToleranceUnit> {
        Tolerance {
            positive: self.tol_pos_hrs,
            negative: self.tol_neg_hrs,
            unit: self.tol_hrs_unit,
        }
    }

    pub fn cycles_tolerance(&self) -> Tolerance<CyclesToleranceUnit> {
        Tolerance {
            positive: self.tol_pos_cyc,
            negative: self.tol_neg_cyc,
            unit: self.tol_cyc_unit,
        }
    }

    /// Active and not tombstoned.
    pub fn is_current(&self) -> bool {
        self.is_active && !self.is_deleted
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    /// Checks the due/tolerance configuration invariants.
    pub fn validate(&self) -> Result<(), RequirementValidationError> {
        if self.uuid.is_nil() {
            return Err(RequirementValidationError::NilUuid);
        }

        if matches!(self.due_months, Some(amount) if amount > 0) && self.due_months_unit.is_none()
        {
            return Err(RequirementValidationError::DueWithoutUnit(Axis::Calendar));
        }
        check_not_negative("due_hrs", self.due_hrs)?;
        if matches!(self.due_cyc, Some(due) if due < 0) {
            return Err(RequirementValidationError::NegativeAmount { field: "due_cyc" });
        }

        let calendar = self.calendar_tolerance();
        check_tolerance(
            Axis::Calendar,
            &calendar,
            self.calendar_due().is_some(),
            ("tol_pos_mos", "tol_neg_mos"),
        )?;
        if calendar.unit == Some(CalendarToleranceUnit::Days) {
            check_whole("tol_pos_mos", "days", calendar.positive)?;
            check_whole("tol_neg_mos", "days", calendar.negative)?;
        }

        check_tolerance(
            Axis::Hours,
            &self.hours_tolerance(),
            self.hours_due().is_some(),
            ("tol_pos_hrs", "tol_neg_hrs"),
        )?;

        let cycles = self.cycles_tolerance();
        check_tolerance(
            Axis::Cycles,
            &cycles,
            self.cycles_due().is_some(),
            ("tol_pos_cyc", "tol_neg_cyc"),
        )?;
        if cycles.unit == Some(CyclesToleranceUnit::Cycles) {
            check_whole("tol_pos_cyc", "cycles", cycles.positive)?;
            check_whole("tol_neg_cyc", "cycles", cycles.negative)?;
        }

        Ok(())
    }
}

fn check_tolerance<U>(
    axis: Axis,
    tolerance: &Tolerance<U>,
    has_due: bool,
    fields: (&'static str, &'static str),
) -> Result<(), RequirementValidationError> {
    check_not_negative(fields.0, tolerance.positive)?;
    check_not_negative(fields.1, tolerance.negative)?;
    if tolerance.is_empty() {
        return Ok(());
    }
    if tolerance.unit.is_none() {
        return Err(RequirementValidationError::ToleranceWithoutUnit(axis));
    }
    if !has_due {
        return Err(RequirementValidationError::ToleranceWithoutDue(axis));
    }
    Ok(())
}

fn check_not_negative(
    field: &'static str,
    value: Option<Decimal2>,
) -> Result<(), RequirementValidationError> {
    match value {
        Some(amount) if amount.is_negative() => {
            Err(RequirementValidationError::NegativeAmount { field })
        }
        _ => Ok(()),
    }
}

fn check_whole(
    field: &'static str,
    unit: &'static str,
    value: Option<Decimal2>,
) -> Result<(), RequirementValidationError> {
    match value {
        Some(amount) if !amount.is_whole() => {
            Err(RequirementValidationError::FractionalAmount { field, unit })
        }
        _ => Ok(()),
    }
}

/// Requirement configuration invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementValidationError {
    NilUuid,
    /// A calendar due amount was given without `due_months_unit`.
    DueWithoutUnit(Axis),
    /// A tolerance amount was given without its unit.
    ToleranceWithoutUnit(Axis),
    /// A tolerance was given on an axis without a due amount.
    ToleranceWithoutDue(Axis),
    NegativeAmount { field: &'static str },
    FractionalAmount { field: &'static str, unit: &'static str },
}

impl Display for RequirementValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "requirement uuid must not be nil"),
            Self::DueWithoutUnit(axis) => write!(f, "{axis} due amount requires a unit"),
            Self::ToleranceWithoutUnit(axis) => {
                write!(f, "{axis} tolerance amount requires a unit")
            }
            Self::ToleranceWithoutDue(axis) => {
                write!(f, "{axis} tolerance requires a {axis} due amount")
            }
            Self::NegativeAmount { field } => write!(f, "{field} must not be negative"),
            Self::FractionalAmount { field, unit } => {
                write!(f, "{field} must be a whole number of {unit}")
            }
        }
    }
}

impl Error for RequirementValidationError {}
