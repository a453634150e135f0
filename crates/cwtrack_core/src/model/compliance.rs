//! Compliance (CW) domain model.
//!
//! # Responsibility
//! - Record one performance of a task with its date/hours/cycles readings.
//! - Carry the engine-owned next-due and adjustment values.
//! - Define the ordering rules a new or edited compliance must satisfy.
//!
//! # Invariants
//! - `perform_date` is unique per task.
//! - Readings never decrease along the perform_date ordering.
//! - `next_due_*` and `adj_*` are written only by the due engine.

use crate::model::decimal::Decimal2;
use crate::model::task::TaskId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a compliance record.
pub type ComplianceId = Uuid;

/// One recorded performance of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compliance {
    pub uuid: ComplianceId,
    pub task_uuid: TaskId,
    pub perform_date: NaiveDate,
    #[serde(default)]
    pub perform_hrs: Option<Decimal2>,
    #[serde(default)]
    pub perform_cyc: Option<i64>,
    #[serde(default)]
    pub next_due_date: Option<NaiveDate>,
    #[serde(default)]
    pub next_due_hrs: Option<Decimal2>,
    #[serde(default)]
    pub next_due_cyc: Option<i64>,
    /// Calendar drift in days; positive means performed late.
    #[serde(default)]
    pub adj_mos: Option<i64>,
    #[serde(default)]
    pub adj_hrs: Option<Decimal2>,
    #[serde(default)]
    pub adj_cyc: Option<i64>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Compliance {
    /// Creates a compliance performed on `perform_date` with no readings.
    pub fn new(task_uuid: TaskId, perform_date: NaiveDate) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            task_uuid,
            perform_date,
            perform_hrs: None,
            perform_cyc: None,
            next_due_date: None,
            next_due_hrs: None,
            next_due_cyc: None,
            adj_mos: None,
            adj_hrs: None,
            adj_cyc: None,
            is_deleted: false,
        }
    }

    pub fn with_hours(mut self, hours: Decimal2) -> Self {
        self.perform_hrs = Some(hours);
        self
    }

    pub fn with_cycles(mut self, cycles: i64) -> Self {
        self.perform_cyc = Some(cycles);
        self
    }

    /// Nulls every engine-owned field.
    pub fn clear_schedule(&mut self) {
        self.next_due_date = None;
        self.next_due_hrs = None;
        self.next_due_cyc = None;
        self.adj_mos = None;
        self.adj_hrs = None;
        self.adj_cyc = None;
    }

    /// Copies the engine-owned fields from `other`.
    pub fn copy_schedule_from(&mut self, other: &Compliance) {
        self.next_due_date = other.next_due_date;
        self.next_due_hrs = other.next_due_hrs;
        self.next_due_cyc = other.next_due_cyc;
        self.adj_mos = other.adj_mos;
        self.adj_hrs = other.adj_hrs;
        self.adj_cyc = other.adj_cyc;
    }

    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }

    pub fn validate(&self) -> Result<(), ComplianceValidationError> {
        if self.uuid.is_nil() {
            return Err(ComplianceValidationError::NilUuid);
        }
        if matches!(self.perform_hrs, Some(hours) if hours.is_negative()) {
            return Err(ComplianceValidationError::NegativeReading {
                field: "perform_hrs",
            });
        }
        if matches!(self.perform_cyc, Some(cycles) if cycles < 0) {
            return Err(ComplianceValidationError::NegativeReading {
                field: "perform_cyc",
            });
        }
        Ok(())
    }
}

/// Checks that `candidate` fits strictly between its neighbours in
/// perform_date order and that its readings do not run backwards.
///
/// `previous` is the closest compliance performed before the candidate and
/// `next` the closest one performed after it. Readings are compared only
/// when both records carry them.
pub fn check_order(
    candidate: &Compliance,
    previous: Option<&Compliance>,
    next: Option<&Compliance>,
) -> Result<(), ComplianceOrderError> {
    if let Some(previous) = previous {
        if candidate.perform_date <= previous.perform_date {
            return Err(ComplianceOrderError::DateNotAfterPrevious {
                date: candidate.perform_date,
                previous: previous.perform_date,
            });
        }
        if let (Some(hours), Some(previous_hours)) = (candidate.perform_hrs, previous.perform_hrs)
        {
            if hours < previous_hours {
                return Err(ComplianceOrderError::HoursBelowPrevious {
                    hours,
                    previous: previous_hours,
                });
            }
        }
        if let (Some(cycles), Some(previous_cycles)) =
            (candidate.perform_cyc, previous.perform_cyc)
        {
            if cycles < previous_cycles {
                return Err(ComplianceOrderError::CyclesBelowPrevious {
                    cycles,
                    previous: previous_cycles,
                });
            }
        }
    }

    if let Some(next) = next {
        if candidate.perform_date >= next.perform_date {
            return Err(ComplianceOrderError::DateNotBeforeNext {
                date: candidate.perform_date,
                next: next.perform_date,
            });
        }
        if let (Some(hours), Some(next_hours)) = (candidate.perform_hrs, next.perform_hrs) {
            if hours > next_hours {
                return Err(ComplianceOrderError::HoursAboveNext {
                    hours,
                    next: next_hours,
                });
            }
        }
        if let (Some(cycles), Some(next_cycles)) = (candidate.perform_cyc, next.perform_cyc) {
            if cycles > next_cycles {
                return Err(ComplianceOrderError::CyclesAboveNext {
                    cycles,
                    next: next_cycles,
                });
            }
        }
    }

    Ok(())
}

/// Compliance record invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplianceValidationError {
    NilUuid,
    NegativeReading { field: &'static str },
}

impl Display for ComplianceValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "compliance uuid must not be nil"),
            Self::NegativeReading { field } => write!(f, "{field} must not be negative"),
        }
    }
}

impl Error for ComplianceValidationError {}

/// Ordering violations between neighbouring compliance records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplianceOrderError {
    DateNotAfterPrevious { date: NaiveDate, previous: NaiveDate },
    DateNotBeforeNext { date: NaiveDate, next: NaiveDate },
    HoursBelowPrevious { hours: Decimal2, previous: Decimal2 },
    HoursAboveNext { hours: Decimal2, next: Decimal2 },
    CyclesBelowPrevious { cycles: i64, previous: i64 },
    CyclesAboveNext { cycles: i64, next: i64 },
}

impl Display for ComplianceOrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DateNotAfterPrevious { date, previous } => write!(
                f,
                "perform_date {date} must be after previous compliance date {previous}"
            ),
            Self::DateNotBeforeNext { date, next } => write!(
                f,
                "perform_date {date} must be before next compliance date {next}"
            ),
            Self::HoursBelowPrevious { hours, previous } => write!(
                f,
                "perform_hrs {hours} must not be below previous compliance hours {previous}"
            ),
            Self::HoursAboveNext { hours, next } => write!(
                f,
                "perform_hrs {hours} must not exceed next compliance hours {next}"
            ),
            Self::CyclesBelowPrevious { cycles, previous } => write!(
                f,
                "perform_cyc {cycles} must not be below previous compliance cycles {previous}"
            ),
            Self::CyclesAboveNext { cycles, next } => write!(
                f,
                "perform_cyc {cycles} must not exceed next compliance cycles {next}"
            ),
        }
    }
}

impl Error for ComplianceOrderError {}
