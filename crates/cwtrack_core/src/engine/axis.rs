//! Per-axis strategy shared by every engine step.
//!
//! The projection procedure is written once against `DueAxis`; each axis
//! supplies its value type, its accessors on the records, and its step
//! arithmetic (calendar-aware for dates, linear for hours and cycles).

use super::tolerance::{calendar_window, cycles_window, hours_window, ToleranceWindow};
use super::{EngineError, EngineResult};
use crate::model::compliance::Compliance;
use crate::model::decimal::Decimal2;
use crate::model::requirement::{CalendarDue, Requirement};
use crate::model::units::{Axis, DueMonthsUnit};
use chrono::{Days, Months, NaiveDate};
use std::fmt::{Debug, Display};

/// One due-tracking dimension.
pub trait DueAxis {
    const AXIS: Axis;

    /// Performed / next-due value type.
    type Value: Copy + PartialOrd + Debug + Display;
    /// Configured due interval.
    type Due: Copy + Debug;
    /// Signed drift recorded as the adjustment.
    type Drift: Copy + PartialEq + Debug + Display;

    /// Due interval, `None` when the axis is not tracked.
    fn due(requirement: &Requirement) -> Option<Self::Due>;

    fn performed(compliance: &Compliance) -> Option<Self::Value>;

    fn next_due(compliance: &Compliance) -> Option<Self::Value>;

    fn adjustment(compliance: &Compliance) -> Option<Self::Drift>;

    fn set_next_due(compliance: &mut Compliance, value: Option<Self::Value>);

    fn set_adjustment(compliance: &mut Compliance, value: Option<Self::Drift>);

    fn window(
        anchor: Self::Value,
        due: Self::Due,
        requirement: &Requirement,
    ) -> EngineResult<ToleranceWindow<Self::Value>>;

    /// Projects one due interval forward from `anchor`.
    fn step(anchor: Self::Value, due: Self::Due) -> EngineResult<Self::Value>;

    /// `performed - expected`; positive when performed late.
    fn drift(performed: Self::Value, expected: Self::Value) -> EngineResult<Self::Drift>;

    /// Nulls both engine-owned fields of this axis.
    fn clear(compliance: &mut Compliance) {
        Self::set_next_due(compliance, None);
        Self::set_adjustment(compliance, None);
    }
}

/// Calendar axis: dates, due in calendar months or exact days.
pub struct CalendarAxis;

/// Flight-hours axis.
pub struct HoursAxis;

/// Flight-cycles axis.
pub struct CyclesAxis;

impl DueAxis for CalendarAxis {
    const AXIS: Axis = Axis::Calendar;
    type Value = NaiveDate;
    type Due = CalendarDue;
    type Drift = i64;

    fn due(requirement: &Requirement) -> Option<Self::Due> {
        requirement.calendar_due()
    }

    fn performed(compliance: &Compliance) -> Option<Self::Value> {
        Some(compliance.perform_date)
    }

    fn next_due(compliance: &Compliance) -> Option<Self::Value> {
        compliance.next_due_date
    }

    fn adjustment(compliance: &Compliance) -> Option<Self::Drift> {
        compliance.adj_mos
    }

    fn set_next_due(compliance: &mut Compliance, value: Option<Self::Value>) {
        compliance.next_due_date = value;
    }

    fn set_adjustment(compliance: &mut Compliance, value: Option<Self::Drift>) {
        compliance.adj_mos = value;
    }

    fn window(
        anchor: Self::Value,
        due: Self::Due,
        requirement: &Requirement,
    ) -> EngineResult<ToleranceWindow<Self::Value>> {
        calendar_window(anchor, due, &requirement.calendar_tolerance())
    }

    fn step(anchor: Self::Value, due: Self::Due) -> EngineResult<Self::Value> {
        match due.unit {
            DueMonthsUnit::Months => anchor.checked_add_months(Months::new(due.amount)),
            DueMonthsUnit::Days => anchor.checked_add_days(Days::new(u64::from(due.amount))),
        }
        .ok_or(EngineError::OutOfRange { axis: Self::AXIS })
    }

    fn drift(performed: Self::Value, expected: Self::Value) -> EngineResult<Self::Drift> {
        Ok(performed.signed_duration_since(expected).num_days())
    }
}

impl DueAxis for HoursAxis {
    const AXIS: Axis = Axis::Hours;
    type Value = Decimal2;
    type Due = Decimal2;
    type Drift = Decimal2;

    fn due(requirement: &Requirement) -> Option<Self::Due> {
        requirement.hours_due()
    }

    fn performed(compliance: &Compliance) -> Option<Self::Value> {
        compliance.perform_hrs
    }

    fn next_due(compliance: &Compliance) -> Option<Self::Value> {
        compliance.next_due_hrs
    }

    fn adjustment(compliance: &Compliance) -> Option<Self::Drift> {
        compliance.adj_hrs
    }

    fn set_next_due(compliance: &mut Compliance, value: Option<Self::Value>) {
        compliance.next_due_hrs = value;
    }

    fn set_adjustment(compliance: &mut Compliance, value: Option<Self::Drift>) {
        compliance.adj_hrs = value;
    }

    fn window(
        anchor: Self::Value,
        due: Self::Due,
        requirement: &Requirement,
    ) -> EngineResult<ToleranceWindow<Self::Value>> {
        hours_window(anchor, due, &requirement.hours_tolerance())
    }

    fn step(anchor: Self::Value, due: Self::Due) -> EngineResult<Self::Value> {
        anchor
            .checked_add(due)
            .ok_or(EngineError::OutOfRange { axis: Self::AXIS })
    }

    fn drift(performed: Self::Value, expected: Self::Value) -> EngineResult<Self::Drift> {
        performed
            .checked_sub(expected)
            .ok_or(EngineError::OutOfRange { axis: Self::AXIS })
    }
}

impl DueAxis for CyclesAxis {
    const AXIS: Axis = Axis::Cycles;
    type Value = i64;
    type Due = i64;
    type Drift = i64;

    fn due(requirement: &Requirement) -> Option<Self::Due> {
        requirement.cycles_due()
    }

    fn performed(compliance: &Compliance) -> Option<Self::Value> {
        compliance.perform_cyc
    }

    fn next_due(compliance: &Compliance) -> Option<Self::Value> {
        compliance.next_due_cyc
    }

    fn adjustment(compliance: &Compliance) -> Option<Self::Drift> {
        compliance.adj_cyc
    }

    fn set_next_due(compliance: &mut Compliance, value: Option<Self::Value>) {
        compliance.next_due_cyc = value;
    }

    fn set_adjustment(compliance: &mut Compliance, value: Option<Self::Drift>) {
        compliance.adj_cyc = value;
    }

    fn window(
        anchor: Self::Value,
        due: Self::Due,
        requirement: &Requirement,
    ) -> EngineResult<ToleranceWindow<Self::Value>> {
        cycles_window(anchor, due, &requirement.cycles_tolerance())
    }

    fn step(anchor: Self::Value, due: Self::Due) -> EngineResult<Self::Value> {
        anchor
            .checked_add(due)
            .ok_or(EngineError::OutOfRange { axis: Self::AXIS })
    }

    fn drift(performed: Self::Value, expected: Self::Value) -> EngineResult<Self::Drift> {
        performed
            .checked_sub(expected)
            .ok_or(EngineError::OutOfRange { axis: Self::AXIS })
    }
}

#[cfg(test)]
mod tests {
    use super::{CalendarAxis, DueAxis, HoursAxis};
    use crate::model::decimal::Decimal2;
    use crate::model::requirement::CalendarDue;
    use crate::model::units::DueMonthsUnit;
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn calendar_months_clamp_to_month_end() {
        let due = CalendarDue {
            amount: 1,
            unit: DueMonthsUnit::Months,
        };
        assert_eq!(
            CalendarAxis::step(date("2019-01-31"), due).expect("step"),
            date("2019-02-28")
        );
    }

    #[test]
    fn calendar_days_step_is_exact() {
        let due = CalendarDue {
            amount: 30,
            unit: DueMonthsUnit::Days,
        };
        assert_eq!(
            CalendarAxis::step(date("2020-02-01"), due).expect("step"),
            date("2020-03-02")
        );
    }

    #[test]
    fn calendar_drift_is_positive_when_late() {
        assert_eq!(
            CalendarAxis::drift(date("2019-07-13"), date("2019-07-01")).expect("drift"),
            12
        );
        assert_eq!(
            CalendarAxis::drift(date("2019-06-19"), date("2019-07-01")).expect("drift"),
            -12
        );
    }

    #[test]
    fn hours_step_is_linear() {
        assert_eq!(
            HoursAxis::step(Decimal2::from_hundredths(600_000), Decimal2::from_hundredths(100_000))
                .expect("step"),
            Decimal2::from_hundredths(700_000)
        );
    }
}
