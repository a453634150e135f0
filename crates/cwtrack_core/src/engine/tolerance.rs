//! Tolerance window calculation.
//!
//! # Invariants
//! - Pure: no I/O, no logging, deterministic for equal inputs.
//! - A side without a configured tolerance collapses onto the anchor.
//! - Every tolerance magnitude is rounded away from the anchor, so a window
//!   never shrinks through rounding.

use super::axis::DueAxis;
use super::{EngineError, EngineResult};
use crate::model::decimal::Decimal2;
use crate::model::requirement::{CalendarDue, Requirement, RequirementValidationError, Tolerance};
use crate::model::units::{
    Axis, CalendarToleranceUnit, CyclesToleranceUnit, DueMonthsUnit, HoursToleranceUnit,
};
use chrono::{Days, Months, NaiveDate};

/// Inclusive `[lower, upper]` band around a theoretical due value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToleranceWindow<T> {
    pub lower: T,
    pub upper: T,
}

impl<T: Copy + PartialOrd> ToleranceWindow<T> {
    /// Zero-width window at `anchor`.
    pub fn collapsed(anchor: T) -> Self {
        Self {
            lower: anchor,
            upper: anchor,
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Tolerance window of axis `A` around `anchor`.
///
/// Returns `None` when the requirement has no due amount on that axis.
pub fn window<A: DueAxis>(
    anchor: A::Value,
    requirement: &Requirement,
) -> EngineResult<Option<ToleranceWindow<A::Value>>> {
    match A::due(requirement) {
        Some(due) => A::window(anchor, due, requirement).map(Some),
        None => Ok(None),
    }
}

/// Days in a month for fractional-month and percentage conversions,
/// expressed as `DAYS_PER_MONTH_X2 / 2` to stay in integer arithmetic.
const DAYS_PER_MONTH_X2: i128 = 61;
const HUNDREDTHS: i128 = 100;
const PERCENT_HUNDREDTHS: i128 = 100 * HUNDREDTHS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Later,
    Earlier,
}

/// Calendar window. Month amounts move by calendar months, fractional months
/// and percentages are converted to days.
pub fn calendar_window(
    anchor: NaiveDate,
    due: CalendarDue,
    tolerance: &Tolerance<CalendarToleranceUnit>,
) -> EngineResult<ToleranceWindow<NaiveDate>> {
    let mut window = ToleranceWindow::collapsed(anchor);
    if let Some(amount) = tolerance.positive {
        let unit = tolerance_unit(tolerance, Axis::Calendar)?;
        window.upper = calendar_bound(anchor, amount, unit, due, Side::Later)?;
    }
    if let Some(amount) = tolerance.negative {
        let unit = tolerance_unit(tolerance, Axis::Calendar)?;
        window.lower = calendar_bound(anchor, amount, unit, due, Side::Earlier)?;
    }
    Ok(window)
}

/// Flight-hours window, exact to the hundredth.
pub fn hours_window(
    anchor: Decimal2,
    due: Decimal2,
    tolerance: &Tolerance<HoursToleranceUnit>,
) -> EngineResult<ToleranceWindow<Decimal2>> {
    let out_of_range = || EngineError::OutOfRange { axis: Axis::Hours };
    let offset = |amount: Decimal2| -> EngineResult<Decimal2> {
        match tolerance_unit(tolerance, Axis::Hours)? {
            HoursToleranceUnit::Hours => Ok(amount),
            HoursToleranceUnit::Percent => {
                let hundredths = ceil_div(
                    i128::from(due.hundredths()) * i128::from(amount.hundredths()),
                    PERCENT_HUNDREDTHS,
                );
                i64::try_from(hundredths)
                    .map(Decimal2::from_hundredths)
                    .map_err(|_| out_of_range())
            }
        }
    };

    let mut window = ToleranceWindow::collapsed(anchor);
    if let Some(amount) = tolerance.positive {
        window.upper = anchor.checked_add(offset(amount)?).ok_or_else(out_of_range)?;
    }
    if let Some(amount) = tolerance.negative {
        window.lower = anchor.checked_sub(offset(amount)?).ok_or_else(out_of_range)?;
    }
    Ok(window)
}

/// Flight-cycles window, widened to whole cycles.
pub fn cycles_window(
    anchor: i64,
    due: i64,
    tolerance: &Tolerance<CyclesToleranceUnit>,
) -> EngineResult<ToleranceWindow<i64>> {
    let out_of_range = || EngineError::OutOfRange { axis: Axis::Cycles };
    let offset = |amount: Decimal2| -> EngineResult<i64> {
        let cycles = match tolerance_unit(tolerance, Axis::Cycles)? {
            CyclesToleranceUnit::Cycles => ceil_div(i128::from(amount.hundredths()), HUNDREDTHS),
            CyclesToleranceUnit::Percent => ceil_div(
                i128::from(due) * i128::from(amount.hundredths()),
                PERCENT_HUNDREDTHS,
            ),
        };
        i64::try_from(cycles).map_err(|_| out_of_range())
    };

    let mut window = ToleranceWindow::collapsed(anchor);
    if let Some(amount) = tolerance.positive {
        window.upper = anchor.checked_add(offset(amount)?).ok_or_else(out_of_range)?;
    }
    if let Some(amount) = tolerance.negative {
        window.lower = anchor.checked_sub(offset(amount)?).ok_or_else(out_of_range)?;
    }
    Ok(window)
}

fn calendar_bound(
    anchor: NaiveDate,
    amount: Decimal2,
    unit: CalendarToleranceUnit,
    due: CalendarDue,
    side: Side,
) -> EngineResult<NaiveDate> {
    match unit {
        CalendarToleranceUnit::Months => {
            let months = u32::try_from(amount.whole()).map_err(|_| calendar_out_of_range())?;
            let days = ceil_div(
                i128::from(amount.fraction_hundredths()) * DAYS_PER_MONTH_X2,
                2 * HUNDREDTHS,
            );
            let shifted = shift_months(anchor, months, side)?;
            shift_days(shifted, days, side)
        }
        CalendarToleranceUnit::Days => shift_days(anchor, i128::from(amount.whole()), side),
        CalendarToleranceUnit::Percent => {
            let base_days_x2 = match due.unit {
                DueMonthsUnit::Months => i128::from(due.amount) * DAYS_PER_MONTH_X2,
                DueMonthsUnit::Days => i128::from(due.amount) * 2,
            };
            let days = ceil_div(
                base_days_x2 * i128::from(amount.hundredths()),
                2 * PERCENT_HUNDREDTHS,
            );
            shift_days(anchor, days, side)
        }
    }
}

fn shift_months(date: NaiveDate, months: u32, side: Side) -> EngineResult<NaiveDate> {
    let months = Months::new(months);
    match side {
        Side::Later => date.checked_add_months(months),
        Side::Earlier => date.checked_sub_months(months),
    }
    .ok_or_else(calendar_out_of_range)
}

fn shift_days(date: NaiveDate, days: i128, side: Side) -> EngineResult<NaiveDate> {
    let days = u64::try_from(days)
        .map(Days::new)
        .map_err(|_| calendar_out_of_range())?;
    match side {
        Side::Later => date.checked_add_days(days),
        Side::Earlier => date.checked_sub_days(days),
    }
    .ok_or_else(calendar_out_of_range)
}

fn calendar_out_of_range() -> EngineError {
    EngineError::OutOfRange {
        axis: Axis::Calendar,
    }
}

fn tolerance_unit<U: Copy>(tolerance: &Tolerance<U>, axis: Axis) -> EngineResult<U> {
    tolerance
        .unit
        .ok_or(EngineError::InvalidConfiguration(
            RequirementValidationError::ToleranceWithoutUnit(axis),
        ))
}

/// Ceiling division for a non-negative numerator and positive divisor.
fn ceil_div(numerator: i128, divisor: i128) -> i128 {
    if numerator <= 0 {
        return numerator / divisor;
    }
    (numerator + divisor - 1) / divisor
}

#[cfg(test)]
mod tests {
    use super::{calendar_window, cycles_window, hours_window, window, ToleranceWindow};
    use crate::engine::axis::{CyclesAxis, HoursAxis};
    use crate::model::decimal::Decimal2;
    use crate::model::requirement::{CalendarDue, Requirement, Tolerance};
    use crate::model::units::{
        CalendarToleranceUnit, CyclesToleranceUnit, DueMonthsUnit, HoursToleranceUnit,
    };
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn months(amount: u32) -> CalendarDue {
        CalendarDue {
            amount,
            unit: DueMonthsUnit::Months,
        }
    }

    fn calendar(
        positive: Option<f64>,
        negative: Option<f64>,
        unit: CalendarToleranceUnit,
    ) -> Tolerance<CalendarToleranceUnit> {
        Tolerance {
            positive: positive.map(|value| Decimal2::try_from(value).expect("finite")),
            negative: negative.map(|value| Decimal2::try_from(value).expect("finite")),
            unit: Some(unit),
        }
    }

    #[test]
    fn missing_sides_collapse_onto_anchor() {
        let anchor = date("2019-07-01");
        let window = calendar_window(
            anchor,
            months(6),
            &Tolerance {
                positive: None,
                negative: None,
                unit: None,
            },
        )
        .expect("window");
        assert_eq!(window, ToleranceWindow::collapsed(anchor));
        assert!(window.contains(anchor));
        assert!(!window.contains(date("2019-07-02")));
    }

    #[test]
    fn day_tolerance_is_exact() {
        let window = calendar_window(
            date("2019-07-01"),
            months(6),
            &calendar(Some(12.0), Some(12.0), CalendarToleranceUnit::Days),
        )
        .expect("window");
        assert_eq!(window.lower, date("2019-06-19"));
        assert_eq!(window.upper, date("2019-07-13"));
    }

    #[test]
    fn whole_month_tolerance_moves_by_calendar_months() {
        let window = calendar_window(
            date("2019-07-01"),
            months(6),
            &calendar(Some(1.0), Some(1.0), CalendarToleranceUnit::Months),
        )
        .expect("window");
        assert_eq!(window.lower, date("2019-06-01"));
        assert_eq!(window.upper, date("2019-08-01"));
    }

    #[test]
    fn fractional_month_tolerance_adds_rounded_up_days() {
        // 0.5 month = 15.25 days -> 16 days on each side.
        let window = calendar_window(
            date("2019-07-01"),
            months(6),
            &calendar(Some(1.5), Some(1.5), CalendarToleranceUnit::Months),
        )
        .expect("window");
        assert_eq!(window.upper, date("2019-08-17"));
        assert_eq!(window.lower, date("2019-05-16"));
    }

    #[test]
    fn percent_tolerance_rounds_away_from_anchor() {
        // 183 days * 20.2% = 36.97 -> +37; 183 days * 20.9% = 38.25 -> -39.
        let window = calendar_window(
            date("2019-07-01"),
            months(6),
            &calendar(Some(20.2), Some(20.9), CalendarToleranceUnit::Percent),
        )
        .expect("window");
        assert_eq!(window.upper, date("2019-08-07"));
        assert_eq!(window.lower, date("2019-05-23"));
    }

    #[test]
    fn percent_of_day_interval_uses_due_days() {
        // 180 days * 12.25% = 22.05 -> 23 days.
        let window = calendar_window(
            date("2020-07-30"),
            CalendarDue {
                amount: 180,
                unit: DueMonthsUnit::Days,
            },
            &calendar(Some(12.25), Some(12.25), CalendarToleranceUnit::Percent),
        )
        .expect("window");
        assert_eq!(window.upper, date("2020-08-22"));
        assert_eq!(window.lower, date("2020-07-07"));
    }

    #[test]
    fn hours_percent_tolerance_is_exact_to_hundredths() {
        let window = hours_window(
            Decimal2::from_hundredths(700_000),
            Decimal2::from_hundredths(100_000),
            &Tolerance {
                positive: Some(Decimal2::from_hundredths(1098)),
                negative: None,
                unit: Some(HoursToleranceUnit::Percent),
            },
        )
        .expect("window");
        assert_eq!(window.upper, Decimal2::from_hundredths(710_980));
        assert_eq!(window.lower, Decimal2::from_hundredths(700_000));
    }

    #[test]
    fn hours_unit_tolerance_is_applied_directly() {
        let window = hours_window(
            Decimal2::from_hundredths(700_000),
            Decimal2::from_hundredths(100_000),
            &Tolerance {
                positive: Some(Decimal2::from_hundredths(2550)),
                negative: Some(Decimal2::from_hundredths(1_000)),
                unit: Some(HoursToleranceUnit::Hours),
            },
        )
        .expect("window");
        assert_eq!(window.upper, Decimal2::from_hundredths(702_550));
        assert_eq!(window.lower, Decimal2::from_hundredths(699_000));
    }

    #[test]
    fn cycles_percent_tolerance_widens_to_whole_cycles() {
        // 500 cycles * 2.5% = 12.5 -> 13 cycles.
        let window = cycles_window(
            1500,
            500,
            &Tolerance {
                positive: Some(Decimal2::from_hundredths(250)),
                negative: Some(Decimal2::from_hundredths(250)),
                unit: Some(CyclesToleranceUnit::Percent),
            },
        )
        .expect("window");
        assert_eq!(window.upper, 1513);
        assert_eq!(window.lower, 1487);
    }

    #[test]
    fn amount_without_unit_is_invalid_configuration() {
        let err = cycles_window(
            1500,
            500,
            &Tolerance {
                positive: Some(Decimal2::from_hundredths(500)),
                negative: None,
                unit: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, super::EngineError::InvalidConfiguration(_)));
    }

    #[test]
    fn window_is_none_without_due_on_axis() {
        let mut requirement = Requirement::new(uuid::Uuid::new_v4());
        requirement.due_hrs = Some(Decimal2::from_hundredths(100_000));
        requirement.tol_pos_hrs = Some(Decimal2::from_hundredths(5_000));
        requirement.tol_hrs_unit = Some(HoursToleranceUnit::Hours);

        let hours = window::<HoursAxis>(Decimal2::from_hundredths(700_000), &requirement)
            .expect("hours window")
            .expect("hours due configured");
        assert_eq!(hours.lower, Decimal2::from_hundredths(700_000));
        assert_eq!(hours.upper, Decimal2::from_hundredths(705_000));

        assert_eq!(
            window::<CyclesAxis>(1500, &requirement).expect("cycles window"),
            None
        );
    }
}
