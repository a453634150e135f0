//! Adjustment detection.
//!
//! A shift exists when the previous compliance projected a next-due value
//! that the latest compliance did not hit exactly. The shift is absorbed when
//! the latest performance still lands inside the tolerance window around
//! that projected value.

use super::axis::DueAxis;
use super::EngineResult;
use crate::model::compliance::Compliance;
use crate::model::requirement::Requirement;

/// Returns whether the previous projection on axis `A` differs from the
/// latest performed value.
///
/// False without a previous compliance, without a previous next-due value,
/// or without a latest reading on that axis.
pub fn has_shift<A: DueAxis>(latest: &Compliance, previous: Option<&Compliance>) -> bool {
    let Some(theoretical) = previous.and_then(A::next_due) else {
        return false;
    };
    match A::performed(latest) {
        Some(performed) => performed != theoretical,
        None => false,
    }
}

/// Returns whether the latest performed value on axis `A` lies inside the
/// inclusive tolerance window anchored at the previous next-due value.
///
/// False when the axis has no due amount or either value is missing.
pub fn is_within_tolerance<A: DueAxis>(
    latest: &Compliance,
    previous: Option<&Compliance>,
    requirement: &Requirement,
) -> EngineResult<bool> {
    let (Some(due), Some(theoretical), Some(performed)) = (
        A::due(requirement),
        previous.and_then(A::next_due),
        A::performed(latest),
    ) else {
        return Ok(false);
    };
    let window = A::window(theoretical, due, requirement)?;
    Ok(window.contains(performed))
}

#[cfg(test)]
mod tests {
    use super::{has_shift, is_within_tolerance};
    use crate::engine::axis::{CalendarAxis, HoursAxis};
    use crate::model::compliance::Compliance;
    use crate::model::decimal::Decimal2;
    use crate::model::requirement::Requirement;
    use crate::model::units::{CalendarToleranceUnit, DueMonthsUnit};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    fn pair(previous_due: &str, performed: &str) -> (Compliance, Compliance) {
        let task_uuid = Uuid::new_v4();
        let mut previous = Compliance::new(task_uuid, date("2019-01-01"));
        previous.next_due_date = Some(date(previous_due));
        let latest = Compliance::new(task_uuid, date(performed));
        (previous, latest)
    }

    fn requirement_with_day_tolerance(positive: i64, negative: i64) -> Requirement {
        let mut requirement = Requirement::new(Uuid::new_v4());
        requirement.due_months = Some(6);
        requirement.due_months_unit = Some(DueMonthsUnit::Months);
        requirement.tol_pos_mos = Some(Decimal2::checked_from_whole(positive).unwrap());
        requirement.tol_neg_mos = Some(Decimal2::checked_from_whole(negative).unwrap());
        requirement.tol_mos_unit = Some(CalendarToleranceUnit::Days);
        requirement
    }

    #[test]
    fn first_compliance_has_no_shift() {
        let latest = Compliance::new(Uuid::new_v4(), date("2019-01-01"));
        assert!(!has_shift::<CalendarAxis>(&latest, None));
    }

    #[test]
    fn exact_hit_is_not_a_shift() {
        let (previous, latest) = pair("2019-07-01", "2019-07-01");
        assert!(!has_shift::<CalendarAxis>(&latest, Some(&previous)));
    }

    #[test]
    fn missing_reading_is_not_a_shift() {
        let task_uuid = Uuid::new_v4();
        let mut previous = Compliance::new(task_uuid, date("2019-01-01"));
        previous.next_due_hrs = Some(Decimal2::from_hundredths(700_000));
        let latest = Compliance::new(task_uuid, date("2019-07-01"));
        assert!(!has_shift::<HoursAxis>(&latest, Some(&previous)));
    }

    #[test]
    fn late_performance_inside_window_is_absorbed() {
        let (previous, latest) = pair("2019-07-01", "2019-07-13");
        let requirement = requirement_with_day_tolerance(12, 12);
        assert!(has_shift::<CalendarAxis>(&latest, Some(&previous)));
        assert!(
            is_within_tolerance::<CalendarAxis>(&latest, Some(&previous), &requirement)
                .expect("window")
        );
    }

    #[test]
    fn performance_past_window_is_not_absorbed() {
        let (previous, latest) = pair("2019-07-01", "2019-07-14");
        let requirement = requirement_with_day_tolerance(12, 12);
        assert!(
            !is_within_tolerance::<CalendarAxis>(&latest, Some(&previous), &requirement)
                .expect("window")
        );
    }

    #[test]
    fn axis_without_due_is_never_within_tolerance() {
        let task_uuid = Uuid::new_v4();
        let mut previous = Compliance::new(task_uuid, date("2019-01-01"));
        previous.next_due_hrs = Some(Decimal2::from_hundredths(700_000));
        let latest =
            Compliance::new(task_uuid, date("2019-07-01")).with_hours(Decimal2::from_hundredths(700_000));
        let requirement = requirement_with_day_tolerance(12, 12);
        assert!(
            !is_within_tolerance::<HoursAxis>(&latest, Some(&previous), &requirement)
                .expect("window")
        );
    }
}
