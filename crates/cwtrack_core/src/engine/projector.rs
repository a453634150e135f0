//! Anchor selection and due projection.
//!
//! # Invariants
//! - Axes are evaluated in `Axis::ALL` order: calendar, hours, cycles.
//! - Each pass recomputes from the inputs alone; the only carried state is
//!   whether the latest compliance already holds an adjustment (sticky
//!   policy).
//! - A compliance without a previous compliance never holds an adjustment.

use super::axis::{CalendarAxis, CyclesAxis, DueAxis, HoursAxis};
use super::detector::{has_shift, is_within_tolerance};
use super::recorder::record_adjustment;
use super::{EngineError, EngineResult};
use crate::config::{AdjustmentPolicy, EngineConfig};
use crate::model::compliance::Compliance;
use crate::model::requirement::Requirement;
use crate::model::units::Axis;
use log::debug;
use serde::Serialize;

/// Scheduling state of one axis on the latest compliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisState {
    /// No active requirement or no due amount on this axis; fields are null.
    NoRequirementDue,
    /// Due amount configured but the compliance carries no reading.
    Unmeasured,
    /// Next due counted from the actual performance.
    ProjectedUnadjusted,
    /// Next due counted from the previous theoretical due value.
    ProjectedAdjusted,
}

impl AxisState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoRequirementDue => "no_requirement_due",
            Self::Unmeasured => "unmeasured",
            Self::ProjectedUnadjusted => "projected_unadjusted",
            Self::ProjectedAdjusted => "projected_adjusted",
        }
    }
}

/// Per-axis result of one schedule computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScheduleOutcome {
    pub calendar: AxisState,
    pub hours: AxisState,
    pub cycles: AxisState,
}

impl ScheduleOutcome {
    /// Outcome when no requirement applies at all.
    pub fn unscheduled() -> Self {
        Self {
            calendar: AxisState::NoRequirementDue,
            hours: AxisState::NoRequirementDue,
            cycles: AxisState::NoRequirementDue,
        }
    }

    pub fn state(&self, axis: Axis) -> AxisState {
        match axis {
            Axis::Calendar => self.calendar,
            Axis::Hours => self.hours,
            Axis::Cycles => self.cycles,
        }
    }

    fn slot_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::Calendar => &mut self.calendar,
            Axis::Hours => &mut self.hours,
            Axis::Cycles => &mut self.cycles,
        }
    }
}

/// Recomputes every engine-owned field of `latest`.
///
/// `requirement` is the task's active requirement and `previous` the
/// compliance performed immediately before `latest`. A missing or deleted
/// requirement nulls all axes. On error `latest` may be partially updated;
/// callers must discard it.
pub fn compute_schedule(
    requirement: Option<&Requirement>,
    latest: &mut Compliance,
    previous: Option<&Compliance>,
    config: &EngineConfig,
) -> EngineResult<ScheduleOutcome> {
    let Some(requirement) = requirement.filter(|requirement| !requirement.is_deleted) else {
        latest.clear_schedule();
        return Ok(ScheduleOutcome::unscheduled());
    };
    requirement
        .validate()
        .map_err(EngineError::InvalidConfiguration)?;

    let policy = config.adjustment_policy;
    let mut outcome = ScheduleOutcome::unscheduled();
    for axis in Axis::ALL {
        let state = match axis {
            Axis::Calendar => project_axis::<CalendarAxis>(requirement, latest, previous, policy)?,
            Axis::Hours => project_axis::<HoursAxis>(requirement, latest, previous, policy)?,
            Axis::Cycles => project_axis::<CyclesAxis>(requirement, latest, previous, policy)?,
        };
        *outcome.slot_mut(axis) = state;
    }
    Ok(outcome)
}

/// Runs anchor selection, projection and adjustment recording for axis `A`.
pub fn project_axis<A: DueAxis>(
    requirement: &Requirement,
    latest: &mut Compliance,
    previous: Option<&Compliance>,
    policy: AdjustmentPolicy,
) -> EngineResult<AxisState> {
    let Some(due) = A::due(requirement) else {
        A::clear(latest);
        return Ok(AxisState::NoRequirementDue);
    };
    let Some(performed) = A::performed(latest) else {
        A::clear(latest);
        return Ok(AxisState::Unmeasured);
    };

    let theoretical = previous.and_then(A::next_due);
    let (anchor, adjusted) = match theoretical {
        Some(theoretical)
            if has_shift::<A>(latest, previous)
                && is_within_tolerance::<A>(latest, previous, requirement)? =>
        {
            (theoretical, true)
        }
        _ => (performed, false),
    };

    let next_due = A::step(anchor, due)?;
    A::set_next_due(latest, Some(next_due));

    let carries_adjustment =
        policy == AdjustmentPolicy::Sticky && A::adjustment(latest).is_some();
    if previous.is_some() && (adjusted || carries_adjustment) {
        record_adjustment::<A>(latest, anchor)?;
    } else {
        A::set_adjustment(latest, None);
    }

    debug!(
        "event=axis_projected module=engine axis={} performed={} anchor={} next_due={} adjusted={}",
        A::AXIS,
        performed,
        anchor,
        next_due,
        adjusted
    );

    Ok(if adjusted {
        AxisState::ProjectedAdjusted
    } else {
        AxisState::ProjectedUnadjusted
    })
}

#[cfg(test)]
mod tests {
    use super::{compute_schedule, AxisState, ScheduleOutcome};
    use crate::config::EngineConfig;
    use crate::model::compliance::Compliance;
    use crate::model::decimal::Decimal2;
    use crate::model::requirement::Requirement;
    use crate::model::units::Axis;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn each_axis_reports_its_own_state() {
        let task_uuid = Uuid::new_v4();
        let mut requirement = Requirement::new(task_uuid);
        requirement.due_hrs = Some(Decimal2::from_hundredths(60_000));
        requirement.due_cyc = Some(500);
        let mut latest = Compliance::new(task_uuid, date("2020-03-01"))
            .with_hours(Decimal2::from_hundredths(10_000));

        let outcome =
            compute_schedule(Some(&requirement), &mut latest, None, &EngineConfig::default())
                .expect("schedule");

        assert_eq!(outcome.state(Axis::Calendar), AxisState::NoRequirementDue);
        assert_eq!(outcome.state(Axis::Hours), AxisState::ProjectedUnadjusted);
        assert_eq!(outcome.state(Axis::Cycles), AxisState::Unmeasured);
        assert_eq!(latest.next_due_hrs, Some(Decimal2::from_hundredths(70_000)));
        assert_eq!(latest.next_due_cyc, None);
    }

    #[test]
    fn deleted_requirement_clears_every_axis() {
        let task_uuid = Uuid::new_v4();
        let mut requirement = Requirement::new(task_uuid);
        requirement.due_cyc = Some(500);
        requirement.is_deleted = true;
        let mut latest = Compliance::new(task_uuid, date("2020-03-01")).with_cycles(100);
        latest.next_due_cyc = Some(600);

        let outcome =
            compute_schedule(Some(&requirement), &mut latest, None, &EngineConfig::default())
                .expect("schedule");

        assert_eq!(outcome, ScheduleOutcome::unscheduled());
        for axis in Axis::ALL {
            assert_eq!(outcome.state(axis), AxisState::NoRequirementDue);
        }
        assert_eq!(latest.next_due_cyc, None);
    }
}
