use chrono::NaiveDate;
use cwtrack_core::{
    AxisState, CalendarToleranceUnit, Compliance, Decimal2, DueMonthsUnit, EngineConfig,
    MaintenanceService, MemoryStore, Requirement, TaskId,
};

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

fn amount(value: f64) -> Decimal2 {
    Decimal2::try_from(value).expect("finite amount")
}

struct CalendarRule {
    due: u32,
    unit: DueMonthsUnit,
    positive: Option<f64>,
    negative: Option<f64>,
    tolerance_unit: Option<CalendarToleranceUnit>,
}

impl CalendarRule {
    fn months(due: u32) -> Self {
        Self {
            due,
            unit: DueMonthsUnit::Months,
            positive: None,
            negative: None,
            tolerance_unit: None,
        }
    }

    fn days(due: u32) -> Self {
        Self {
            unit: DueMonthsUnit::Days,
            ..Self::months(due)
        }
    }

    fn tolerance(
        mut self,
        positive: Option<f64>,
        negative: Option<f64>,
        unit: CalendarToleranceUnit,
    ) -> Self {
        self.positive = positive;
        self.negative = negative;
        self.tolerance_unit = Some(unit);
        self
    }

    fn into_requirement(self, task_uuid: TaskId) -> Requirement {
        let mut requirement = Requirement::new(task_uuid);
        requirement.due_months = Some(self.due);
        requirement.due_months_unit = Some(self.unit);
        requirement.tol_pos_mos = self.positive.map(amount);
        requirement.tol_neg_mos = self.negative.map(amount);
        requirement.tol_mos_unit = self.tolerance_unit;
        requirement.is_active = true;
        requirement
    }
}

/// Records `dates` in order and returns every compliance as stored after
/// the final recompute.
fn replay(rule: CalendarRule, dates: &[&str]) -> Vec<Compliance> {
    let service = MaintenanceService::new(MemoryStore::new(), EngineConfig::default());
    let task = service.create_task("00-IJM-001", "wheel inspection").unwrap();
    service
        .create_requirement(rule.into_requirement(task.uuid))
        .unwrap();
    for value in dates {
        service
            .record_compliance(Compliance::new(task.uuid, date(value)))
            .unwrap();
    }
    service.list_compliances(task.uuid).unwrap()
}

fn next_due(rule: CalendarRule, dates: &[&str]) -> Option<NaiveDate> {
    replay(rule, dates).last().and_then(|latest| latest.next_due_date)
}

#[test]
fn first_compliance_projects_from_performance() {
    let months = replay(CalendarRule::months(6), &["2019-01-01"]);
    assert_eq!(months[0].next_due_date, Some(date("2019-07-01")));
    assert_eq!(months[0].adj_mos, None);

    let days = replay(CalendarRule::days(6), &["2019-01-01"]);
    assert_eq!(days[0].next_due_date, Some(date("2019-01-07")));
}

#[test]
fn late_performance_inside_day_tolerance_keeps_schedule() {
    let rule = CalendarRule::months(6).tolerance(Some(12.0), Some(12.0), CalendarToleranceUnit::Days);
    let compliances = replay(rule, &["2019-01-01", "2019-07-13"]);

    assert_eq!(compliances[1].next_due_date, Some(date("2020-01-01")));
    assert_eq!(compliances[1].adj_mos, Some(12));
    assert_eq!(compliances[0].adj_mos, None);
}

#[test]
fn early_performance_inside_day_tolerance_keeps_schedule() {
    let rule = CalendarRule::months(6).tolerance(Some(12.0), Some(12.0), CalendarToleranceUnit::Days);
    let compliances = replay(rule, &["2019-01-01", "2019-06-19"]);

    assert_eq!(compliances[1].next_due_date, Some(date("2020-01-01")));
    assert_eq!(compliances[1].adj_mos, Some(-12));
}

#[test]
fn one_sided_day_tolerance_rejects_the_other_side() {
    let positive_only =
        CalendarRule::months(6).tolerance(Some(12.0), None, CalendarToleranceUnit::Days);
    assert_eq!(
        next_due(positive_only, &["2019-01-01", "2019-06-19"]),
        Some(date("2019-12-19"))
    );

    let negative_only =
        CalendarRule::months(6).tolerance(None, Some(12.0), CalendarToleranceUnit::Days);
    assert_eq!(
        next_due(negative_only, &["2019-01-01", "2019-07-13"]),
        Some(date("2020-01-13"))
    );
}

#[test]
fn month_tolerance_moves_by_calendar_months() {
    let both = CalendarRule::months(6).tolerance(Some(1.0), Some(1.0), CalendarToleranceUnit::Months);
    assert_eq!(
        next_due(both, &["2019-01-01", "2019-08-01"]),
        Some(date("2020-01-01"))
    );

    let positive_only =
        CalendarRule::months(6).tolerance(Some(1.0), None, CalendarToleranceUnit::Months);
    assert_eq!(
        next_due(positive_only, &["2019-01-01", "2019-06-01"]),
        Some(date("2019-12-01"))
    );

    let negative_only =
        CalendarRule::months(6).tolerance(None, Some(1.0), CalendarToleranceUnit::Months);
    assert_eq!(
        next_due(negative_only, &["2019-01-01", "2019-08-01"]),
        Some(date("2020-02-01"))
    );
}

#[test]
fn percent_tolerance_on_month_interval_uses_thirty_and_a_half_day_months() {
    let rule = || {
        CalendarRule::months(6).tolerance(Some(20.2), Some(20.9), CalendarToleranceUnit::Percent)
    };
    assert_eq!(
        next_due(rule(), &["2019-01-01", "2019-08-07"]),
        Some(date("2020-01-01"))
    );
    assert_eq!(
        next_due(rule(), &["2019-01-01", "2019-05-23"]),
        Some(date("2020-01-01"))
    );

    let positive_only =
        CalendarRule::months(6).tolerance(Some(20.2), None, CalendarToleranceUnit::Percent);
    assert_eq!(
        next_due(positive_only, &["2019-01-01", "2019-06-01"]),
        Some(date("2019-12-01"))
    );

    let negative_only =
        CalendarRule::months(6).tolerance(None, Some(20.9), CalendarToleranceUnit::Percent);
    assert_eq!(
        next_due(negative_only, &["2019-01-01", "2019-08-01"]),
        Some(date("2020-02-01"))
    );
}

#[test]
fn day_interval_with_day_tolerance() {
    let both = CalendarRule::days(30).tolerance(Some(12.0), Some(12.0), CalendarToleranceUnit::Days);
    assert_eq!(
        next_due(both, &["2020-02-01", "2020-03-14"]),
        Some(date("2020-04-01"))
    );

    let positive_only =
        CalendarRule::days(30).tolerance(Some(12.0), None, CalendarToleranceUnit::Days);
    assert_eq!(
        next_due(positive_only, &["2020-02-01", "2020-02-19"]),
        Some(date("2020-03-20"))
    );

    let negative_only =
        CalendarRule::days(30).tolerance(None, Some(12.0), CalendarToleranceUnit::Days);
    assert_eq!(
        next_due(negative_only, &["2020-02-01", "2020-03-14"]),
        Some(date("2020-04-13"))
    );
}

#[test]
fn percent_tolerance_on_day_interval_uses_due_days() {
    let both = CalendarRule::days(180).tolerance(
        Some(12.25),
        Some(12.25),
        CalendarToleranceUnit::Percent,
    );
    assert_eq!(
        next_due(both, &["2020-02-01", "2020-07-08"]),
        Some(date("2021-01-26"))
    );

    let positive_only =
        CalendarRule::days(180).tolerance(Some(12.25), None, CalendarToleranceUnit::Percent);
    assert_eq!(
        next_due(positive_only, &["2020-02-01", "2020-08-21"]),
        Some(date("2021-01-26"))
    );

    let positive_only =
        CalendarRule::days(180).tolerance(Some(12.25), None, CalendarToleranceUnit::Percent);
    assert_eq!(
        next_due(positive_only, &["2020-02-01", "2020-07-08"]),
        Some(date("2021-01-04"))
    );

    let negative_only =
        CalendarRule::days(180).tolerance(None, Some(12.25), CalendarToleranceUnit::Percent);
    assert_eq!(
        next_due(negative_only, &["2020-02-01", "2020-08-21"]),
        Some(date("2021-02-17"))
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let rule = || {
        CalendarRule::months(6).tolerance(Some(12.0), Some(12.0), CalendarToleranceUnit::Days)
    };
    assert_eq!(
        next_due(rule(), &["2019-01-01", "2019-07-13"]),
        Some(date("2020-01-01"))
    );
    assert_eq!(
        next_due(rule(), &["2019-01-01", "2019-07-14"]),
        Some(date("2020-01-14"))
    );
}

#[test]
fn performance_on_schedule_is_not_an_adjustment() {
    let rule = CalendarRule::months(6).tolerance(Some(12.0), Some(12.0), CalendarToleranceUnit::Days);
    let compliances = replay(rule, &["2019-01-01", "2019-07-01"]);

    assert_eq!(compliances[1].next_due_date, Some(date("2020-01-01")));
    assert_eq!(compliances[1].adj_mos, None);
}

#[test]
fn month_end_projection_clamps_to_last_day() {
    assert_eq!(
        next_due(CalendarRule::months(1), &["2019-01-31"]),
        Some(date("2019-02-28"))
    );
}

#[test]
fn recompute_reports_adjusted_calendar_axis() {
    let service = MaintenanceService::new(MemoryStore::new(), EngineConfig::default());
    let task = service.create_task("00-IJM-002", "").unwrap();
    let rule = CalendarRule::months(6).tolerance(Some(12.0), Some(12.0), CalendarToleranceUnit::Days);
    service
        .create_requirement(rule.into_requirement(task.uuid))
        .unwrap();
    service
        .record_compliance(Compliance::new(task.uuid, date("2019-01-01")))
        .unwrap();
    let latest = service
        .record_compliance(Compliance::new(task.uuid, date("2019-07-05")))
        .unwrap();

    let report = service.recompute(task.uuid).unwrap();
    let outcome = report.outcome.unwrap();
    assert_eq!(report.compliance_uuid, Some(latest.uuid));
    assert_eq!(outcome.calendar, AxisState::ProjectedAdjusted);
    assert_eq!(outcome.hours, AxisState::NoRequirementDue);
    assert_eq!(outcome.cycles, AxisState::NoRequirementDue);
}
