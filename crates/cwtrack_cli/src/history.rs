//! History replay.
//!
//! A history file names one task, optionally its requirement, and the
//! compliances in the order they were performed. Replay records them one by
//! one through `MaintenanceService` so every compliance gets the schedule it
//! had when it was the latest record.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use cwtrack_core::{
    AxisState, CalendarToleranceUnit, Compliance, CyclesToleranceUnit, Decimal2, DueMonthsUnit,
    EngineConfig, HoursToleranceUnit, MaintenanceService, MemoryStore, Requirement, TaskId,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryFile {
    pub task: TaskInput,
    #[serde(default)]
    pub requirement: Option<RequirementInput>,
    #[serde(default)]
    pub compliances: Vec<ComplianceInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskInput {
    pub code: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RequirementInput {
    pub due_months: Option<u32>,
    pub due_months_unit: Option<DueMonthsUnit>,
    pub due_hrs: Option<Decimal2>,
    pub due_cyc: Option<i64>,
    pub tol_pos_mos: Option<Decimal2>,
    pub tol_neg_mos: Option<Decimal2>,
    pub tol_mos_unit: Option<CalendarToleranceUnit>,
    pub tol_pos_hrs: Option<Decimal2>,
    pub tol_neg_hrs: Option<Decimal2>,
    pub tol_hrs_unit: Option<HoursToleranceUnit>,
    pub tol_pos_cyc: Option<Decimal2>,
    pub tol_neg_cyc: Option<Decimal2>,
    pub tol_cyc_unit: Option<CyclesToleranceUnit>,
}

impl RequirementInput {
    fn into_requirement(self, task_uuid: TaskId) -> Requirement {
        let mut requirement = Requirement::new(task_uuid);
        requirement.due_months = self.due_months;
        requirement.due_months_unit = self.due_months_unit;
        requirement.due_hrs = self.due_hrs;
        requirement.due_cyc = self.due_cyc;
        requirement.tol_pos_mos = self.tol_pos_mos;
        requirement.tol_neg_mos = self.tol_neg_mos;
        requirement.tol_mos_unit = self.tol_mos_unit;
        requirement.tol_pos_hrs = self.tol_pos_hrs;
        requirement.tol_neg_hrs = self.tol_neg_hrs;
        requirement.tol_hrs_unit = self.tol_hrs_unit;
        requirement.tol_pos_cyc = self.tol_pos_cyc;
        requirement.tol_neg_cyc = self.tol_neg_cyc;
        requirement.tol_cyc_unit = self.tol_cyc_unit;
        requirement.is_active = true;
        requirement
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComplianceInput {
    pub perform_date: NaiveDate,
    #[serde(default)]
    pub perform_hrs: Option<Decimal2>,
    #[serde(default)]
    pub perform_cyc: Option<i64>,
}

/// Schedule of one compliance right after it was recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRow {
    pub perform_date: NaiveDate,
    pub perform_hrs: Option<Decimal2>,
    pub perform_cyc: Option<i64>,
    pub next_due_date: Option<NaiveDate>,
    pub next_due_hrs: Option<Decimal2>,
    pub next_due_cyc: Option<i64>,
    pub adj_mos: Option<i64>,
    pub adj_hrs: Option<Decimal2>,
    pub adj_cyc: Option<i64>,
    pub calendar: AxisState,
    pub hours: AxisState,
    pub cycles: AxisState,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayReport {
    pub task_code: String,
    pub rows: Vec<ReplayRow>,
}

impl HistoryFile {
    /// Parses YAML, which also accepts JSON documents.
    pub fn parse(source: &str) -> Result<Self> {
        serde_yaml::from_str(source).context("invalid history document")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read history `{}`", path.display()))?;
        Self::parse(&source).with_context(|| format!("in `{}`", path.display()))
    }
}

/// Replays `history` against a fresh in-memory store.
pub fn replay(history: HistoryFile, config: EngineConfig) -> Result<ReplayReport> {
    let service = MaintenanceService::new(MemoryStore::new(), config);
    let task = service
        .create_task(history.task.code, history.task.description)
        .context("failed to create task")?;

    if let Some(input) = history.requirement {
        service
            .create_requirement(input.into_requirement(task.uuid))
            .context("failed to store requirement")?;
    }

    let mut rows = Vec::with_capacity(history.compliances.len());
    for (index, input) in history.compliances.into_iter().enumerate() {
        let mut compliance = Compliance::new(task.uuid, input.perform_date);
        compliance.perform_hrs = input.perform_hrs;
        compliance.perform_cyc = input.perform_cyc;
        let (recorded, report) = service
            .record_compliance_with_report(compliance)
            .with_context(|| format!("compliance #{} ({})", index + 1, input.perform_date))?;

        let Some(outcome) = report.outcome else {
            bail!("compliance #{} was not scheduled", index + 1);
        };
        rows.push(ReplayRow {
            perform_date: recorded.perform_date,
            perform_hrs: recorded.perform_hrs,
            perform_cyc: recorded.perform_cyc,
            next_due_date: recorded.next_due_date,
            next_due_hrs: recorded.next_due_hrs,
            next_due_cyc: recorded.next_due_cyc,
            adj_mos: recorded.adj_mos,
            adj_hrs: recorded.adj_hrs,
            adj_cyc: recorded.adj_cyc,
            calendar: outcome.calendar,
            hours: outcome.hours,
            cycles: outcome.cycles,
        });
    }

    Ok(ReplayReport {
        task_code: task.code,
        rows,
    })
}

/// One line per compliance; null fields print as `-`.
pub fn render_text(report: &ReplayReport) -> String {
    fn cell<T: ToString>(value: Option<T>) -> String {
        value.map_or_else(|| "-".to_string(), |value| value.to_string())
    }

    let mut out = format!("task {}\n", report.task_code);
    for row in &report.rows {
        out.push_str(&format!(
            "{} hrs={} cyc={} | next_due date={} hrs={} cyc={} | adj mos={} hrs={} cyc={}\n",
            row.perform_date,
            cell(row.perform_hrs),
            cell(row.perform_cyc),
            cell(row.next_due_date),
            cell(row.next_due_hrs),
            cell(row.next_due_cyc),
            cell(row.adj_mos),
            cell(row.adj_hrs),
            cell(row.adj_cyc),
        ));
    }
    out
}
