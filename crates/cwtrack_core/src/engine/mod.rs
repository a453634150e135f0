//! Due-date recalculation and adjustment engine.
//!
//! # Responsibility
//! - Project the next-due value of the latest compliance on every axis.
//! - Decide per axis whether a prior schedule shift is absorbed, and record
//!   the resulting drift.
//! - Write the result back through the compliance repository.
//!
//! # Invariants
//! - Only the latest non-deleted compliance of a task is written.
//! - Recompute is idempotent: a second run without data changes writes the
//!   same values.
//! - No ambient state; every input arrives through the repository or
//!   `EngineConfig`.

pub mod axis;
pub mod detector;
pub mod projector;
pub mod recorder;
pub mod tolerance;

pub use axis::{CalendarAxis, CyclesAxis, DueAxis, HoursAxis};
pub use projector::{compute_schedule, AxisState, ScheduleOutcome};
pub use tolerance::ToleranceWindow;

use crate::config::EngineConfig;
use crate::model::compliance::ComplianceId;
use crate::model::requirement::{RequirementId, RequirementValidationError};
use crate::model::task::TaskId;
use crate::model::units::Axis;
use crate::repo::{MaintenanceRepository, RepoError};
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type EngineResult<T> = Result<T, EngineError>;

/// Due engine failures.
#[derive(Debug)]
pub enum EngineError {
    /// Task does not exist or is soft-deleted.
    TaskNotFound(TaskId),
    /// Active requirement violates its configuration invariants.
    InvalidConfiguration(RequirementValidationError),
    /// Projection left the representable range of the axis.
    OutOfRange { axis: Axis },
    Repo(RepoError),
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidConfiguration(err) => write!(f, "invalid requirement: {err}"),
            Self::OutOfRange { axis } => write!(f, "{axis} projection is out of range"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfiguration(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::TaskNotFound(_) | Self::OutOfRange { .. } => None,
        }
    }
}

impl From<RepoError> for EngineError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Summary of one recompute invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecomputeReport {
    pub task_uuid: TaskId,
    /// Compliance that was rewritten; `None` when the task has none.
    pub compliance_uuid: Option<ComplianceId>,
    /// Active requirement used; `None` when the task has none.
    pub requirement_uuid: Option<RequirementId>,
    pub outcome: Option<ScheduleOutcome>,
}

/// Synchronous recompute entry point.
#[derive(Debug, Clone, Default)]
pub struct DueEngine {
    config: EngineConfig,
}

impl DueEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Recomputes the next-due and adjustment fields of the task's latest
    /// compliance and persists them.
    ///
    /// # Errors
    /// - `TaskNotFound` when the task is unknown or soft-deleted.
    /// - `InvalidConfiguration` when the active requirement is malformed.
    /// - `OutOfRange` when a projected value overflows its axis.
    /// - `Repo` for storage failures.
    ///
    /// Nothing is written when an error is returned.
    pub fn recompute_due_dates<R: MaintenanceRepository>(
        &self,
        repo: &R,
        task_uuid: TaskId,
    ) -> EngineResult<RecomputeReport> {
        let started_at = Instant::now();
        match self.recompute_inner(repo, task_uuid) {
            Ok(report) => {
                match report.outcome {
                    Some(outcome) => {
                        let states = Axis::ALL
                            .iter()
                            .map(|axis| format!("{axis}={}", outcome.state(*axis).as_str()))
                            .collect::<Vec<_>>()
                            .join(" ");
                        info!(
                            "event=due_recompute module=engine status=ok task_uuid={} compliance_uuid={} {} duration_us={}",
                            task_uuid,
                            report
                                .compliance_uuid
                                .map(|id| id.to_string())
                                .unwrap_or_default(),
                            states,
                            started_at.elapsed().as_micros()
                        );
                    }
                    None => info!(
                        "event=due_recompute module=engine status=skip task_uuid={} reason=no_compliance",
                        task_uuid
                    ),
                }
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=due_recompute module=engine status=error task_uuid={} duration_us={} error={}",
                    task_uuid,
                    started_at.elapsed().as_micros(),
                    err
                );
                Err(err)
            }
        }
    }

    fn recompute_inner<R: MaintenanceRepository>(
        &self,
        repo: &R,
        task_uuid: TaskId,
    ) -> EngineResult<RecomputeReport> {
        repo.get_task(task_uuid, false)?
            .ok_or(EngineError::TaskNotFound(task_uuid))?;

        let requirement = repo.get_active_requirement(task_uuid)?;
        let requirement_uuid = requirement.as_ref().map(|requirement| requirement.uuid);
        let Some(mut latest) = repo.get_latest_compliance(task_uuid)? else {
            return Ok(RecomputeReport {
                task_uuid,
                compliance_uuid: None,
                requirement_uuid,
                outcome: None,
            });
        };
        let previous = repo.get_previous_compliance(task_uuid)?;

        let outcome = compute_schedule(
            requirement.as_ref(),
            &mut latest,
            previous.as_ref(),
            &self.config,
        )
        .map_err(|err| {
            if let EngineError::InvalidConfiguration(_) = &err {
                error!(
                    "event=invalid_requirement module=engine status=error task_uuid={} requirement_uuid={}",
                    task_uuid,
                    requirement_uuid.map(|id| id.to_string()).unwrap_or_default()
                );
            }
            err
        })?;
        repo.save_schedule(&latest)?;

        Ok(RecomputeReport {
            task_uuid,
            compliance_uuid: Some(latest.uuid),
            requirement_uuid,
            outcome: Some(outcome),
        })
    }
}
