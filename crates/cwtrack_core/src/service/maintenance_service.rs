//! Maintenance tracking use-case service.
//!
//! # Responsibility
//! - Provide create/update/soft-delete for tasks, requirements and
//!   compliances.
//! - Reject malformed requirements and out-of-order compliances before they
//!   reach storage.
//! - Recompute the task schedule after every compliance or requirement
//!   mutation.
//!
//! # Invariants
//! - Callers never write engine-owned compliance fields; they are cleared on
//!   record and preserved on update.
//! - A requirement saved with `is_active` goes through `activate`.

use crate::config::EngineConfig;
use crate::engine::{DueEngine, EngineError, RecomputeReport};
use crate::model::compliance::{check_order, Compliance, ComplianceId, ComplianceOrderError};
use crate::model::requirement::{Requirement, RequirementId, RequirementValidationError};
use crate::model::task::{Task, TaskId};
use crate::repo::{MaintenanceRepository, RepoError};
use log::{error, info, warn};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for maintenance use cases.
#[derive(Debug)]
pub enum ServiceError {
    TaskNotFound(TaskId),
    RequirementNotFound(RequirementId),
    ComplianceNotFound(ComplianceId),
    /// Requirement violates its due/tolerance configuration rules.
    InvalidConfiguration(RequirementValidationError),
    /// Compliance date or readings run backwards against its neighbours.
    NonMonotonic(ComplianceOrderError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Due engine failure other than missing records or bad configuration.
    Engine(EngineError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::RequirementNotFound(id) => write!(f, "requirement not found: {id}"),
            Self::ComplianceNotFound(id) => write!(f, "compliance not found: {id}"),
            Self::InvalidConfiguration(err) => write!(f, "invalid requirement: {err}"),
            Self::NonMonotonic(err) => write!(f, "compliance out of order: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Engine(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent state: {details}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidConfiguration(err) => Some(err),
            Self::NonMonotonic(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Engine(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::TaskNotFound(id) => Self::TaskNotFound(id),
            RepoError::RequirementNotFound(id) => Self::RequirementNotFound(id),
            RepoError::ComplianceNotFound(id) => Self::ComplianceNotFound(id),
            RepoError::RequirementValidation(err) => Self::InvalidConfiguration(err),
            other => Self::Repo(other),
        }
    }
}

impl From<EngineError> for ServiceError {
    fn from(value: EngineError) -> Self {
        match value {
            EngineError::TaskNotFound(id) => Self::TaskNotFound(id),
            EngineError::InvalidConfiguration(err) => Self::InvalidConfiguration(err),
            EngineError::Repo(err) => err.into(),
            other => Self::Engine(other),
        }
    }
}

impl From<ComplianceOrderError> for ServiceError {
    fn from(value: ComplianceOrderError) -> Self {
        Self::NonMonotonic(value)
    }
}

impl From<RequirementValidationError> for ServiceError {
    fn from(value: RequirementValidationError) -> Self {
        Self::InvalidConfiguration(value)
    }
}

/// Derived view of a task with its current requirement and compliance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOverview {
    pub task: Task,
    /// The unique active, non-deleted requirement.
    pub current_requirement: Option<Requirement>,
    /// The non-deleted compliance with the latest perform date.
    pub current_compliance: Option<Compliance>,
}

/// Maintenance service facade over a repository implementation.
pub struct MaintenanceService<R: MaintenanceRepository> {
    repo: R,
    engine: DueEngine,
}

impl<R: MaintenanceRepository> MaintenanceService<R> {
    /// Creates a service using the provided repository and engine settings.
    pub fn new(repo: R, config: EngineConfig) -> Self {
        Self {
            repo,
            engine: DueEngine::new(config),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn create_task(
        &self,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Task, ServiceError> {
        let task = Task::new(code, description).map_err(RepoError::from)?;
        let task_uuid = self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_uuid={}",
            task_uuid
        );
        self.repo
            .get_task(task_uuid, false)?
            .ok_or(ServiceError::InconsistentState(
                "created task not found in read-back",
            ))
    }

    /// Replaces code and description of a live task.
    pub fn update_task(
        &self,
        task_uuid: TaskId,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Task, ServiceError> {
        let mut task = self.require_task(task_uuid)?;
        task.code = code.into().trim().to_string();
        task.description = description.into();
        self.repo.update_task(&task)?;
        info!(
            "event=task_update module=service status=ok task_uuid={}",
            task_uuid
        );
        self.require_task(task_uuid)
    }

    pub fn get_task(&self, task_uuid: TaskId) -> Result<Option<Task>, ServiceError> {
        Ok(self.repo.get_task(task_uuid, false)?)
    }

    pub fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.repo.list_tasks(false)?)
    }

    pub fn soft_delete_task(&self, task_uuid: TaskId) -> Result<(), ServiceError> {
        self.repo.soft_delete_task(task_uuid)?;
        info!(
            "event=task_delete module=service status=ok task_uuid={}",
            task_uuid
        );
        Ok(())
    }

    pub fn task_overview(&self, task_uuid: TaskId) -> Result<TaskOverview, ServiceError> {
        let task = self.require_task(task_uuid)?;
        Ok(TaskOverview {
            task,
            current_requirement: self.repo.get_active_requirement(task_uuid)?,
            current_compliance: self.repo.get_latest_compliance(task_uuid)?,
        })
    }

    /// Stores a new requirement and recomputes the task schedule.
    ///
    /// An active requirement supersedes the task's previous one.
    pub fn create_requirement(
        &self,
        requirement: Requirement,
    ) -> Result<Requirement, ServiceError> {
        requirement.validate()?;
        self.require_task(requirement.task_uuid)?;
        if requirement.is_active {
            self.repo.activate(&requirement)?;
        } else {
            self.repo.create_requirement(&requirement)?;
        }
        info!(
            "event=requirement_create module=service status=ok task_uuid={} requirement_uuid={} active={}",
            requirement.task_uuid, requirement.uuid, requirement.is_active
        );
        self.recompute(requirement.task_uuid)?;
        self.require_requirement(requirement.uuid)
    }

    /// Replaces a live requirement and recomputes the task schedule.
    pub fn update_requirement(
        &self,
        requirement: Requirement,
    ) -> Result<Requirement, ServiceError> {
        requirement.validate()?;
        let stored = self.require_requirement(requirement.uuid)?;
        if stored.task_uuid != requirement.task_uuid {
            return Err(ServiceError::InconsistentState(
                "requirement cannot move to another task",
            ));
        }
        if requirement.is_active {
            self.repo.activate(&requirement)?;
        } else {
            self.repo.update_requirement(&requirement)?;
        }
        info!(
            "event=requirement_update module=service status=ok task_uuid={} requirement_uuid={} active={}",
            requirement.task_uuid, requirement.uuid, requirement.is_active
        );
        self.recompute(requirement.task_uuid)?;
        self.require_requirement(requirement.uuid)
    }

    /// Makes an existing requirement the task's active one.
    pub fn activate_requirement(
        &self,
        requirement_uuid: RequirementId,
    ) -> Result<Requirement, ServiceError> {
        let mut requirement = self.require_requirement(requirement_uuid)?;
        requirement.is_active = true;
        self.update_requirement(requirement)
    }

    pub fn soft_delete_requirement(
        &self,
        requirement_uuid: RequirementId,
    ) -> Result<(), ServiceError> {
        let requirement = self.require_requirement(requirement_uuid)?;
        self.repo.soft_delete_requirement(requirement_uuid)?;
        info!(
            "event=requirement_delete module=service status=ok task_uuid={} requirement_uuid={}",
            requirement.task_uuid, requirement_uuid
        );
        self.recompute(requirement.task_uuid)?;
        Ok(())
    }

    /// Records a new compliance after the task's latest one and recomputes
    /// its schedule.
    ///
    /// # Errors
    /// - `NonMonotonic` when the perform date is not strictly after the
    ///   latest compliance or a reading runs backwards.
    /// - `Engine` when the recompute fails; the new record is soft-deleted
    ///   again before the error is returned.
    pub fn record_compliance(&self, compliance: Compliance) -> Result<Compliance, ServiceError> {
        self.record_compliance_with_report(compliance)
            .map(|(compliance, _)| compliance)
    }

    /// Same as [`record_compliance`](Self::record_compliance), also returning
    /// the recompute report of the pass it triggered.
    pub fn record_compliance_with_report(
        &self,
        compliance: Compliance,
    ) -> Result<(Compliance, RecomputeReport), ServiceError> {
        let mut compliance = compliance;
        compliance.validate().map_err(RepoError::from)?;
        self.require_task(compliance.task_uuid)?;

        let latest = self.repo.get_latest_compliance(compliance.task_uuid)?;
        if let Err(err) = check_order(&compliance, latest.as_ref(), None) {
            error!(
                "event=compliance_record module=service status=error task_uuid={} reason=non_monotonic",
                compliance.task_uuid
            );
            return Err(err.into());
        }

        compliance.is_deleted = false;
        compliance.clear_schedule();
        self.repo.create_compliance(&compliance)?;
        info!(
            "event=compliance_record module=service status=ok task_uuid={} compliance_uuid={} perform_date={}",
            compliance.task_uuid, compliance.uuid, compliance.perform_date
        );
        let report = match self.recompute(compliance.task_uuid) {
            Ok(report) => report,
            Err(err) => {
                self.repo.soft_delete_compliance(compliance.uuid)?;
                warn!(
                    "event=compliance_record module=service status=rollback task_uuid={} compliance_uuid={}",
                    compliance.task_uuid, compliance.uuid
                );
                return Err(err);
            }
        };
        Ok((self.require_compliance(compliance.uuid)?, report))
    }

    /// Replaces the measured fields of a live compliance.
    ///
    /// The record must stay strictly between its neighbours by date, and its
    /// readings must not run backwards against them.
    ///
    /// # Errors
    /// - `NonMonotonic` when the new values break neighbour ordering.
    /// - `Engine` when the recompute fails; the stored record is written
    ///   back unchanged before the error is returned.
    pub fn update_compliance(&self, compliance: Compliance) -> Result<Compliance, ServiceError> {
        let mut compliance = compliance;
        compliance.validate().map_err(RepoError::from)?;
        let stored = self.require_compliance(compliance.uuid)?;
        if stored.task_uuid != compliance.task_uuid {
            return Err(ServiceError::InconsistentState(
                "compliance cannot move to another task",
            ));
        }

        let siblings: Vec<Compliance> = self
            .repo
            .list_compliances(compliance.task_uuid, false)?
            .into_iter()
            .filter(|sibling| sibling.uuid != compliance.uuid)
            .collect();
        let previous = siblings
            .iter()
            .filter(|sibling| sibling.perform_date <= compliance.perform_date)
            .last();
        let next = siblings
            .iter()
            .find(|sibling| sibling.perform_date > compliance.perform_date);
        if let Err(err) = check_order(&compliance, previous, next) {
            error!(
                "event=compliance_update module=service status=error task_uuid={} compliance_uuid={} reason=non_monotonic",
                compliance.task_uuid, compliance.uuid
            );
            return Err(err.into());
        }

        compliance.is_deleted = false;
        compliance.copy_schedule_from(&stored);
        self.repo.update_compliance(&compliance)?;
        info!(
            "event=compliance_update module=service status=ok task_uuid={} compliance_uuid={}",
            compliance.task_uuid, compliance.uuid
        );
        if let Err(err) = self.recompute(compliance.task_uuid) {
            self.repo.update_compliance(&stored)?;
            warn!(
                "event=compliance_update module=service status=rollback task_uuid={} compliance_uuid={}",
                compliance.task_uuid, compliance.uuid
            );
            return Err(err);
        }
        self.require_compliance(compliance.uuid)
    }

    pub fn soft_delete_compliance(&self, compliance_uuid: ComplianceId) -> Result<(), ServiceError> {
        let compliance = self.require_compliance(compliance_uuid)?;
        self.repo.soft_delete_compliance(compliance_uuid)?;
        info!(
            "event=compliance_delete module=service status=ok task_uuid={} compliance_uuid={}",
            compliance.task_uuid, compliance_uuid
        );
        self.recompute(compliance.task_uuid)?;
        Ok(())
    }

    pub fn list_compliances(&self, task_uuid: TaskId) -> Result<Vec<Compliance>, ServiceError> {
        self.require_task(task_uuid)?;
        Ok(self.repo.list_compliances(task_uuid, false)?)
    }

    /// Runs the due engine for one task on demand.
    pub fn recompute(&self, task_uuid: TaskId) -> Result<RecomputeReport, ServiceError> {
        Ok(self.engine.recompute_due_dates(&self.repo, task_uuid)?)
    }

    fn require_task(&self, task_uuid: TaskId) -> Result<Task, ServiceError> {
        self.repo
            .get_task(task_uuid, false)?
            .ok_or(ServiceError::TaskNotFound(task_uuid))
    }

    fn require_requirement(
        &self,
        requirement_uuid: RequirementId,
    ) -> Result<Requirement, ServiceError> {
        self.repo
            .get_requirement(requirement_uuid, false)?
            .ok_or(ServiceError::RequirementNotFound(requirement_uuid))
    }

    fn require_compliance(&self, compliance_uuid: ComplianceId) -> Result<Compliance, ServiceError> {
        self.repo
            .get_compliance(compliance_uuid, false)?
            .ok_or(ServiceError::ComplianceNotFound(compliance_uuid))
    }
}
