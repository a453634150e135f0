//! Repository contracts and the in-process store.
//!
//! # Responsibility
//! - Define the data access contracts consumed by the engine and service.
//! - Keep storage details out of scheduling and orchestration code.
//!
//! # Invariants
//! - Write paths call the record's `validate()` before mutating state.
//! - At most one current (active, non-deleted) requirement per task.
//! - Non-deleted compliances of a task have distinct perform dates.
//! - Missing records surface as semantic `*NotFound` errors.

pub mod compliance_repo;
pub mod memory;
pub mod requirement_repo;
pub mod task_repo;

pub use compliance_repo::ComplianceRepository;
pub use memory::MemoryStore;
pub use requirement_repo::RequirementRepository;
pub use task_repo::TaskRepository;

use crate::model::compliance::{ComplianceId, ComplianceValidationError};
use crate::model::requirement::{RequirementId, RequirementValidationError};
use crate::model::task::{TaskId, TaskValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for every record kind.
#[derive(Debug)]
pub enum RepoError {
    TaskNotFound(TaskId),
    RequirementNotFound(RequirementId),
    ComplianceNotFound(ComplianceId),
    TaskValidation(TaskValidationError),
    RequirementValidation(RequirementValidationError),
    ComplianceValidation(ComplianceValidationError),
    /// Write would break a uniqueness constraint.
    Conflict { id: Uuid, reason: &'static str },
    /// A writer panicked while holding the store lock.
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::RequirementNotFound(id) => write!(f, "requirement not found: {id}"),
            Self::ComplianceNotFound(id) => write!(f, "compliance not found: {id}"),
            Self::TaskValidation(err) => write!(f, "{err}"),
            Self::RequirementValidation(err) => write!(f, "{err}"),
            Self::ComplianceValidation(err) => write!(f, "{err}"),
            Self::Conflict { id, reason } => write!(f, "conflict on {id}: {reason}"),
            Self::LockPoisoned => write!(f, "store lock poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::TaskValidation(err) => Some(err),
            Self::RequirementValidation(err) => Some(err),
            Self::ComplianceValidation(err) => Some(err),
            Self::TaskNotFound(_)
            | Self::RequirementNotFound(_)
            | Self::ComplianceNotFound(_)
            | Self::Conflict { .. }
            | Self::LockPoisoned => None,
        }
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::TaskValidation(value)
    }
}

impl From<RequirementValidationError> for RepoError {
    fn from(value: RequirementValidationError) -> Self {
        Self::RequirementValidation(value)
    }
}

impl From<ComplianceValidationError> for RepoError {
    fn from(value: ComplianceValidationError) -> Self {
        Self::ComplianceValidation(value)
    }
}

/// Everything the engine and service need from storage.
pub trait MaintenanceRepository:
    TaskRepository + RequirementRepository + ComplianceRepository
{
}

impl<T> MaintenanceRepository for T where
    T: TaskRepository + RequirementRepository + ComplianceRepository
{
}
