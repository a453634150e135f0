//! Requirement repository contract.
//!
//! # Invariants
//! - `activate` is the only way a requirement becomes active; it flips the
//!   previously active requirement of the same task inactive in the same
//!   write.
//! - `create_requirement`/`update_requirement` reject an active flag while
//!   another requirement of the same task is current.

use super::RepoResult;
use crate::model::requirement::{Requirement, RequirementId};
use crate::model::task::TaskId;

/// Repository interface for requirement CRUD and activation.
pub trait RequirementRepository {
    fn create_requirement(&self, requirement: &Requirement) -> RepoResult<RequirementId>;
    fn update_requirement(&self, requirement: &Requirement) -> RepoResult<()>;
    fn get_requirement(
        &self,
        id: RequirementId,
        include_deleted: bool,
    ) -> RepoResult<Option<Requirement>>;
    fn list_requirements(
        &self,
        task_uuid: TaskId,
        include_deleted: bool,
    ) -> RepoResult<Vec<Requirement>>;
    fn soft_delete_requirement(&self, id: RequirementId) -> RepoResult<()>;

    /// Stores `requirement` as the task's only active requirement.
    ///
    /// Inserts the record when it does not exist yet.
    fn activate(&self, requirement: &Requirement) -> RepoResult<()>;

    /// The unique active, non-deleted requirement of the task.
    fn get_active_requirement(&self, task_uuid: TaskId) -> RepoResult<Option<Requirement>>;
}
