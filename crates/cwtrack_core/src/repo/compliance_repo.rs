//! Compliance repository contract.

use super::RepoResult;
use crate::model::compliance::{Compliance, ComplianceId};
use crate::model::task::TaskId;

/// Repository interface for compliance CRUD and the engine's read/write
/// pair.
pub trait ComplianceRepository {
    fn create_compliance(&self, compliance: &Compliance) -> RepoResult<ComplianceId>;
    fn update_compliance(&self, compliance: &Compliance) -> RepoResult<()>;
    fn get_compliance(
        &self,
        id: ComplianceId,
        include_deleted: bool,
    ) -> RepoResult<Option<Compliance>>;
    /// Compliances ordered by perform date, oldest first.
    fn list_compliances(
        &self,
        task_uuid: TaskId,
        include_deleted: bool,
    ) -> RepoResult<Vec<Compliance>>;
    fn soft_delete_compliance(&self, id: ComplianceId) -> RepoResult<()>;

    /// Non-deleted compliance with the greatest perform date.
    fn get_latest_compliance(&self, task_uuid: TaskId) -> RepoResult<Option<Compliance>>;

    /// Non-deleted compliance with the second greatest perform date.
    fn get_previous_compliance(&self, task_uuid: TaskId) -> RepoResult<Option<Compliance>>;

    /// Writes only the engine-owned fields of an existing compliance.
    fn save_schedule(&self, compliance: &Compliance) -> RepoResult<()>;
}
