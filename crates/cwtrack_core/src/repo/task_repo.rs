//! Task repository contract.

use super::RepoResult;
use crate::model::task::{Task, TaskId};

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId, include_deleted: bool) -> RepoResult<Option<Task>>;
    /// Tasks ordered by code, then ID.
    fn list_tasks(&self, include_deleted: bool) -> RepoResult<Vec<Task>>;
    fn soft_delete_task(&self, id: TaskId) -> RepoResult<()>;
}
