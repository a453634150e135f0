//! In-process repository backed by ordered maps behind one mutex.
//!
//! # Responsibility
//! - Implement every repository contract for the service, the CLI and tests.
//! - Serialise writes so multi-record operations such as `activate` are
//!   atomic.
//!
//! # Invariants
//! - Every write validates the record before touching state.
//! - A failed write leaves the store unchanged.

use super::{
    ComplianceRepository, RepoError, RepoResult, RequirementRepository, TaskRepository,
};
use crate::model::compliance::{Compliance, ComplianceId};
use crate::model::requirement::{Requirement, RequirementId};
use crate::model::task::{Task, TaskId};
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct StoreState {
    tasks: BTreeMap<TaskId, Task>,
    requirements: BTreeMap<RequirementId, Requirement>,
    compliances: BTreeMap<ComplianceId, Compliance>,
}

impl StoreState {
    fn ensure_task(&self, task_uuid: TaskId) -> RepoResult<()> {
        match self.tasks.get(&task_uuid) {
            Some(task) if task.is_active() => Ok(()),
            _ => Err(RepoError::TaskNotFound(task_uuid)),
        }
    }

    fn current_requirement(&self, task_uuid: TaskId) -> Option<&Requirement> {
        self.requirements
            .values()
            .find(|requirement| requirement.task_uuid == task_uuid && requirement.is_current())
    }

    fn ensure_single_active(&self, requirement: &Requirement) -> RepoResult<()> {
        if !requirement.is_current() {
            return Ok(());
        }
        match self.current_requirement(requirement.task_uuid) {
            Some(current) if current.uuid != requirement.uuid => Err(RepoError::Conflict {
                id: requirement.uuid,
                reason: "task already has an active requirement",
            }),
            _ => Ok(()),
        }
    }

    fn ensure_distinct_date(&self, compliance: &Compliance) -> RepoResult<()> {
        if compliance.is_deleted {
            return Ok(());
        }
        let clash = self.compliances.values().any(|other| {
            other.uuid != compliance.uuid
                && other.task_uuid == compliance.task_uuid
                && other.is_active()
                && other.perform_date == compliance.perform_date
        });
        if clash {
            return Err(RepoError::Conflict {
                id: compliance.uuid,
                reason: "perform date already recorded for task",
            });
        }
        Ok(())
    }

    /// Non-deleted compliances of a task, newest first.
    fn active_compliances_desc(&self, task_uuid: TaskId) -> Vec<&Compliance> {
        let mut compliances: Vec<&Compliance> = self
            .compliances
            .values()
            .filter(|compliance| compliance.task_uuid == task_uuid && compliance.is_active())
            .collect();
        compliances.sort_by(|left, right| right.perform_date.cmp(&left.perform_date));
        compliances
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl TaskRepository for MemoryStore {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        let mut state = self.lock()?;
        if state.tasks.contains_key(&task.uuid) {
            return Err(RepoError::Conflict {
                id: task.uuid,
                reason: "task already exists",
            });
        }
        state.tasks.insert(task.uuid, task.clone());
        Ok(task.uuid)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let mut state = self.lock()?;
        let stored = state
            .tasks
            .get_mut(&task.uuid)
            .ok_or(RepoError::TaskNotFound(task.uuid))?;
        let created_at = stored.created_at;
        *stored = task.clone();
        stored.created_at = created_at;
        stored.updated_at = Utc::now();
        Ok(())
    }

    fn get_task(&self, id: TaskId, include_deleted: bool) -> RepoResult<Option<Task>> {
        let state = self.lock()?;
        Ok(state
            .tasks
            .get(&id)
            .filter(|task| include_deleted || task.is_active())
            .cloned())
    }

    fn list_tasks(&self, include_deleted: bool) -> RepoResult<Vec<Task>> {
        let state = self.lock()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| include_deleted || task.is_active())
            .cloned()
            .collect();
        tasks.sort_by(|left, right| {
            left.code
                .cmp(&right.code)
                .then_with(|| left.uuid.cmp(&right.uuid))
        });
        Ok(tasks)
    }

    fn soft_delete_task(&self, id: TaskId) -> RepoResult<()> {
        let mut state = self.lock()?;
        let task = state
            .tasks
            .get_mut(&id)
            .filter(|task| task.is_active())
            .ok_or(RepoError::TaskNotFound(id))?;
        task.soft_delete();
        task.updated_at = Utc::now();
        Ok(())
    }
}

impl RequirementRepository for MemoryStore {
    fn create_requirement(&self, requirement: &Requirement) -> RepoResult<RequirementId> {
        requirement.validate()?;
        let mut state = self.lock()?;
        state.ensure_task(requirement.task_uuid)?;
        if state.requirements.contains_key(&requirement.uuid) {
            return Err(RepoError::Conflict {
                id: requirement.uuid,
                reason: "requirement already exists",
            });
        }
        state.ensure_single_active(requirement)?;
        state
            .requirements
            .insert(requirement.uuid, requirement.clone());
        Ok(requirement.uuid)
    }

    fn update_requirement(&self, requirement: &Requirement) -> RepoResult<()> {
        requirement.validate()?;
        let mut state = self.lock()?;
        match state.requirements.get(&requirement.uuid) {
            Some(stored) if stored.task_uuid == requirement.task_uuid => {}
            Some(_) => {
                return Err(RepoError::Conflict {
                    id: requirement.uuid,
                    reason: "requirement cannot move to another task",
                })
            }
            None => return Err(RepoError::RequirementNotFound(requirement.uuid)),
        }
        state.ensure_single_active(requirement)?;
        state
            .requirements
            .insert(requirement.uuid, requirement.clone());
        Ok(())
    }

    fn get_requirement(
        &self,
        id: RequirementId,
        include_deleted: bool,
    ) -> RepoResult<Option<Requirement>> {
        let state = self.lock()?;
        Ok(state
            .requirements
            .get(&id)
            .filter(|requirement| include_deleted || !requirement.is_deleted)
            .cloned())
    }

    fn list_requirements(
        &self,
        task_uuid: TaskId,
        include_deleted: bool,
    ) -> RepoResult<Vec<Requirement>> {
        let state = self.lock()?;
        Ok(state
            .requirements
            .values()
            .filter(|requirement| requirement.task_uuid == task_uuid)
            .filter(|requirement| include_deleted || !requirement.is_deleted)
            .cloned()
            .collect())
    }

    fn soft_delete_requirement(&self, id: RequirementId) -> RepoResult<()> {
        let mut state = self.lock()?;
        let requirement = state
            .requirements
            .get_mut(&id)
            .filter(|requirement| !requirement.is_deleted)
            .ok_or(RepoError::RequirementNotFound(id))?;
        requirement.soft_delete();
        Ok(())
    }

    fn activate(&self, requirement: &Requirement) -> RepoResult<()> {
        requirement.validate()?;
        if requirement.is_deleted {
            return Err(RepoError::RequirementNotFound(requirement.uuid));
        }
        let mut state = self.lock()?;
        state.ensure_task(requirement.task_uuid)?;
        if let Some(stored) = state.requirements.get(&requirement.uuid) {
            if stored.task_uuid != requirement.task_uuid {
                return Err(RepoError::Conflict {
                    id: requirement.uuid,
                    reason: "requirement cannot move to another task",
                });
            }
        }

        for other in state.requirements.values_mut() {
            if other.task_uuid == requirement.task_uuid && other.uuid != requirement.uuid {
                other.is_active = false;
            }
        }
        let mut active = requirement.clone();
        active.is_active = true;
        state.requirements.insert(active.uuid, active);
        Ok(())
    }

    fn get_active_requirement(&self, task_uuid: TaskId) -> RepoResult<Option<Requirement>> {
        let state = self.lock()?;
        Ok(state.current_requirement(task_uuid).cloned())
    }
}

impl ComplianceRepository for MemoryStore {
    fn create_compliance(&self, compliance: &Compliance) -> RepoResult<ComplianceId> {
        compliance.validate()?;
        let mut state = self.lock()?;
        state.ensure_task(compliance.task_uuid)?;
        if state.compliances.contains_key(&compliance.uuid) {
            return Err(RepoError::Conflict {
                id: compliance.uuid,
                reason: "compliance already exists",
            });
        }
        state.ensure_distinct_date(compliance)?;
        state.compliances.insert(compliance.uuid, compliance.clone());
        Ok(compliance.uuid)
    }

    fn update_compliance(&self, compliance: &Compliance) -> RepoResult<()> {
        compliance.validate()?;
        let mut state = self.lock()?;
        match state.compliances.get(&compliance.uuid) {
            Some(stored) if stored.task_uuid == compliance.task_uuid => {}
            Some(_) => {
                return Err(RepoError::Conflict {
                    id: compliance.uuid,
                    reason: "compliance cannot move to another task",
                })
            }
            None => return Err(RepoError::ComplianceNotFound(compliance.uuid)),
        }
        state.ensure_distinct_date(compliance)?;
        state.compliances.insert(compliance.uuid, compliance.clone());
        Ok(())
    }

    fn get_compliance(
        &self,
        id: ComplianceId,
        include_deleted: bool,
    ) -> RepoResult<Option<Compliance>> {
        let state = self.lock()?;
        Ok(state
            .compliances
            .get(&id)
            .filter(|compliance| include_deleted || compliance.is_active())
            .cloned())
    }

    fn list_compliances(
        &self,
        task_uuid: TaskId,
        include_deleted: bool,
    ) -> RepoResult<Vec<Compliance>> {
        let state = self.lock()?;
        let mut compliances: Vec<Compliance> = state
            .compliances
            .values()
            .filter(|compliance| compliance.task_uuid == task_uuid)
            .filter(|compliance| include_deleted || compliance.is_active())
            .cloned()
            .collect();
        compliances.sort_by(|left, right| left.perform_date.cmp(&right.perform_date));
        Ok(compliances)
    }

    fn soft_delete_compliance(&self, id: ComplianceId) -> RepoResult<()> {
        let mut state = self.lock()?;
        let compliance = state
            .compliances
            .get_mut(&id)
            .filter(|compliance| compliance.is_active())
            .ok_or(RepoError::ComplianceNotFound(id))?;
        compliance.soft_delete();
        Ok(())
    }

    fn get_latest_compliance(&self, task_uuid: TaskId) -> RepoResult<Option<Compliance>> {
        let state = self.lock()?;
        Ok(state
            .active_compliances_desc(task_uuid)
            .first()
            .map(|compliance| (*compliance).clone()))
    }

    fn get_previous_compliance(&self, task_uuid: TaskId) -> RepoResult<Option<Compliance>> {
        let state = self.lock()?;
        Ok(state
            .active_compliances_desc(task_uuid)
            .get(1)
            .map(|compliance| (*compliance).clone()))
    }

    fn save_schedule(&self, compliance: &Compliance) -> RepoResult<()> {
        let mut state = self.lock()?;
        let stored = state
            .compliances
            .get_mut(&compliance.uuid)
            .filter(|stored| stored.is_active())
            .ok_or(RepoError::ComplianceNotFound(compliance.uuid))?;
        stored.copy_schedule_from(compliance);
        Ok(())
    }
}
