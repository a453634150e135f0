//! Task domain model.
//!
//! # Responsibility
//! - Define the recurring maintenance item that owns requirements and
//!   compliance records.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `uuid` is stable and non-nil.
//! - `code` is trimmed and non-empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a task.
pub type TaskId = Uuid;

/// Recurring maintenance item, e.g. an aircraft component inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    /// Short human label such as `00-IJM-001`.
    pub code: String,
    pub description: String,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a task with a generated ID.
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), code, description)
    }

    /// Creates a task with a caller-provided ID.
    pub fn with_id(
        uuid: TaskId,
        code: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let now = Utc::now();
        let task = Self {
            uuid,
            code: code.into().trim().to_string(),
            description: description.into(),
            is_deleted: false,
            created_at: now,
            updated_at: now,
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.uuid.is_nil() {
            return Err(TaskValidationError::NilUuid);
        }
        if self.code.trim().is_empty() {
            return Err(TaskValidationError::EmptyCode);
        }
        Ok(())
    }

    /// Marks this task as softly deleted.
    pub fn soft_delete(&mut self) {
        self.is_deleted = true;
    }

    pub fn restore(&mut self) {
        self.is_deleted = false;
    }

    pub fn is_active(&self) -> bool {
        !self.is_deleted
    }
}

/// Task invariant violations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilUuid,
    EmptyCode,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "task uuid must not be nil"),
            Self::EmptyCode => write!(f, "task code must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}
