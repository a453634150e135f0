//! Domain model for recurring maintenance tasks.
//!
//! # Responsibility
//! - Define the task, requirement and compliance records used by the engine.
//! - Own record-level invariants through `validate()` functions.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Deletion is represented by soft-delete tombstones, not hard delete.
//! - Compliance due/adjustment fields are engine-owned and never user input.

pub mod compliance;
pub mod decimal;
pub mod requirement;
pub mod task;
pub mod units;
