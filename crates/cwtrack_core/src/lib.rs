//! Core domain logic for cwtrack.
//! This crate owns the compliance scheduling invariants and the due-date engine.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AdjustmentPolicy, ConfigError, CoreConfig, EngineConfig, LoggingConfig};
pub use engine::{
    compute_schedule, AxisState, DueAxis, DueEngine, EngineError, EngineResult, RecomputeReport,
    ScheduleOutcome, ToleranceWindow,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::compliance::{
    check_order, Compliance, ComplianceId, ComplianceOrderError, ComplianceValidationError,
};
pub use model::decimal::{Decimal2, Decimal2Error};
pub use model::requirement::{
    CalendarDue, Requirement, RequirementId, RequirementValidationError, Tolerance,
};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use model::units::{
    Axis, CalendarToleranceUnit, CyclesToleranceUnit, DueMonthsUnit, HoursToleranceUnit,
};
pub use repo::{
    ComplianceRepository, MaintenanceRepository, MemoryStore, RepoError, RepoResult,
    RequirementRepository, TaskRepository,
};
pub use service::maintenance_service::{MaintenanceService, ServiceError, TaskOverview};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
