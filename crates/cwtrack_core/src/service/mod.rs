//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into task, requirement and compliance
//!   use cases.
//! - Trigger the due engine synchronously after every schedule-affecting
//!   mutation.

pub mod maintenance_service;
