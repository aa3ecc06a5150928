//! Audit output model.

pub mod types;

pub use types::{AuditReport, ContextScope, KeyRecord, Warning, NEVER_USED, NOT_APPLICABLE};
