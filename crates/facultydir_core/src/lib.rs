//! Core logic for the faculty directory importer.
//! This crate is the single source of truth for reconciliation invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod source;
pub mod text;

pub use config::{ClassifierConfig, ConfigError, ImportOptions};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{Department, DepartmentId, DepartmentType};
pub use model::faculty::{Faculty, FacultyId};
pub use model::publication::{Publication, PublicationId, PublicationKind, PublicationSource};
pub use repo::{RepoError, RepoResult, Resolved};
pub use service::import_service::{import_table, ImportError, ImportService, ImportSummary};
pub use source::{read_source, SourceError, SourceRow, SourceTable};
pub use text::classify::DepartmentClassifier;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
