//! Core domain logic for municipal accountability filings.
//! Calls for submissions, the filings municipalities deliver against them,
//! and the users and roles allowed to manage both.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use db::{open_db, open_db_in_memory};
pub use error::{CoreError, CoreResult};
pub use logging::{default_log_level, init_logging, init_logging_from, logging_status};
pub use model::call::Call;
pub use model::documents::DocumentSet;
pub use model::event::TimedEvent;
pub use model::ident::{CallId, EntityKind, Id, MunicipalityId, SubmissionId, UserId};
pub use model::municipality::Municipality;
pub use model::permission::{AccessDenied, Permission, Role, RoleKind};
pub use model::submission::Submission;
pub use model::user::User;
pub use registry::cascade::{CascadeReport, CascadeStep, CascadeTarget};
pub use registry::Registry;
pub use repo::{EntityStore, FieldValue, StorageError, StoreResult};
pub use service::registry_service::{RegistryService, StoreSet};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
