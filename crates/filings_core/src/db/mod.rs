//! SQLite bootstrap for the filings schema.
//!
//! # Responsibility
//! - Open connections configured for the registry stores.
//! - Bring the users/municipalities/calls/submissions schema up to date.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Bootstrap failures surface as [`StorageError`](crate::repo::StorageError),
//!   the same error stores return.
//! - Nothing here holds a process-wide connection; callers pass the
//!   returned connection to the stores explicitly.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};
