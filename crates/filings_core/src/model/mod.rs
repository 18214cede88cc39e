//! Domain model for calls, submissions, municipalities and users.
//!
//! # Responsibility
//! - Define entities whose constructors are the sole validation gate.
//! - Keep relations as identifiers resolved through the registry.
//!
//! # Invariants
//! - Constructors validate every field before returning; no partial entity
//!   escapes a failed construction.
//! - Entities never reference each other directly.

pub mod call;
pub mod documents;
pub mod event;
pub mod ident;
pub mod municipality;
pub mod permission;
pub mod submission;
pub mod user;
