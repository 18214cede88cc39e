//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate registry mutations and their storage mirror into use-case
//!   level APIs.
//! - Keep controller layers decoupled from storage details.

pub mod registry_service;
