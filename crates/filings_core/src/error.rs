//! Core error kinds shared by model, registry and service layers.
//!
//! # Responsibility
//! - Name every invariant violation the core can raise.
//! - Chain persistence causes through `Error::source`.
//!
//! # Invariants
//! - Errors are raised at the point of violation and never swallowed.
//! - A failed constructor never leaves a partially built entity behind.

use crate::model::ident::{EntityKind, MunicipalityId, UserId};
use crate::repo::StorageError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Error raised by core operations.
#[derive(Debug)]
pub enum CoreError {
    /// Identifier or field fails length/shape constraints.
    Format {
        field: &'static str,
        message: String,
    },
    /// Chronological invariant violated.
    Date(String),
    /// Identifier already present in its collection.
    Duplicate { kind: EntityKind, id: String },
    /// User already represents another municipality.
    RepresentativeTaken {
        user: UserId,
        represents: MunicipalityId,
        requested: MunicipalityId,
    },
    /// Identifier absent from its collection.
    NotFound { kind: EntityKind, id: String },
    /// Document not allowed, already held, or not present.
    InvalidDocument(String),
    /// Required relation is missing.
    NullReference(&'static str),
    /// Persistence collaborator failure.
    Storage(StorageError),
}

impl CoreError {
    pub(crate) fn format(field: &'static str, message: impl Into<String>) -> Self {
        Self::Format {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn not_found(kind: EntityKind, id: impl Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate(kind: EntityKind, id: impl Display) -> Self {
        Self::Duplicate {
            kind,
            id: id.to_string(),
        }
    }

    /// Stable metadata-only code for logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Format { .. } => "format_error",
            Self::Date(_) => "date_error",
            Self::Duplicate { .. } => "duplicate_error",
            Self::RepresentativeTaken { .. } => "representative_taken_error",
            Self::NotFound { .. } => "not_found_error",
            Self::InvalidDocument(_) => "invalid_document_error",
            Self::NullReference(_) => "null_reference_error",
            Self::Storage(_) => "storage_error",
        }
    }
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Format { field, message } => write!(f, "invalid {field}: {message}"),
            Self::Date(message) => write!(f, "invalid date: {message}"),
            Self::Duplicate { kind, id } => write!(f, "{} already exists: {id}", kind.singular()),
            Self::RepresentativeTaken {
                user,
                represents,
                requested,
            } => write!(
                f,
                "user {user} already represents municipality {represents}; cannot also represent {requested}"
            ),
            Self::NotFound { kind, id } => write!(f, "{} not found: {id}", kind.singular()),
            Self::InvalidDocument(message) => write!(f, "invalid document: {message}"),
            Self::NullReference(relation) => write!(f, "missing required {relation} reference"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}
