//! Normalized string identifiers.
//!
//! # Responsibility
//! - Normalize raw identifier input (trim + lowercase).
//! - Enforce per-entity length bounds through the `IdKind` hook.
//!
//! # Invariants
//! - Two identifiers are equal iff their normalized text is equal.
//! - Length bounds are measured in characters after normalization.

use crate::error::{CoreError, CoreResult};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;

/// Object tags used by collections, permissions and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Users,
    Municipalities,
    Calls,
    Submissions,
}

impl EntityKind {
    /// All object tags in dependency order.
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Users,
        EntityKind::Municipalities,
        EntityKind::Calls,
        EntityKind::Submissions,
    ];

    /// Stable object tag used in grant tables.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Users => "Users",
            Self::Municipalities => "Municipalities",
            Self::Calls => "Calls",
            Self::Submissions => "Submissions",
        }
    }

    /// Lowercase singular noun for messages.
    pub fn singular(self) -> &'static str {
        match self {
            Self::Users => "user",
            Self::Municipalities => "municipality",
            Self::Calls => "call",
            Self::Submissions => "submission",
        }
    }

    /// Parses an object tag. Matching is exact.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format hook supplying identifier bounds for one entity kind.
pub trait IdKind: Copy + Eq + Ord + Hash + std::fmt::Debug {
    const ENTITY: EntityKind;
    const FIELD: &'static str;
    const MIN_LEN: usize;
    const MAX_LEN: usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MunicipalityKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CallKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubmissionKind {}

impl IdKind for UserKind {
    const ENTITY: EntityKind = EntityKind::Users;
    const FIELD: &'static str = "user id";
    const MIN_LEN: usize = 1;
    const MAX_LEN: usize = 10;
}

impl IdKind for MunicipalityKind {
    const ENTITY: EntityKind = EntityKind::Municipalities;
    const FIELD: &'static str = "municipality id";
    const MIN_LEN: usize = 1;
    const MAX_LEN: usize = 30;
}

impl IdKind for CallKind {
    const ENTITY: EntityKind = EntityKind::Calls;
    const FIELD: &'static str = "call id";
    const MIN_LEN: usize = 1;
    const MAX_LEN: usize = 100;
}

impl IdKind for SubmissionKind {
    const ENTITY: EntityKind = EntityKind::Submissions;
    const FIELD: &'static str = "submission id";
    const MIN_LEN: usize = 1;
    const MAX_LEN: usize = 100;
}

/// Normalized identifier tagged with the entity kind it names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id<K: IdKind> {
    value: String,
    kind: PhantomData<K>,
}

pub type UserId = Id<UserKind>;
pub type MunicipalityId = Id<MunicipalityKind>;
pub type CallId = Id<CallKind>;
pub type SubmissionId = Id<SubmissionKind>;

impl<K: IdKind> Id<K> {
    /// Normalizes and validates raw identifier input.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let value = normalize_identifier(raw);
        let len = value.chars().count();
        if len < K::MIN_LEN || len > K::MAX_LEN {
            return Err(CoreError::format(
                K::FIELD,
                format!(
                    "length must be between {} and {} characters, got {len}",
                    K::MIN_LEN,
                    K::MAX_LEN
                ),
            ));
        }
        Ok(Self {
            value,
            kind: PhantomData,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Entity kind this identifier belongs to.
    pub fn entity(&self) -> EntityKind {
        K::ENTITY
    }
}

impl<K: IdKind> Display for Id<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K: IdKind> FromStr for Id<K> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<K: IdKind> Serialize for Id<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.value)
    }
}

impl<'de, K: IdKind> Deserialize<'de> for Id<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(D::Error::custom)
    }
}

/// Lowercases and trims identifier input.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Trims a free-text field and enforces character bounds.
pub(crate) fn bounded_text(
    field: &'static str,
    raw: &str,
    min_len: usize,
    max_len: usize,
) -> CoreResult<String> {
    let value = raw.trim();
    let len = value.chars().count();
    if len < min_len || len > max_len {
        return Err(CoreError::format(
            field,
            format!("length must be between {min_len} and {max_len} characters, got {len}"),
        ));
    }
    Ok(value.to_string())
}
