//! Uniqueness-enforcing entity collection.
//!
//! # Invariants
//! - At most one entity per normalized identifier.
//! - `list()` returns detached clones; callers never alias stored entities.

use crate::error::{CoreError, CoreResult};
use crate::model::call::Call;
use crate::model::ident::{CallKind, Id, IdKind, MunicipalityKind, SubmissionKind, UserKind};
use crate::model::municipality::Municipality;
use crate::model::submission::Submission;
use crate::model::user::User;
use std::collections::BTreeMap;

/// Entity stored in a [`Collection`], keyed by its identifier.
pub trait Entity: Clone {
    type Kind: IdKind;

    fn entity_id(&self) -> &Id<Self::Kind>;
}

impl Entity for User {
    type Kind = UserKind;

    fn entity_id(&self) -> &Id<UserKind> {
        self.id()
    }
}

impl Entity for Municipality {
    type Kind = MunicipalityKind;

    fn entity_id(&self) -> &Id<MunicipalityKind> {
        self.id()
    }
}

impl Entity for Call {
    type Kind = CallKind;

    fn entity_id(&self) -> &Id<CallKind> {
        self.id()
    }
}

impl Entity for Submission {
    type Kind = SubmissionKind;

    fn entity_id(&self) -> &Id<SubmissionKind> {
        self.id()
    }
}

/// Ordered store of one entity kind.
#[derive(Debug, Clone)]
pub struct Collection<E: Entity> {
    items: BTreeMap<Id<E::Kind>, E>,
}

impl<E: Entity> Default for Collection<E> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
        }
    }
}

impl<E: Entity> Collection<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity; fails when its identifier is already present.
    pub fn add(&mut self, entity: E) -> CoreResult<()> {
        let id = entity.entity_id().clone();
        if self.items.contains_key(&id) {
            return Err(CoreError::duplicate(E::Kind::ENTITY, id));
        }
        self.items.insert(id, entity);
        Ok(())
    }

    pub fn get(&self, id: &Id<E::Kind>) -> CoreResult<&E> {
        self.items
            .get(id)
            .ok_or_else(|| CoreError::not_found(E::Kind::ENTITY, id))
    }

    /// Parses raw identifier input and looks it up.
    pub fn lookup(&self, raw: &str) -> CoreResult<&E> {
        self.get(&Id::parse(raw)?)
    }

    pub fn get_mut(&mut self, id: &Id<E::Kind>) -> CoreResult<&mut E> {
        self.items
            .get_mut(id)
            .ok_or_else(|| CoreError::not_found(E::Kind::ENTITY, id))
    }

    pub fn contains(&self, id: &Id<E::Kind>) -> bool {
        self.items.contains_key(id)
    }

    /// Snapshot of all entities ordered by identifier.
    pub fn list(&self) -> Vec<E> {
        self.items.values().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes without cascading. Cascade execution only.
    pub(crate) fn take(&mut self, id: &Id<E::Kind>) -> CoreResult<E> {
        self.items
            .remove(id)
            .ok_or_else(|| CoreError::not_found(E::Kind::ENTITY, id))
    }
}
