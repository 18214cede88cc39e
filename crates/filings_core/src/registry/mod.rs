//! In-memory registry of users, municipalities, calls and submissions.
//!
//! # Responsibility
//! - Own the four collections and enforce referential integrity on insert.
//! - Route every removal through the cascade table.
//! - Rewire supervisor/representative relations.
//!
//! # Invariants
//! - Every id referenced by a stored entity names a stored entity.
//! - A user represents at most one municipality at a time.
//! - The registry never calls persistence; see `service` for that.

pub mod cascade;
pub mod collection;
mod queries;

use crate::error::{CoreError, CoreResult};
use crate::model::call::Call;
use crate::model::ident::{CallId, EntityKind, MunicipalityId, SubmissionId, UserId};
use crate::model::municipality::Municipality;
use crate::model::submission::Submission;
use crate::model::user::User;
use cascade::{cascade_plan, CascadeReport, CascadeTarget};
use collection::Collection;

/// Arena of all entities, addressed by identifier.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    users: Collection<User>,
    municipalities: Collection<Municipality>,
    calls: Collection<Call>,
    submissions: Collection<Submission>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> &Collection<User> {
        &self.users
    }

    pub fn municipalities(&self) -> &Collection<Municipality> {
        &self.municipalities
    }

    pub fn calls(&self) -> &Collection<Call> {
        &self.calls
    }

    pub fn submissions(&self) -> &Collection<Submission> {
        &self.submissions
    }

    pub fn add_user(&mut self, user: User) -> CoreResult<()> {
        self.users.add(user)
    }

    /// Adds a municipality whose stored relations must name known users.
    pub fn add_municipality(&mut self, municipality: Municipality) -> CoreResult<()> {
        if self.municipalities.contains(municipality.id()) {
            return Err(CoreError::duplicate(
                EntityKind::Municipalities,
                municipality.id(),
            ));
        }
        if let Some(user) = municipality.supervisor() {
            self.users.get(user)?;
        }
        if let Some(user) = municipality.representative() {
            self.users.get(user)?;
            if let Some(other) = self.municipality_represented_by(user) {
                return Err(CoreError::RepresentativeTaken {
                    user: user.clone(),
                    represents: other.id().clone(),
                    requested: municipality.id().clone(),
                });
            }
        }
        self.municipalities.add(municipality)
    }

    pub fn add_call(&mut self, call: Call) -> CoreResult<()> {
        self.calls.add(call)
    }

    /// Adds a submission whose call, author and municipality must exist.
    pub fn add_submission(&mut self, submission: Submission) -> CoreResult<()> {
        let call = submission
            .call_id()
            .ok_or(CoreError::NullReference("call"))?;
        let author = submission
            .author_id()
            .ok_or(CoreError::NullReference("author"))?;
        let municipality = submission
            .municipality_id()
            .ok_or(CoreError::NullReference("municipality"))?;
        self.calls.get(call)?;
        self.users.get(author)?;
        self.municipalities.get(municipality)?;
        self.submissions.add(submission)
    }

    pub fn user_mut(&mut self, id: &UserId) -> CoreResult<&mut User> {
        self.users.get_mut(id)
    }

    pub fn municipality_mut(&mut self, id: &MunicipalityId) -> CoreResult<&mut Municipality> {
        self.municipalities.get_mut(id)
    }

    pub fn call_mut(&mut self, id: &CallId) -> CoreResult<&mut Call> {
        self.calls.get_mut(id)
    }

    pub fn submission_mut(&mut self, id: &SubmissionId) -> CoreResult<&mut Submission> {
        self.submissions.get_mut(id)
    }

    pub fn remove_user(&mut self, id: &UserId) -> CoreResult<CascadeReport> {
        self.users.get(id)?;
        self.remove(CascadeTarget::User(id.clone()))
    }

    pub fn remove_municipality(&mut self, id: &MunicipalityId) -> CoreResult<CascadeReport> {
        self.municipalities.get(id)?;
        self.remove(CascadeTarget::Municipality(id.clone()))
    }

    pub fn remove_call(&mut self, id: &CallId) -> CoreResult<CascadeReport> {
        self.calls.get(id)?;
        self.remove(CascadeTarget::Call(id.clone()))
    }

    pub fn remove_submission(&mut self, id: &SubmissionId) -> CoreResult<CascadeReport> {
        self.submissions.get(id)?;
        self.remove(CascadeTarget::Submission(id.clone()))
    }

    fn remove(&mut self, target: CascadeTarget) -> CoreResult<CascadeReport> {
        let steps = cascade_plan(self, &target);
        cascade::execute(self, target, steps)
    }

    /// Makes `user` the representative of `municipality`.
    ///
    /// Any other municipality the user already represents loses its
    /// representative first; that municipality is returned.
    pub fn assign_representative(
        &mut self,
        municipality: &MunicipalityId,
        user: &UserId,
    ) -> CoreResult<Option<MunicipalityId>> {
        self.municipalities.get(municipality)?;
        self.users.get(user)?;

        let previous = self
            .municipality_represented_by(user)
            .map(|m| m.id().clone())
            .filter(|id| id != municipality);
        if let Some(previous) = &previous {
            self.municipalities
                .get_mut(previous)?
                .set_representative(None);
        }
        self.municipalities
            .get_mut(municipality)?
            .set_representative(Some(user.clone()));
        Ok(previous)
    }

    /// Clears the representative and returns the user who held it.
    pub fn clear_representative(
        &mut self,
        municipality: &MunicipalityId,
    ) -> CoreResult<Option<UserId>> {
        let municipality = self.municipalities.get_mut(municipality)?;
        let previous = municipality.representative().cloned();
        municipality.set_representative(None);
        Ok(previous)
    }

    /// Sets the supervisor and returns the previous one.
    pub fn assign_supervisor(
        &mut self,
        municipality: &MunicipalityId,
        user: &UserId,
    ) -> CoreResult<Option<UserId>> {
        self.users.get(user)?;
        let municipality = self.municipalities.get_mut(municipality)?;
        let previous = municipality.supervisor().cloned();
        municipality.set_supervisor(Some(user.clone()));
        Ok(previous)
    }

    pub fn clear_supervisor(&mut self, municipality: &MunicipalityId) -> CoreResult<Option<UserId>> {
        let municipality = self.municipalities.get_mut(municipality)?;
        let previous = municipality.supervisor().cloned();
        municipality.set_supervisor(None);
        Ok(previous)
    }
}
