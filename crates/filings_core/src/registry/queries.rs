//! Read-only queries over registry snapshots.

use crate::error::{CoreError, CoreResult};
use crate::model::call::Call;
use crate::model::event::TimedEvent;
use crate::model::ident::{CallId, EntityKind, MunicipalityId, SubmissionId, UserId};
use crate::model::municipality::Municipality;
use crate::model::permission::{ACTION_REPRESENT, ACTION_SUPERVISE};
use crate::model::submission::Submission;
use crate::model::user::User;
use crate::registry::Registry;

impl Registry {
    pub fn submissions_of_municipality(&self, municipality: &MunicipalityId) -> Vec<Submission> {
        self.submissions
            .list()
            .into_iter()
            .filter(|s| s.municipality_id() == Some(municipality))
            .collect()
    }

    pub fn submissions_of_call(&self, call: &CallId) -> Vec<Submission> {
        self.submissions
            .list()
            .into_iter()
            .filter(|s| s.call_id() == Some(call))
            .collect()
    }

    pub fn submissions_by_author(&self, author: &UserId) -> Vec<Submission> {
        self.submissions
            .list()
            .into_iter()
            .filter(|s| s.author_id() == Some(author))
            .collect()
    }

    /// Documents delivered by a municipality across all its submissions.
    pub fn total_documents_by_municipality(&self, municipality: &MunicipalityId) -> usize {
        self.submissions_of_municipality(municipality)
            .iter()
            .map(|s| s.documents().len())
            .sum()
    }

    pub fn open_calls(&self) -> Vec<Call> {
        self.calls
            .list()
            .into_iter()
            .filter(Call::is_open)
            .collect()
    }

    /// Whether any submission references the call.
    pub fn call_has_submissions(&self, call: &CallId) -> bool {
        self.submissions.iter().any(|s| s.call_id() == Some(call))
    }

    pub fn users_with_permission(&self, object: EntityKind, action: &str) -> Vec<User> {
        self.users
            .list()
            .into_iter()
            .filter(|u| u.role().has_permission(object, action))
            .collect()
    }

    /// Users whose role may supervise municipalities.
    pub fn supervisors(&self) -> Vec<User> {
        self.users_with_permission(EntityKind::Municipalities, ACTION_SUPERVISE)
    }

    /// Users whose role may represent a municipality.
    pub fn representatives(&self) -> Vec<User> {
        self.users_with_permission(EntityKind::Municipalities, ACTION_REPRESENT)
    }

    pub fn municipality_represented_by(&self, user: &UserId) -> Option<Municipality> {
        self.municipalities
            .list()
            .into_iter()
            .find(|m| m.representative() == Some(user))
    }

    pub fn municipalities_supervised_by(&self, user: &UserId) -> Vec<Municipality> {
        self.municipalities
            .list()
            .into_iter()
            .filter(|m| m.supervisor() == Some(user))
            .collect()
    }

    /// Resolves the submission's call and checks required documents.
    pub fn submission_compliance(&self, submission: &SubmissionId) -> CoreResult<bool> {
        let submission = self.submissions.get(submission)?;
        let call_id = submission
            .call_id()
            .ok_or(CoreError::NullReference("call"))?;
        let call = self.calls.get(call_id)?;
        Ok(submission.is_fully_compliant(call))
    }

    /// Calls and submissions ordered by start date, then id.
    pub fn timeline(&self) -> Vec<TimedEvent<'_>> {
        let mut events: Vec<TimedEvent<'_>> = self
            .calls
            .iter()
            .map(TimedEvent::Call)
            .chain(self.submissions.iter().map(TimedEvent::Submission))
            .collect();
        events.sort_by(|a, b| {
            a.start_date()
                .cmp(&b.start_date())
                .then_with(|| a.id().cmp(b.id()))
        });
        events
    }
}
