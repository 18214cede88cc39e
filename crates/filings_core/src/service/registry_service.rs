//! Registry use-case service with storage write-through.
//!
//! # Responsibility
//! - Load the in-memory registry from the four entity stores.
//! - Apply every mutation to the registry first, then mirror it to storage.
//! - Replay cascade reports step by step against the stores.
//!
//! # Invariants
//! - The registry is the validation gate; storage only sees accepted state.
//! - Cascade mirroring follows report order and stops at the first storage
//!   failure without undoing earlier steps.
//! - Log lines carry ids and error codes only, never secrets or document
//!   names.

use crate::error::{CoreError, CoreResult};
use crate::model::call::Call;
use crate::model::ident::{CallId, MunicipalityId, SubmissionId, UserId};
use crate::model::municipality::Municipality;
use crate::model::permission::Role;
use crate::model::submission::Submission;
use crate::model::user::User;
use crate::registry::cascade::{CascadeReport, CascadeStep};
use crate::registry::Registry;
use crate::repo::{
    EntityStore, FieldValue, SqliteCallStore, SqliteMunicipalityStore, SqliteSubmissionStore,
    SqliteUserStore, StoreResult,
};
use chrono::NaiveDate;
use log::{error, info, warn};
use rusqlite::Connection;

/// One store per entity kind.
pub struct StoreSet<'a> {
    pub users: Box<dyn EntityStore<User> + 'a>,
    pub municipalities: Box<dyn EntityStore<Municipality> + 'a>,
    pub calls: Box<dyn EntityStore<Call> + 'a>,
    pub submissions: Box<dyn EntityStore<Submission> + 'a>,
}

impl<'a> StoreSet<'a> {
    /// Builds SQLite stores sharing one migrated connection.
    pub fn sqlite(conn: &'a Connection) -> StoreResult<Self> {
        Ok(Self {
            users: Box::new(SqliteUserStore::try_new(conn)?),
            municipalities: Box::new(SqliteMunicipalityStore::try_new(conn)?),
            calls: Box::new(SqliteCallStore::try_new(conn)?),
            submissions: Box::new(SqliteSubmissionStore::try_new(conn)?),
        })
    }
}

/// Registry facade that keeps storage in step with in-memory state.
pub struct RegistryService<'a> {
    registry: Registry,
    stores: StoreSet<'a>,
}

impl<'a> RegistryService<'a> {
    /// Loads every persisted entity, in dependency order, into a registry.
    pub fn load(stores: StoreSet<'a>) -> CoreResult<Self> {
        let mut registry = Registry::new();
        let result = (|| -> CoreResult<()> {
            for user in stores.users.read_all()? {
                registry.add_user(user)?;
            }
            for municipality in stores.municipalities.read_all()? {
                registry.add_municipality(municipality)?;
            }
            for call in stores.calls.read_all()? {
                registry.add_call(call)?;
            }
            for submission in stores.submissions.read_all()? {
                registry.add_submission(submission)?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                info!(
                    "event=registry_load module=service status=ok users={} municipalities={} calls={} submissions={}",
                    registry.users().len(),
                    registry.municipalities().len(),
                    registry.calls().len(),
                    registry.submissions().len()
                );
                Ok(Self { registry, stores })
            }
            Err(err) => {
                error!(
                    "event=registry_load module=service status=error error_code={}",
                    err.code()
                );
                Err(err)
            }
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn create_user(&mut self, user: User) -> CoreResult<()> {
        let subject = user.id().to_string();
        let result = self.registry.add_user(user.clone()).and_then(|()| {
            self.stores.users.save(&user)?;
            Ok(())
        });
        record("user_create", &subject, result)
    }

    pub fn create_municipality(&mut self, municipality: Municipality) -> CoreResult<()> {
        let subject = municipality.id().to_string();
        let result = self
            .registry
            .add_municipality(municipality.clone())
            .and_then(|()| {
                self.stores.municipalities.save(&municipality)?;
                Ok(())
            });
        record("municipality_create", &subject, result)
    }

    pub fn create_call(&mut self, call: Call) -> CoreResult<()> {
        let subject = call.id().to_string();
        let result = self.registry.add_call(call.clone()).and_then(|()| {
            self.stores.calls.save(&call)?;
            Ok(())
        });
        record("call_create", &subject, result)
    }

    pub fn create_submission(&mut self, submission: Submission) -> CoreResult<()> {
        let subject = submission.id().to_string();
        let result = self
            .registry
            .add_submission(submission.clone())
            .and_then(|()| {
                self.stores.submissions.save(&submission)?;
                Ok(())
            });
        record("submission_create", &subject, result)
    }

    pub fn rename_user(&mut self, id: &UserId, name: &str) -> CoreResult<()> {
        let result = self.registry.user_mut(id).and_then(|user| {
            user.set_name(name)?;
            let value = FieldValue::Text(user.name().to_string());
            self.stores.users.update_field(id, "name", value)?;
            Ok(())
        });
        record("user_rename", id.as_str(), result)
    }

    pub fn change_user_secret(&mut self, id: &UserId, secret: &str) -> CoreResult<()> {
        let result = self.registry.user_mut(id).and_then(|user| {
            user.set_secret(secret)?;
            let value = FieldValue::Text(user.secret().to_string());
            self.stores.users.update_field(id, "secret", value)?;
            Ok(())
        });
        record("user_secret_change", id.as_str(), result)
    }

    pub fn change_user_role(&mut self, id: &UserId, role: Role) -> CoreResult<()> {
        let result = self.registry.user_mut(id).and_then(|user| {
            user.set_role(role);
            self.stores.users.save(user)?;
            Ok(())
        });
        record("user_role_change", id.as_str(), result)
    }

    pub fn update_municipality(
        &mut self,
        id: &MunicipalityId,
        name: &str,
        category: i64,
    ) -> CoreResult<()> {
        let result = self.registry.municipality_mut(id).and_then(|municipality| {
            municipality.set_name(name)?;
            municipality.set_category(category);
            self.stores.municipalities.update_field(
                id,
                "name",
                FieldValue::Text(municipality.name().to_string()),
            )?;
            self.stores
                .municipalities
                .update_field(id, "category", FieldValue::Integer(category))?;
            Ok(())
        });
        record("municipality_update", id.as_str(), result)
    }

    /// Makes `user` the representative of `municipality`; see
    /// [`Registry::assign_representative`].
    pub fn assign_representative(
        &mut self,
        municipality: &MunicipalityId,
        user: &UserId,
    ) -> CoreResult<Option<MunicipalityId>> {
        let result = self
            .registry
            .assign_representative(municipality, user)
            .and_then(|previous| {
                if let Some(previous) = &previous {
                    self.stores.municipalities.update_field(
                        previous,
                        "representative_id",
                        FieldValue::Null,
                    )?;
                }
                self.stores.municipalities.update_field(
                    municipality,
                    "representative_id",
                    FieldValue::optional_id(Some(user)),
                )?;
                Ok(previous)
            });
        record("representative_assign", municipality.as_str(), result)
    }

    pub fn clear_representative(
        &mut self,
        municipality: &MunicipalityId,
    ) -> CoreResult<Option<UserId>> {
        let result = self
            .registry
            .clear_representative(municipality)
            .and_then(|previous| {
                self.stores.municipalities.update_field(
                    municipality,
                    "representative_id",
                    FieldValue::Null,
                )?;
                Ok(previous)
            });
        record("representative_clear", municipality.as_str(), result)
    }

    pub fn assign_supervisor(
        &mut self,
        municipality: &MunicipalityId,
        user: &UserId,
    ) -> CoreResult<Option<UserId>> {
        let result = self
            .registry
            .assign_supervisor(municipality, user)
            .and_then(|previous| {
                self.stores.municipalities.update_field(
                    municipality,
                    "supervisor_id",
                    FieldValue::optional_id(Some(user)),
                )?;
                Ok(previous)
            });
        record("supervisor_assign", municipality.as_str(), result)
    }

    pub fn clear_supervisor(&mut self, municipality: &MunicipalityId) -> CoreResult<Option<UserId>> {
        let result = self
            .registry
            .clear_supervisor(municipality)
            .and_then(|previous| {
                self.stores.municipalities.update_field(
                    municipality,
                    "supervisor_id",
                    FieldValue::Null,
                )?;
                Ok(previous)
            });
        record("supervisor_clear", municipality.as_str(), result)
    }

    pub fn set_call_description(&mut self, id: &CallId, description: &str) -> CoreResult<()> {
        let result = self.registry.call_mut(id).and_then(|call| {
            call.set_description(description)?;
            self.stores.calls.update_field(
                id,
                "description",
                FieldValue::Text(call.description().to_string()),
            )?;
            Ok(())
        });
        record("call_description_update", id.as_str(), result)
    }

    /// Moves the call start date as of `today`, mirroring the open flag.
    pub fn set_call_start_date(
        &mut self,
        id: &CallId,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> CoreResult<()> {
        let result = self.registry.call_mut(id).and_then(|call| {
            call.set_start_date_as_of(start_date, today)?;
            self.stores
                .calls
                .update_field(id, "start_date", FieldValue::Date(start_date))?;
            self.stores
                .calls
                .update_field(id, "is_open", FieldValue::Bool(call.is_open()))?;
            Ok(())
        });
        record("call_start_update", id.as_str(), result)
    }

    /// Moves the call close date as of `today`, mirroring the open flag.
    pub fn set_call_close_date(
        &mut self,
        id: &CallId,
        close_date: NaiveDate,
        today: NaiveDate,
    ) -> CoreResult<()> {
        let result = self.registry.call_mut(id).and_then(|call| {
            call.set_close_date_as_of(close_date, today)?;
            self.stores
                .calls
                .update_field(id, "close_date", FieldValue::Date(close_date))?;
            self.stores
                .calls
                .update_field(id, "is_open", FieldValue::Bool(call.is_open()))?;
            Ok(())
        });
        record("call_close_update", id.as_str(), result)
    }

    pub fn set_call_open(&mut self, id: &CallId, open: bool) -> CoreResult<()> {
        let result = self.registry.call_mut(id).and_then(|call| {
            call.set_open(open);
            self.stores
                .calls
                .update_field(id, "is_open", FieldValue::Bool(open))?;
            Ok(())
        });
        record("call_open_update", id.as_str(), result)
    }

    pub fn add_required_document(&mut self, id: &CallId, name: &str) -> CoreResult<()> {
        let result = self.registry.call_mut(id).and_then(|call| {
            call.required_documents_mut().add(name)?;
            self.stores.calls.save(call)?;
            Ok(())
        });
        record("call_document_add", id.as_str(), result)
    }

    pub fn remove_required_document(&mut self, id: &CallId, name: &str) -> CoreResult<()> {
        let result = self.registry.call_mut(id).and_then(|call| {
            call.required_documents_mut().remove(name)?;
            self.stores.calls.save(call)?;
            Ok(())
        });
        record("call_document_remove", id.as_str(), result)
    }

    pub fn set_submission_start_date(
        &mut self,
        id: &SubmissionId,
        start_date: NaiveDate,
        today: NaiveDate,
    ) -> CoreResult<()> {
        let result = self.registry.submission_mut(id).and_then(|submission| {
            submission.set_start_date_as_of(start_date, today)?;
            self.stores
                .submissions
                .update_field(id, "start_date", FieldValue::Date(start_date))?;
            Ok(())
        });
        record("submission_start_update", id.as_str(), result)
    }

    pub fn set_submission_open(&mut self, id: &SubmissionId, open: bool) -> CoreResult<()> {
        let result = self.registry.submission_mut(id).and_then(|submission| {
            submission.set_open(open);
            self.stores
                .submissions
                .update_field(id, "is_open", FieldValue::Bool(open))?;
            Ok(())
        });
        record("submission_open_update", id.as_str(), result)
    }

    pub fn add_submission_document(&mut self, id: &SubmissionId, name: &str) -> CoreResult<()> {
        let result = self.registry.submission_mut(id).and_then(|submission| {
            submission.documents_mut().add(name)?;
            self.stores.submissions.save(submission)?;
            Ok(())
        });
        record("submission_document_add", id.as_str(), result)
    }

    pub fn remove_submission_document(&mut self, id: &SubmissionId, name: &str) -> CoreResult<()> {
        let result = self.registry.submission_mut(id).and_then(|submission| {
            submission.documents_mut().remove(name)?;
            self.stores.submissions.save(submission)?;
            Ok(())
        });
        record("submission_document_remove", id.as_str(), result)
    }

    pub fn remove_user(&mut self, id: &UserId) -> CoreResult<CascadeReport> {
        let result = self.registry.remove_user(id);
        self.mirror("user_remove", id.as_str(), result)
    }

    pub fn remove_municipality(&mut self, id: &MunicipalityId) -> CoreResult<CascadeReport> {
        let result = self.registry.remove_municipality(id);
        self.mirror("municipality_remove", id.as_str(), result)
    }

    pub fn remove_call(&mut self, id: &CallId) -> CoreResult<CascadeReport> {
        let result = self.registry.remove_call(id);
        self.mirror("call_remove", id.as_str(), result)
    }

    pub fn remove_submission(&mut self, id: &SubmissionId) -> CoreResult<CascadeReport> {
        let result = self.registry.remove_submission(id);
        self.mirror("submission_remove", id.as_str(), result)
    }

    fn mirror(
        &self,
        event: &'static str,
        subject: &str,
        result: CoreResult<CascadeReport>,
    ) -> CoreResult<CascadeReport> {
        let result = result.and_then(|report| {
            for step in report.steps() {
                self.mirror_step(step)?;
            }
            Ok(report)
        });
        if let Ok(report) = &result {
            info!(
                "event={event} module=service status=ok kind={} subject={subject} steps={} submissions_removed={} refs_cleared={}",
                report.target().kind(),
                report.steps().len(),
                report.removed_submissions().len(),
                report.cleared_references()
            );
            return result;
        }
        record(event, subject, result)
    }

    fn mirror_step(&self, step: &CascadeStep) -> CoreResult<()> {
        match step {
            CascadeStep::ClearSupervisor(id) => {
                self.stores
                    .municipalities
                    .update_field(id, "supervisor_id", FieldValue::Null)?;
            }
            CascadeStep::ClearRepresentative(id) => {
                self.stores
                    .municipalities
                    .update_field(id, "representative_id", FieldValue::Null)?;
            }
            CascadeStep::RemoveSubmission(id) => self.stores.submissions.delete_by_id(id)?,
            CascadeStep::RemoveMunicipality(id) => self.stores.municipalities.delete_by_id(id)?,
            CascadeStep::RemoveCall(id) => self.stores.calls.delete_by_id(id)?,
            CascadeStep::RemoveUser(id) => self.stores.users.delete_by_id(id)?,
        }
        Ok(())
    }
}

fn record<T>(event: &'static str, subject: &str, result: CoreResult<T>) -> CoreResult<T> {
    match &result {
        Ok(_) => info!("event={event} module=service status=ok subject={subject}"),
        Err(err @ CoreError::Storage(_)) => error!(
            "event={event} module=service status=error subject={subject} error_code={} error={err}",
            err.code()
        ),
        Err(err) => warn!(
            "event={event} module=service status=error subject={subject} error_code={}",
            err.code()
        ),
    }
    result
}
