//! Submission (filing) model.
//!
//! # Responsibility
//! - Reference exactly one call, one author and one municipality by id.
//! - Compare delivered documents against the call's required set.
//!
//! # Invariants
//! - Start date is never later than `today` when set through constructors
//!   or setters.
//! - Relations are only nulled by the registry while deleting the entity.

use crate::error::{CoreError, CoreResult};
use crate::model::call::Call;
use crate::model::documents::DocumentSet;
use crate::model::event::{today, EventCore};
use crate::model::ident::{CallId, MunicipalityId, SubmissionId, SubmissionKind, UserId};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

/// One municipality's filing against one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    #[serde(flatten)]
    core: EventCore<SubmissionKind>,
    call: Option<CallId>,
    author: Option<UserId>,
    municipality: Option<MunicipalityId>,
}

impl Submission {
    /// Creates an open submission with an empty document set.
    pub fn new(
        id: &str,
        start_date: NaiveDate,
        call: Option<CallId>,
        author: Option<UserId>,
        municipality: Option<MunicipalityId>,
    ) -> CoreResult<Self> {
        Self::new_as_of(id, start_date, call, author, municipality, today())
    }

    pub fn new_as_of(
        id: &str,
        start_date: NaiveDate,
        call: Option<CallId>,
        author: Option<UserId>,
        municipality: Option<MunicipalityId>,
        today: NaiveDate,
    ) -> CoreResult<Self> {
        ensure_not_future(start_date, today)?;
        Self::build(
            id,
            start_date,
            true,
            call,
            author,
            municipality,
            DocumentSet::default(),
        )
    }

    /// Rebuilds a persisted submission with its stored flag and documents.
    pub fn restore<I, S>(
        id: &str,
        start_date: NaiveDate,
        open: bool,
        call: Option<CallId>,
        author: Option<UserId>,
        municipality: Option<MunicipalityId>,
        documents: I,
    ) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = DocumentSet::unconstrained(documents)?;
        Self::build(id, start_date, open, call, author, municipality, documents)
    }

    fn build(
        id: &str,
        start_date: NaiveDate,
        open: bool,
        call: Option<CallId>,
        author: Option<UserId>,
        municipality: Option<MunicipalityId>,
        documents: DocumentSet,
    ) -> CoreResult<Self> {
        let id = SubmissionId::parse(id)?;
        let municipality = municipality.ok_or(CoreError::NullReference("municipality"))?;
        let call = call.ok_or(CoreError::NullReference("call"))?;
        let author = author.ok_or(CoreError::NullReference("author"))?;
        Ok(Self {
            core: EventCore::new(id, start_date, open, documents),
            call: Some(call),
            author: Some(author),
            municipality: Some(municipality),
        })
    }

    pub fn id(&self) -> &SubmissionId {
        self.core.id()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.core.start_date()
    }

    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    pub fn call_id(&self) -> Option<&CallId> {
        self.call.as_ref()
    }

    pub fn author_id(&self) -> Option<&UserId> {
        self.author.as_ref()
    }

    pub fn municipality_id(&self) -> Option<&MunicipalityId> {
        self.municipality.as_ref()
    }

    pub fn documents(&self) -> &DocumentSet {
        self.core.documents()
    }

    pub fn documents_mut(&mut self) -> &mut DocumentSet {
        self.core.documents_mut()
    }

    pub fn set_open(&mut self, open: bool) {
        self.core.set_open(open);
    }

    /// Flips the open flag and returns the new value.
    pub fn toggle_open(&mut self) -> bool {
        let open = !self.core.is_open();
        self.core.set_open(open);
        open
    }

    pub fn set_start_date(&mut self, start_date: NaiveDate) -> CoreResult<()> {
        self.set_start_date_as_of(start_date, today())
    }

    pub fn set_start_date_as_of(&mut self, start_date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
        ensure_not_future(start_date, today)?;
        self.core.apply_start_date(start_date, today);
        Ok(())
    }

    /// True iff every document the call requires has been delivered.
    pub fn is_fully_compliant(&self, call: &Call) -> bool {
        call.required_documents()
            .iter()
            .all(|name| self.documents().contains(name))
    }

    /// Delivered names that the call requires.
    pub fn required_delivered(&self, call: &Call) -> BTreeSet<String> {
        self.partition_delivered(call, true)
    }

    /// Delivered names beyond what the call requires.
    pub fn additional_delivered(&self, call: &Call) -> BTreeSet<String> {
        self.partition_delivered(call, false)
    }

    fn partition_delivered(&self, call: &Call, required: bool) -> BTreeSet<String> {
        self.documents()
            .iter()
            .filter(|name| call.required_documents().contains(name) == required)
            .map(str::to_string)
            .collect()
    }

    /// Severs call/author/municipality references. Registry deletion only.
    pub(crate) fn detach_relations(&mut self) {
        self.call = None;
        self.author = None;
        self.municipality = None;
    }
}

fn ensure_not_future(start_date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
    if start_date > today {
        return Err(CoreError::Date(format!(
            "submission start date {start_date} is in the future"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::Submission;
    use crate::error::CoreError;
    use crate::model::call::Call;
    use crate::model::ident::{CallId, MunicipalityId, UserId};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn refs() -> (Option<CallId>, Option<UserId>, Option<MunicipalityId>) {
        (
            Some(CallId::parse("c1").expect("call id")),
            Some(UserId::parse("fede1").expect("user id")),
            Some(MunicipalityId::parse("m1").expect("municipality id")),
        )
    }

    fn call() -> Call {
        Call::new_as_of(
            "c1",
            date(2024, 1, 1),
            date(2024, 12, 31),
            "Rendicion",
            &["LibroDiario", "LibroMayor"],
            date(2024, 6, 1),
        )
        .expect("valid call")
    }

    #[test]
    fn missing_municipality_is_a_null_reference() {
        let (call, author, _) = refs();
        let err = Submission::new_as_of("p1", date(2024, 6, 1), call, author, None, date(2024, 6, 1))
            .expect_err("municipality required");
        assert!(matches!(err, CoreError::NullReference("municipality")));
    }

    #[test]
    fn future_start_date_fails() {
        let (call, author, municipality) = refs();
        let err = Submission::new_as_of(
            "p1",
            date(2024, 6, 2),
            call,
            author,
            municipality,
            date(2024, 6, 1),
        )
        .expect_err("future start");
        assert!(matches!(err, CoreError::Date(_)));
    }

    #[test]
    fn compliance_and_partition_track_required_documents() {
        let (c, author, municipality) = refs();
        let mut submission =
            Submission::new_as_of("p1", date(2024, 6, 1), c, author, municipality, date(2024, 6, 1))
                .expect("valid submission");
        let call = call();
        assert!(submission.is_open());
        assert!(!submission.is_fully_compliant(&call));

        submission.documents_mut().add("LibroDiario").expect("add");
        submission.documents_mut().add("Anexo").expect("add");
        assert!(!submission.is_fully_compliant(&call));
        assert_eq!(
            submission.required_delivered(&call).into_iter().collect::<Vec<_>>(),
            vec!["LibroDiario".to_string()]
        );
        assert_eq!(
            submission.additional_delivered(&call).into_iter().collect::<Vec<_>>(),
            vec!["Anexo".to_string()]
        );

        submission.documents_mut().add("LibroMayor").expect("add");
        assert!(submission.is_fully_compliant(&call));
    }

    #[test]
    fn detach_relations_nulls_references() {
        let (c, author, municipality) = refs();
        let mut submission =
            Submission::new_as_of("p1", date(2024, 6, 1), c, author, municipality, date(2024, 6, 1))
                .expect("valid submission");
        submission.detach_relations();
        assert!(submission.call_id().is_none());
        assert!(submission.author_id().is_none());
        assert!(submission.municipality_id().is_none());
    }
}
