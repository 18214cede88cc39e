//! Shared dated/documented state for calls and submissions.
//!
//! # Responsibility
//! - Hold identifier, start date, open flag and document set.
//! - Apply the auto-close rule when the start date moves into the future.
//!
//! # Invariants
//! - Setting a start date later than `today` forces `open = false`.
//! - Date-sensitive operations take `today` explicitly in their `_as_of`
//!   forms; the plain forms use the local calendar date.

use crate::model::call::Call;
use crate::model::documents::DocumentSet;
use crate::model::ident::{Id, IdKind};
use crate::model::submission::Submission;
use chrono::{Local, NaiveDate};
use serde::Serialize;

/// Local calendar date used by the plain (non `_as_of`) operations.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Identified + dated + documented state composed into both event variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(bound(serialize = ""))]
pub struct EventCore<K: IdKind> {
    id: Id<K>,
    start_date: NaiveDate,
    open: bool,
    documents: DocumentSet,
}

impl<K: IdKind> EventCore<K> {
    pub(crate) fn new(id: Id<K>, start_date: NaiveDate, open: bool, documents: DocumentSet) -> Self {
        Self {
            id,
            start_date,
            open,
            documents,
        }
    }

    pub fn id(&self) -> &Id<K> {
        &self.id
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub(crate) fn documents_mut(&mut self) -> &mut DocumentSet {
        &mut self.documents
    }

    pub(crate) fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    /// Stores a start date, closing the event when it lies after `today`.
    pub(crate) fn apply_start_date(&mut self, start_date: NaiveDate, today: NaiveDate) {
        self.start_date = start_date;
        if start_date > today {
            self.open = false;
        }
    }
}

/// Borrowed view over either event variant.
#[derive(Debug, Clone, Copy)]
pub enum TimedEvent<'a> {
    Call(&'a Call),
    Submission(&'a Submission),
}

impl TimedEvent<'_> {
    pub fn id(&self) -> &str {
        match self {
            Self::Call(call) => call.id().as_str(),
            Self::Submission(submission) => submission.id().as_str(),
        }
    }

    pub fn start_date(&self) -> NaiveDate {
        match self {
            Self::Call(call) => call.start_date(),
            Self::Submission(submission) => submission.start_date(),
        }
    }

    pub fn is_open(&self) -> bool {
        match self {
            Self::Call(call) => call.is_open(),
            Self::Submission(submission) => submission.is_open(),
        }
    }

    pub fn documents(&self) -> &DocumentSet {
        match self {
            Self::Call(call) => call.required_documents(),
            Self::Submission(submission) => submission.documents(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::EventCore;
    use crate::model::documents::DocumentSet;
    use crate::model::ident::{CallId, CallKind};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn future_start_date_forces_closed() {
        let id = CallId::parse("c1").expect("valid id");
        let mut core: EventCore<CallKind> =
            EventCore::new(id, date(2024, 1, 1), true, DocumentSet::default());

        core.apply_start_date(date(2024, 3, 1), date(2024, 2, 1));
        assert!(!core.is_open());
        assert_eq!(core.start_date(), date(2024, 3, 1));
    }

    #[test]
    fn past_start_date_keeps_open_flag() {
        let id = CallId::parse("c1").expect("valid id");
        let mut core: EventCore<CallKind> =
            EventCore::new(id, date(2024, 1, 1), true, DocumentSet::default());

        core.apply_start_date(date(2024, 1, 15), date(2024, 2, 1));
        assert!(core.is_open());
    }
}
