//! Call-for-submission model.
//!
//! # Responsibility
//! - Validate call dates, description and required-document catalog.
//! - Own the open/closed flag and its automatic closing rules.
//!
//! # Invariants
//! - `close_date >= start_date` at all times.
//! - Required documents are members of [`required_document_catalog`].
//! - A close date set before `today` forces the call closed.

use crate::error::{CoreError, CoreResult};
use crate::model::documents::DocumentSet;
use crate::model::event::{today, EventCore};
use crate::model::ident::{bounded_text, CallId, CallKind};
use chrono::{Days, NaiveDate};
use serde::Serialize;

pub const DOC_LIBRO_DIARIO: &str = "LibroDiario";
pub const DOC_LIBRO_MAYOR: &str = "LibroMayor";
pub const DOC_BALANCE_GENERAL: &str = "BalanceGeneral";
pub const DOC_ESTADO_RESULTADOS: &str = "EstadoResultados";
pub const DOC_EJECUCION_PRESUPUESTARIA: &str = "EjecucionPresupuestaria";
pub const DOC_INVENTARIO_BIENES: &str = "InventarioBienes";
pub const DOC_CONCILIACION_BANCARIA: &str = "ConciliacionBancaria";
pub const DOC_ACTA_CIERRE: &str = "ActaCierre";

const REQUIRED_DOCUMENT_CATALOG: &[&str] = &[
    DOC_LIBRO_DIARIO,
    DOC_LIBRO_MAYOR,
    DOC_BALANCE_GENERAL,
    DOC_ESTADO_RESULTADOS,
    DOC_EJECUCION_PRESUPUESTARIA,
    DOC_INVENTARIO_BIENES,
    DOC_CONCILIACION_BANCARIA,
    DOC_ACTA_CIERRE,
];

const DESCRIPTION_MAX_CHARS: usize = 500;

/// Document names a call may require.
pub fn required_document_catalog() -> &'static [&'static str] {
    REQUIRED_DOCUMENT_CATALOG
}

/// Time-bounded request for filings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Call {
    #[serde(flatten)]
    core: EventCore<CallKind>,
    close_date: NaiveDate,
    description: String,
}

impl Call {
    /// Creates a call, computing `open` from the local calendar date.
    pub fn new(
        id: &str,
        start_date: NaiveDate,
        close_date: NaiveDate,
        description: &str,
        required: &[&str],
    ) -> CoreResult<Self> {
        Self::new_as_of(id, start_date, close_date, description, required, today())
    }

    /// Creates a call with `open = start <= today + 1 && close > today`.
    pub fn new_as_of(
        id: &str,
        start_date: NaiveDate,
        close_date: NaiveDate,
        description: &str,
        required: &[&str],
        today: NaiveDate,
    ) -> CoreResult<Self> {
        let tomorrow = today.checked_add_days(Days::new(1)).unwrap_or(today);
        let open = start_date <= tomorrow && close_date > today;
        Self::build(
            id,
            start_date,
            close_date,
            description,
            open,
            required.iter().copied(),
        )
    }

    /// Rebuilds a persisted call, keeping its stored open flag.
    pub fn restore<I, S>(
        id: &str,
        start_date: NaiveDate,
        close_date: NaiveDate,
        description: &str,
        open: bool,
        required: I,
    ) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::build(id, start_date, close_date, description, open, required)
    }

    fn build<I, S>(
        id: &str,
        start_date: NaiveDate,
        close_date: NaiveDate,
        description: &str,
        open: bool,
        required: I,
    ) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let id = CallId::parse(id)?;
        ensure_close_not_before_start(start_date, close_date)?;
        let description = normalize_description(description)?;
        let documents = DocumentSet::constrained(
            REQUIRED_DOCUMENT_CATALOG.iter().map(|name| name.to_string()),
            required.into_iter().map(|name| name.as_ref().to_string()),
        )?;
        Ok(Self {
            core: EventCore::new(id, start_date, open, documents),
            close_date,
            description,
        })
    }

    pub fn id(&self) -> &CallId {
        self.core.id()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.core.start_date()
    }

    pub fn close_date(&self) -> NaiveDate {
        self.close_date
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn is_open(&self) -> bool {
        self.core.is_open()
    }

    pub fn required_documents(&self) -> &DocumentSet {
        self.core.documents()
    }

    pub fn required_documents_mut(&mut self) -> &mut DocumentSet {
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

    /// Moves the start date; a start later than `today` closes the call.
    pub fn set_start_date_as_of(&mut self, start_date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
        ensure_close_not_before_start(start_date, self.close_date)?;
        self.core.apply_start_date(start_date, today);
        Ok(())
    }

    pub fn set_close_date(&mut self, close_date: NaiveDate) -> CoreResult<()> {
        self.set_close_date_as_of(close_date, today())
    }

    /// Moves the close date; a close earlier than `today` closes the call.
    pub fn set_close_date_as_of(&mut self, close_date: NaiveDate, today: NaiveDate) -> CoreResult<()> {
        ensure_close_not_before_start(self.core.start_date(), close_date)?;
        self.close_date = close_date;
        if close_date < today {
            self.core.set_open(false);
        }
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) -> CoreResult<()> {
        self.description = normalize_description(description)?;
        Ok(())
    }
}

fn ensure_close_not_before_start(start_date: NaiveDate, close_date: NaiveDate) -> CoreResult<()> {
    if close_date < start_date {
        return Err(CoreError::Date(format!(
            "close date {close_date} precedes start date {start_date}"
        )));
    }
    Ok(())
}

fn normalize_description(description: &str) -> CoreResult<String> {
    bounded_text("call description", description, 1, DESCRIPTION_MAX_CHARS)
}
