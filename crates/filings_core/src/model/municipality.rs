//! Municipality model.
//!
//! Supervisor and representative are relations held as user identifiers and
//! resolved through the user collection. Only the registry rewires them, so
//! cross-municipality exclusivity and deletion cascades stay in one place.

use crate::error::CoreResult;
use crate::model::ident::{bounded_text, MunicipalityId, UserId};
use serde::Serialize;

const NAME_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Municipality {
    id: MunicipalityId,
    name: String,
    category: i64,
    supervisor: Option<UserId>,
    representative: Option<UserId>,
}

impl Municipality {
    pub fn new(id: &str, name: &str, category: i64) -> CoreResult<Self> {
        Self::restore(id, name, category, None, None)
    }

    /// Rebuilds a persisted municipality with its stored relations.
    pub fn restore(
        id: &str,
        name: &str,
        category: i64,
        supervisor: Option<UserId>,
        representative: Option<UserId>,
    ) -> CoreResult<Self> {
        Ok(Self {
            id: MunicipalityId::parse(id)?,
            name: normalize_name(name)?,
            category,
            supervisor,
            representative,
        })
    }

    pub fn id(&self) -> &MunicipalityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> i64 {
        self.category
    }

    pub fn supervisor(&self) -> Option<&UserId> {
        self.supervisor.as_ref()
    }

    pub fn representative(&self) -> Option<&UserId> {
        self.representative.as_ref()
    }

    pub fn set_name(&mut self, name: &str) -> CoreResult<()> {
        self.name = normalize_name(name)?;
        Ok(())
    }

    pub fn set_category(&mut self, category: i64) {
        self.category = category;
    }

    pub(crate) fn set_supervisor(&mut self, supervisor: Option<UserId>) {
        self.supervisor = supervisor;
    }

    pub(crate) fn set_representative(&mut self, representative: Option<UserId>) {
        self.representative = representative;
    }
}

fn normalize_name(name: &str) -> CoreResult<String> {
    bounded_text("municipality name", name, 1, NAME_MAX_CHARS)
}
