//! Document name sets attached to calls and submissions.
//!
//! # Invariants
//! - When an allow-list is configured, every held name is a member of it.
//! - Held names are unique and never blank.

use crate::error::{CoreError, CoreResult};
use serde::Serialize;
use std::collections::BTreeSet;

/// Mutable set of document names, optionally constrained to an allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed: Option<BTreeSet<String>>,
    items: BTreeSet<String>,
}

impl DocumentSet {
    /// Builds a set whose members must come from `allowed`.
    pub fn constrained<A, I, S>(allowed: A, initial: I) -> CoreResult<Self>
    where
        A: IntoIterator<Item = S>,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .collect();
        let mut set = Self {
            allowed: Some(allowed),
            items: BTreeSet::new(),
        };
        for name in initial {
            set.add(name.as_ref())?;
        }
        Ok(set)
    }

    /// Builds a set that accepts any non-blank name.
    pub fn unconstrained<I, S>(initial: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in initial {
            set.add(name.as_ref())?;
        }
        Ok(set)
    }

    pub fn add(&mut self, name: &str) -> CoreResult<()> {
        let name = normalize_document_name(name)?;
        if let Some(allowed) = &self.allowed {
            if !allowed.contains(name) {
                return Err(CoreError::InvalidDocument(format!(
                    "`{name}` is not an allowed document"
                )));
            }
        }
        if self.items.contains(name) {
            return Err(CoreError::InvalidDocument(format!(
                "`{name}` is already present"
            )));
        }
        self.items.insert(name.to_string());
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> CoreResult<()> {
        let name = name.trim();
        if !self.items.remove(name) {
            return Err(CoreError::InvalidDocument(format!("`{name}` is not present")));
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains(name.trim())
    }

    /// Snapshot of held names.
    pub fn items(&self) -> BTreeSet<String> {
        self.items.clone()
    }

    /// Borrowing iterator over held names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn allowed(&self) -> Option<&BTreeSet<String>> {
        self.allowed.as_ref()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

fn normalize_document_name(name: &str) -> CoreResult<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::InvalidDocument(
            "document name must not be blank".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::DocumentSet;
    use crate::error::CoreError;

    #[test]
    fn constrained_set_rejects_names_outside_allow_list() {
        let mut set = DocumentSet::constrained(["LibroDiario", "LibroMayor"], [])
            .expect("empty initial set is valid");
        set.add("LibroDiario").expect("allowed name");

        let err = set.add("Factura").expect_err("name outside allow-list");
        assert!(matches!(err, CoreError::InvalidDocument(_)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn constrained_construction_validates_initial_names() {
        let err = DocumentSet::constrained(["LibroDiario"], ["ActaCierre"])
            .expect_err("initial name outside allow-list");
        assert!(matches!(err, CoreError::InvalidDocument(_)));
    }

    #[test]
    fn unconstrained_set_accepts_any_name() {
        let mut set = DocumentSet::unconstrained(["Factura"]).expect("unconstrained set");
        set.add("cualquier cosa").expect("any name");
        assert!(set.allowed().is_none());
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn duplicates_and_missing_names_fail() {
        let mut set = DocumentSet::unconstrained(["A"]).expect("unconstrained set");
        set.add(" A ").expect_err("duplicate after trim");
        set.remove("B").expect_err("absent name");
        set.remove("A").expect("present name");
        assert!(set.is_empty());
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut set = DocumentSet::default();
        let err = set.add("   ").expect_err("blank name");
        assert!(matches!(err, CoreError::InvalidDocument(_)));
    }

    #[test]
    fn items_is_a_detached_snapshot() {
        let mut set = DocumentSet::unconstrained(["A"]).expect("unconstrained set");
        let snapshot = set.items();
        set.add("B").expect("new name");
        assert_eq!(snapshot.len(), 1);
        assert!(set.contains("B"));
    }
}
