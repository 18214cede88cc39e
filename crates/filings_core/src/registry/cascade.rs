//! Centralized cascade table for entity removal.
//!
//! # Responsibility
//! - Derive, per entity kind, the ordered steps that removing one entity
//!   implies across all four collections.
//! - Execute those steps one by one and record what was done.
//!
//! # Invariants
//! - Steps run in plan order with no rollback; a failing step leaves earlier
//!   steps applied.
//! - Every removed submission has its relations detached before it leaves
//!   the collection.
//! - The final step of every plan removes the target itself.

use crate::error::CoreResult;
use crate::model::ident::{CallId, EntityKind, MunicipalityId, SubmissionId, UserId};
use crate::registry::Registry;
use serde::Serialize;

/// Entity whose removal starts a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CascadeTarget {
    User(UserId),
    Municipality(MunicipalityId),
    Call(CallId),
    Submission(SubmissionId),
}

impl CascadeTarget {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::Users,
            Self::Municipality(_) => EntityKind::Municipalities,
            Self::Call(_) => EntityKind::Calls,
            Self::Submission(_) => EntityKind::Submissions,
        }
    }
}

/// One independent mutation performed by a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CascadeStep {
    ClearSupervisor(MunicipalityId),
    ClearRepresentative(MunicipalityId),
    RemoveSubmission(SubmissionId),
    RemoveMunicipality(MunicipalityId),
    RemoveCall(CallId),
    RemoveUser(UserId),
}

/// Steps actually executed for one removal, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeReport {
    target: CascadeTarget,
    steps: Vec<CascadeStep>,
}

impl CascadeReport {
    pub fn target(&self) -> &CascadeTarget {
        &self.target
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }

    pub fn removed_submissions(&self) -> Vec<&SubmissionId> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                CascadeStep::RemoveSubmission(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Number of supervisor/representative references cleared.
    pub fn cleared_references(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| {
                matches!(
                    step,
                    CascadeStep::ClearSupervisor(_) | CascadeStep::ClearRepresentative(_)
                )
            })
            .count()
    }
}

/// Builds the ordered removal plan for `target` against current state.
pub fn cascade_plan(registry: &Registry, target: &CascadeTarget) -> Vec<CascadeStep> {
    let mut steps = Vec::new();
    match target {
        CascadeTarget::Municipality(id) => {
            if let Ok(municipality) = registry.municipalities().get(id) {
                if municipality.supervisor().is_some() {
                    steps.push(CascadeStep::ClearSupervisor(id.clone()));
                }
                if municipality.representative().is_some() {
                    steps.push(CascadeStep::ClearRepresentative(id.clone()));
                }
            }
            steps.extend(
                registry
                    .submissions()
                    .iter()
                    .filter(|s| s.municipality_id() == Some(id))
                    .map(|s| CascadeStep::RemoveSubmission(s.id().clone())),
            );
            steps.push(CascadeStep::RemoveMunicipality(id.clone()));
        }
        CascadeTarget::Call(id) => {
            steps.extend(
                registry
                    .submissions()
                    .iter()
                    .filter(|s| s.call_id() == Some(id))
                    .map(|s| CascadeStep::RemoveSubmission(s.id().clone())),
            );
            steps.push(CascadeStep::RemoveCall(id.clone()));
        }
        CascadeTarget::User(id) => {
            for municipality in registry.municipalities().iter() {
                if municipality.supervisor() == Some(id) {
                    steps.push(CascadeStep::ClearSupervisor(municipality.id().clone()));
                }
                if municipality.representative() == Some(id) {
                    steps.push(CascadeStep::ClearRepresentative(municipality.id().clone()));
                }
            }
            steps.extend(
                registry
                    .submissions()
                    .iter()
                    .filter(|s| s.author_id() == Some(id))
                    .map(|s| CascadeStep::RemoveSubmission(s.id().clone())),
            );
            steps.push(CascadeStep::RemoveUser(id.clone()));
        }
        CascadeTarget::Submission(id) => {
            steps.push(CascadeStep::RemoveSubmission(id.clone()));
        }
    }
    steps
}

/// Applies `steps` in order, stopping at the first failure.
pub(crate) fn execute(
    registry: &mut Registry,
    target: CascadeTarget,
    steps: Vec<CascadeStep>,
) -> CoreResult<CascadeReport> {
    let mut report = CascadeReport {
        target,
        steps: Vec::with_capacity(steps.len()),
    };
    for step in steps {
        apply_step(registry, &step)?;
        report.steps.push(step);
    }
    Ok(report)
}

fn apply_step(registry: &mut Registry, step: &CascadeStep) -> CoreResult<()> {
    match step {
        CascadeStep::ClearSupervisor(id) => {
            registry.municipalities.get_mut(id)?.set_supervisor(None);
        }
        CascadeStep::ClearRepresentative(id) => {
            registry.municipalities.get_mut(id)?.set_representative(None);
        }
        CascadeStep::RemoveSubmission(id) => {
            registry.submissions.get_mut(id)?.detach_relations();
            registry.submissions.take(id)?;
        }
        CascadeStep::RemoveMunicipality(id) => {
            registry.municipalities.take(id)?;
        }
        CascadeStep::RemoveCall(id) => {
            registry.calls.take(id)?;
        }
        CascadeStep::RemoveUser(id) => {
            registry.users.take(id)?;
        }
    }
    Ok(())
}
