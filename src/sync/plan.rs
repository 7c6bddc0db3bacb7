//! Reconciliation of a locale file against the master terms.
//!
//! Planning is pure: it decides which units are kept and which need a
//! translation, without calling any translator.

use crate::xliff::{TermsMap, TransUnit};

/// What happens to one master unit in a locale file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanAction<'a> {
    /// The locale already has a translation; its unit is written unchanged.
    Keep(&'a TransUnit),
    /// The master unit needs a translation.
    Translate(&'a TransUnit),
}

impl<'a> PlanAction<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            PlanAction::Keep(unit) | PlanAction::Translate(unit) => &unit.id,
        }
    }
}

/// Reconciliation result for one locale, in master order.
#[derive(Debug, Clone, Default)]
pub struct LocalePlan<'a> {
    pub actions: Vec<PlanAction<'a>>,
    /// Ids in the locale file that the master no longer has.
    pub removed: Vec<&'a str>,
    /// Kept ids whose source text differs from the master's.
    pub stale: Vec<&'a str>,
}

impl<'a> LocalePlan<'a> {
    pub fn pending(&self) -> impl Iterator<Item = &'a TransUnit> + '_ {
        self.actions.iter().filter_map(|action| match action {
            PlanAction::Translate(unit) => Some(*unit),
            PlanAction::Keep(_) => None,
        })
    }

    pub fn pending_count(&self) -> usize {
        self.pending().count()
    }

    pub fn kept_count(&self) -> usize {
        self.actions.len() - self.pending_count()
    }

    /// True when writing the plan would not call the translator.
    pub fn is_complete(&self) -> bool {
        self.pending_count() == 0
    }
}

/// Reconcile `existing` locale units against the `master` terms.
pub fn plan<'a>(master: &'a TermsMap, existing: &'a TermsMap) -> LocalePlan<'a> {
    let mut plan = LocalePlan::default();

    for unit in master {
        match existing.get(&unit.id) {
            Some(current) if current.is_translated() => {
                if current.source != unit.source {
                    plan.stale.push(&unit.id);
                }
                plan.actions.push(PlanAction::Keep(current));
            }
            _ => plan.actions.push(PlanAction::Translate(unit)),
        }
    }

    plan.removed = existing
        .ids()
        .filter(|id| !master.contains(id))
        .collect();

    plan
}
