//! One-shot session milestones.
//!
//! Every "has X already happened this session" question is a lookup in a
//! single set. Milestones are never removed within a session.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::package::PhaseId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Milestone {
    /// The 80% advisory was shown
    EndWarning,
    /// The exploration classifier was consulted (whatever it answered)
    CareerExplorationOffered,
    /// Badge awarded for leaving this phase
    PhaseCompleted(PhaseId),
    SatisfactionSubmitted(PhaseId),
    ModuleOffered(String),
    ModuleDeclined(String),
    /// Final summary handed to the host
    Completed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMilestones {
    fired: BTreeSet<Milestone>,
}

impl SessionMilestones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a milestone. Returns `true` only the first time.
    pub fn fire(&mut self, milestone: Milestone) -> bool {
        self.fired.insert(milestone)
    }

    pub fn has(&self, milestone: &Milestone) -> bool {
        self.fired.contains(milestone)
    }

    pub fn is_module_declined(&self, module_id: &str) -> bool {
        self.has(&Milestone::ModuleDeclined(module_id.to_string()))
    }

    pub fn declined_modules(&self) -> impl Iterator<Item = &str> {
        self.fired.iter().filter_map(|m| match m {
            Milestone::ModuleDeclined(id) => Some(id.as_str()),
            _ => None,
        })
    }

    pub fn career_exploration_offered(&self) -> bool {
        self.has(&Milestone::CareerExplorationOffered)
    }

    pub fn len(&self) -> usize {
        self.fired.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fired.is_empty()
    }
}
