//! Completion gate decisions.
//!
//! Pure predicates evaluated once per core answer, in this order:
//! end warning, completion, phase boundary (module offer, then
//! satisfaction), career exploration, mini-synthesis cadence. The
//! session engine owns the mutations and collaborator calls.

use crate::domain::models::{
    EngineConfig, ExplorationNeed, Milestone, ModuleSuggestion, Package, PhaseId,
    SessionMilestones,
};

use super::progression::Progression;

/// Outcome of the completion check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionCheck {
    /// Keep asking questions
    NotComplete,
    /// Complete, but the user asked to deepen: ask one more question
    DeepenOverride,
    /// Complete: ask the user to confirm synthesis or deepen
    AwaitConfirmation,
}

pub const fn check_completion(
    progression: &Progression,
    deepen_requested: bool,
    config: &EngineConfig,
) -> CompletionCheck {
    if !progression.is_complete(config.completion_percent) {
        CompletionCheck::NotComplete
    } else if deepen_requested {
        CompletionCheck::DeepenOverride
    } else {
        CompletionCheck::AwaitConfirmation
    }
}

/// Whether the one-shot end warning should fire now.
pub fn end_warning_due(
    progression: &Progression,
    milestones: &SessionMilestones,
    config: &EngineConfig,
) -> bool {
    progression.global_progress >= config.end_warning_percent
        && !milestones.has(&Milestone::EndWarning)
}

/// Phase left by the latest core answer, if it crossed a boundary.
pub fn phase_boundary(package: &Package, core_answers: u32) -> Option<PhaseId> {
    if core_answers == 0 {
        return None;
    }
    let before = package.phase_for(core_answers - 1);
    let after = package.phase_for(core_answers);
    (before != after).then_some(before)
}

/// Module to offer, unless it was declined or already offered.
pub fn module_offer(
    suggestion: &ModuleSuggestion,
    milestones: &SessionMilestones,
) -> Option<(String, String)> {
    if !suggestion.is_needed {
        return None;
    }
    let module_id = suggestion.module_id.as_deref()?;
    if milestones.is_module_declined(module_id)
        || milestones.has(&Milestone::ModuleOffered(module_id.to_string()))
    {
        return None;
    }
    Some((
        module_id.to_string(),
        suggestion.reason.clone().unwrap_or_default(),
    ))
}

/// Whether the satisfaction survey of `phase` is still owed.
pub fn satisfaction_due(package: &Package, phase: PhaseId, milestones: &SessionMilestones) -> bool {
    package
        .phase(phase)
        .map(|p| p.satisfaction_survey)
        .unwrap_or(false)
        && !milestones.has(&Milestone::SatisfactionSubmitted(phase))
}

/// Whether the exploration classifier should be consulted now.
pub fn exploration_check_due(
    core_answers: u32,
    milestones: &SessionMilestones,
    config: &EngineConfig,
) -> bool {
    core_answers >= config.exploration_min_answers && !milestones.career_exploration_offered()
}

/// Whether a classifier result warrants an offer.
pub fn exploration_warranted(need: &ExplorationNeed, config: &EngineConfig) -> bool {
    need.needs_exploration && need.confidence >= config.exploration_min_confidence
}

/// Whether a non-counting recap is due after `core_answers` answers.
pub const fn mini_synthesis_due(core_answers: u32, config: &EngineConfig) -> bool {
    config.mini_synthesis_every > 0
        && core_answers > 0
        && core_answers % config.mini_synthesis_every == 0
}
