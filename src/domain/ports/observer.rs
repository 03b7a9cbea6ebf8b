//! Host callbacks.
//!
//! Every callback has a no-op default so hosts implement only what they
//! render. The engine also returns the same events in each `StepOutcome`.

use crate::domain::models::{
    Answer, CurrentPhaseInfo, ExplorationNeed, InterimSynthesis, OutOfScopeAnalysis, PhaseId,
    Summary,
};

#[allow(unused_variables)]
pub trait SessionObserver: Send + Sync {
    fn on_phase_badge(&self, phase: PhaseId, phase_name: &str) {}

    fn on_satisfaction_prompt(&self, phase_info: &CurrentPhaseInfo) {}

    fn on_module_offer(&self, module_id: &str, reason: &str) {}

    fn on_career_exploration_offer(&self, need: &ExplorationNeed) {}

    fn on_end_warning(&self) {}

    fn on_end_confirmation(&self, progress_percent: u8) {}

    fn on_complete(&self, answers: &[Answer], summary: &Summary) {}

    /// Fired after every append, for external persistence.
    fn on_answers_update(&self, answers: &[Answer]) {}

    fn on_mini_synthesis(&self, synthesis: &InterimSynthesis) {}

    fn on_scope_redirect(&self, analysis: &OutOfScopeAnalysis, blocking: bool) {}

    fn on_generation_failed(&self, attempts: u32, error: &str) {}
}

/// Observer that ignores every callback.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SessionObserver for NullObserver {}
