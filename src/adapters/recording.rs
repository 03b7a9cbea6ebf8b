//! Observer that records every host callback.

use std::sync::{Mutex, PoisonError};

use crate::domain::models::{
    Answer, CurrentPhaseInfo, ExplorationNeed, InterimSynthesis, OutOfScopeAnalysis, PhaseId,
    Summary,
};
use crate::domain::ports::SessionObserver;

/// One observed callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedCall {
    PhaseBadge(PhaseId),
    SatisfactionPrompt(PhaseId),
    ModuleOffer(String),
    CareerExplorationOffer { confidence: u8 },
    EndWarning,
    EndConfirmation(u8),
    Complete { answers: usize },
    AnswersUpdate(usize),
    MiniSynthesis,
    ScopeRedirect { blocking: bool },
    GenerationFailed { attempts: u32 },
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    calls: Mutex<Vec<ObservedCall>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: ObservedCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }

    pub fn calls(&self) -> Vec<ObservedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&ObservedCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|c| predicate(c))
            .count()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_phase_badge(&self, phase: PhaseId, _phase_name: &str) {
        self.record(ObservedCall::PhaseBadge(phase));
    }

    fn on_satisfaction_prompt(&self, phase_info: &CurrentPhaseInfo) {
        self.record(ObservedCall::SatisfactionPrompt(phase_info.phase));
    }

    fn on_module_offer(&self, module_id: &str, _reason: &str) {
        self.record(ObservedCall::ModuleOffer(module_id.to_string()));
    }

    fn on_career_exploration_offer(&self, need: &ExplorationNeed) {
        self.record(ObservedCall::CareerExplorationOffer {
            confidence: need.confidence,
        });
    }

    fn on_end_warning(&self) {
        self.record(ObservedCall::EndWarning);
    }

    fn on_end_confirmation(&self, progress_percent: u8) {
        self.record(ObservedCall::EndConfirmation(progress_percent));
    }

    fn on_complete(&self, answers: &[Answer], _summary: &Summary) {
        self.record(ObservedCall::Complete {
            answers: answers.len(),
        });
    }

    fn on_answers_update(&self, answers: &[Answer]) {
        self.record(ObservedCall::AnswersUpdate(answers.len()));
    }

    fn on_mini_synthesis(&self, _synthesis: &InterimSynthesis) {
        self.record(ObservedCall::MiniSynthesis);
    }

    fn on_scope_redirect(&self, _analysis: &OutOfScopeAnalysis, blocking: bool) {
        self.record(ObservedCall::ScopeRedirect { blocking });
    }

    fn on_generation_failed(&self, attempts: u32, _error: &str) {
        self.record(ObservedCall::GenerationFailed { attempts });
    }
}
