//! Enhancement classifiers.
//!
//! A failing classifier is never fatal: the engine logs the error and
//! proceeds as if it had answered "no action needed".

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{Answer, ExplorationNeed, ModuleSuggestion, OutOfScopeAnalysis};

/// Decides whether a career-exploration side quest is worth offering.
#[async_trait]
pub trait ExplorationClassifier: Send + Sync {
    async fn detect_career_exploration_need(&self, answers: &[Answer]) -> Result<ExplorationNeed>;
}

/// Input of a scope check.
#[derive(Debug, Clone, Copy)]
pub struct ScopeQuery<'a> {
    pub answer_text: &'a str,
    pub prior_answers: &'a [Answer],
    pub question_text: &'a str,
    pub user_name: &'a str,
}

/// Flags answers outside the purpose of a bilan.
#[async_trait]
pub trait ScopeClassifier: Send + Sync {
    async fn analyze_response_scope(&self, query: ScopeQuery<'_>) -> Result<OutOfScopeAnalysis>;
}

/// Suggests an optional deep-dive module at a phase boundary.
#[async_trait]
pub trait ModuleAdvisor: Send + Sync {
    async fn suggest_optional_module(&self, answers: &[Answer]) -> Result<ModuleSuggestion>;
}
