//! Rule-based classifiers.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::models::{
    core_answers, Answer, CareerPath, ExplorationNeed, ModuleSuggestion, OutOfScopeAnalysis,
    Severity, SuggestedAction,
};
use crate::domain::ports::{ExplorationClassifier, ModuleAdvisor, ScopeClassifier, ScopeQuery};

#[derive(Debug, Clone)]
struct ScopeRule {
    keyword: String,
    severity: Severity,
    message: String,
}

/// Flags answers containing configured keywords (case-insensitive).
pub struct KeywordScopeClassifier {
    rules: Vec<ScopeRule>,
    calls: AtomicU32,
}

impl KeywordScopeClassifier {
    /// No rules: every answer is in scope.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            calls: AtomicU32::new(0),
        }
    }

    /// A small default rule set.
    pub fn new() -> Self {
        Self::empty()
            .with_rule(
                "j'ai 15 ans",
                Severity::Critical,
                "Ce bilan est réservé aux adultes. Rapprochez-vous d'un conseiller d'orientation.",
            )
            .with_rule(
                "recette",
                Severity::Medium,
                "Revenons à votre parcours professionnel.",
            )
            .with_rule(
                "météo",
                Severity::Low,
                "Restons concentrés sur votre projet.",
            )
    }

    #[must_use]
    pub fn with_rule(
        mut self,
        keyword: impl Into<String>,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        self.rules.push(ScopeRule {
            keyword: keyword.into().to_lowercase(),
            severity,
            message: message.into(),
        });
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for KeywordScopeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScopeClassifier for KeywordScopeClassifier {
    async fn analyze_response_scope(&self, query: ScopeQuery<'_>) -> Result<OutOfScopeAnalysis> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let text = query.answer_text.to_lowercase();

        let worst = self
            .rules
            .iter()
            .filter(|rule| text.contains(&rule.keyword))
            .max_by_key(|rule| rule.severity);

        Ok(match worst {
            None => OutOfScopeAnalysis::in_scope(),
            Some(rule) => {
                let action = match rule.severity {
                    Severity::Low => SuggestedAction::Continue,
                    Severity::Medium | Severity::High => SuggestedAction::DiscardAndReprompt,
                    Severity::Critical => SuggestedAction::Stop,
                };
                OutOfScopeAnalysis::out_of_scope(
                    rule.severity,
                    action,
                    format!("{}, {}", query.user_name, rule.message),
                )
            }
        })
    }
}

const EXPLORATION_SIGNALS: [&str; 5] = [
    "reconversion",
    "changer de métier",
    "autre voie",
    "je ne sais pas",
    "nouveau secteur",
];

/// Detects exploration needs from signal phrases in core answers.
///
/// Each answer carrying a signal adds 25 points of confidence.
pub struct ThresholdExplorationClassifier {
    fixed: Option<ExplorationNeed>,
    calls: AtomicU32,
}

impl ThresholdExplorationClassifier {
    pub fn new() -> Self {
        Self {
            fixed: None,
            calls: AtomicU32::new(0),
        }
    }

    /// Always answer `need`.
    pub fn fixed(need: ExplorationNeed) -> Self {
        Self {
            fixed: Some(need),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for ThresholdExplorationClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ExplorationClassifier for ThresholdExplorationClassifier {
    async fn detect_career_exploration_need(&self, answers: &[Answer]) -> Result<ExplorationNeed> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(need) = &self.fixed {
            return Ok(need.clone());
        }

        let hits = core_answers(answers)
            .filter(|a| {
                let text = a.value.to_lowercase();
                EXPLORATION_SIGNALS.iter().any(|signal| text.contains(signal))
            })
            .count();

        if hits == 0 {
            return Ok(ExplorationNeed::none());
        }

        let confidence = u8::try_from(hits.saturating_mul(25).min(100)).unwrap_or(100);
        Ok(ExplorationNeed {
            needs_exploration: true,
            confidence,
            reason: format!("{hits} réponse(s) évoquent un changement d'orientation"),
            suggested_paths: vec![
                CareerPath {
                    title: "Formateur pour adultes".to_string(),
                    description: "Transmettre son expertise métier".to_string(),
                },
                CareerPath {
                    title: "Chef de projet".to_string(),
                    description: "Coordonner des équipes pluridisciplinaires".to_string(),
                },
            ],
        })
    }
}

/// Module advisor replaying a fixed list of suggestions.
///
/// Once the list is exhausted it answers with the fallback suggestion.
pub struct ScriptedModuleAdvisor {
    script: Mutex<VecDeque<ModuleSuggestion>>,
    fallback: ModuleSuggestion,
    calls: AtomicU32,
}

impl ScriptedModuleAdvisor {
    /// Never suggests a module.
    pub fn never() -> Self {
        Self::sequence(Vec::new())
    }

    /// Suggests the same module at every boundary.
    pub fn always(module_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: ModuleSuggestion::needed(module_id, reason),
            calls: AtomicU32::new(0),
        }
    }

    pub fn sequence(suggestions: Vec<ModuleSuggestion>) -> Self {
        Self {
            script: Mutex::new(suggestions.into()),
            fallback: ModuleSuggestion::not_needed(),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModuleAdvisor for ScriptedModuleAdvisor {
    async fn suggest_optional_module(&self, _answers: &[Answer]) -> Result<ModuleSuggestion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().await.pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }
}
