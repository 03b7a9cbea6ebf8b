//! Deterministic question and synthesis sources.
//!
//! Used by the `simulate` command and by tests. Both sources can be told
//! to fail a number of times before succeeding.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::models::{
    core_answers, Answer, CoachingStyle, InterimSynthesis, Package, Question, QuestionRequest,
    Summary, UserProfile,
};
use crate::domain::ports::{QuestionSource, SynthesisSource};

fn prompt_for(category_id: &str) -> &'static str {
    match category_id {
        "parcours" => "Pouvez-vous retracer les grandes étapes de votre parcours ?",
        "motivations" => "Qu'est-ce qui vous a amené à entreprendre ce bilan ?",
        "attentes" => "Qu'attendez-vous concrètement de cet accompagnement ?",
        "competences" => "Quelles compétences mobilisez-vous avec le plus d'aisance ?",
        "interets" => "Quelles activités vous donnent le plus d'énergie ?",
        "valeurs" => "Quelles valeurs doivent absolument se retrouver dans votre travail ?",
        "personnalite" => "Comment vos collègues décriraient-ils votre façon de travailler ?",
        "environnement" => "Dans quel environnement de travail vous sentez-vous le mieux ?",
        "projet" => "Quel projet professionnel se dessine pour vous aujourd'hui ?",
        "plan_action" => "Quelles seraient les trois premières étapes de votre plan d'action ?",
        "ressources" => "Sur quelles ressources pouvez-vous vous appuyer ?",
        _ => "Pouvez-vous développer ce point ?",
    }
}

/// Question source that builds questions from a fixed prompt table.
pub struct ScriptedQuestionSource {
    calls: AtomicU32,
    failures_remaining: AtomicU32,
    requests: Arc<RwLock<Vec<QuestionRequest>>>,
}

impl ScriptedQuestionSource {
    pub fn new() -> Self {
        Self::failing_first(0)
    }

    /// Fail the first `failures` calls, then succeed.
    pub fn failing_first(failures: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures_remaining: AtomicU32::new(failures),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Total calls, failed ones included.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next `failures` calls fail.
    pub fn fail_next(&self, failures: u32) {
        self.failures_remaining.store(failures, Ordering::SeqCst);
    }

    /// Requests that produced a question, in order.
    pub async fn requests(&self) -> Vec<QuestionRequest> {
        self.requests.read().await.clone()
    }
}

impl Default for ScriptedQuestionSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuestionSource for ScriptedQuestionSource {
    async fn generate_question(
        &self,
        request: &QuestionRequest,
        answers: &[Answer],
        profile: &UserProfile,
    ) -> Result<Question> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(anyhow!("question source unavailable (call {call})"));
        }

        let number = answers.len() + 1;
        let title = match &request.module_id {
            Some(module_id) => format!(
                "{}, approfondissons le module {module_id} : que retenez-vous de cette piste ?",
                profile.name
            ),
            None => format!("{}, {}", profile.name, prompt_for(&request.category_id)),
        };

        let mut question = Question::text(
            format!("q{number}-{}", request.request_id.simple()),
            title,
            request.category_id.clone(),
        );
        question.description = Some(format!(
            "{} · {} · {}",
            request.phase.name(),
            request.category_id,
            request.complexity
        ));

        self.requests.write().await.push(request.clone());
        Ok(question)
    }
}

/// Synthesis source that assembles recaps from the answers themselves.
pub struct TemplateSynthesisSource {
    summary_calls: AtomicU32,
    summary_failures_remaining: AtomicU32,
}

impl TemplateSynthesisSource {
    pub fn new() -> Self {
        Self::failing_summaries(0)
    }

    /// Fail the first `failures` summary requests.
    pub fn failing_summaries(failures: u32) -> Self {
        Self {
            summary_calls: AtomicU32::new(0),
            summary_failures_remaining: AtomicU32::new(failures),
        }
    }

    pub fn summary_calls(&self) -> u32 {
        self.summary_calls.load(Ordering::SeqCst)
    }
}

impl Default for TemplateSynthesisSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SynthesisSource for TemplateSynthesisSource {
    async fn generate_synthesis(
        &self,
        recent_answers: &[Answer],
        profile: &UserProfile,
    ) -> Result<InterimSynthesis> {
        let mut themes: Vec<&str> = recent_answers.iter().map(|a| a.category_id.as_str()).collect();
        themes.dedup();

        Ok(InterimSynthesis {
            synthesis: format!(
                "{}, sur vos {} dernières réponses nous avons abordé : {}.",
                profile.name,
                recent_answers.len(),
                themes.join(", ")
            ),
            confirmation_request: "Cette synthèse vous semble-t-elle fidèle ?".to_string(),
        })
    }

    async fn generate_summary(
        &self,
        answers: &[Answer],
        package: &Package,
        profile: &UserProfile,
    ) -> Result<Summary> {
        let call = self.summary_calls.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = self
            .summary_failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(anyhow!("synthesis source unavailable (call {call})"));
        }

        let profile_type = match profile.coaching_style {
            CoachingStyle::Collaborative => "Bâtisseur collaboratif",
            CoachingStyle::Analytic => "Analyste méthodique",
            CoachingStyle::Creative => "Explorateur créatif",
        };

        let mut by_depth: Vec<&Answer> = core_answers(answers).collect();
        by_depth.sort_by(|a, b| b.complexity.cmp(&a.complexity));
        let strengths = by_depth
            .iter()
            .take(3)
            .map(|a| format!("{} ({})", a.category_id, a.complexity))
            .collect();

        Ok(Summary {
            profile_type: profile_type.to_string(),
            synthesis: format!(
                "Bilan {} de {} : {} réponses recueillies sur {} attendues.",
                package.name,
                profile.name,
                answers.len(),
                package.total_target()
            ),
            strengths,
            development_areas: vec!["Préciser le projet cible".to_string()],
            recommendations: vec!["Rencontrer des professionnels du métier visé".to_string()],
            action_plan: vec![
                "Valider le projet par une enquête métier".to_string(),
                "Identifier les formations accessibles".to_string(),
            ],
        })
    }
}
