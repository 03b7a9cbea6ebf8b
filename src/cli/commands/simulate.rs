//! Scripted end-to-end session.
//!
//! Drives a full bilan with the deterministic adapters, answering every
//! prompt automatically, and prints the resulting event log.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{debug, info};

use crate::adapters::{
    KeywordScopeClassifier, ScriptedModuleAdvisor, ScriptedQuestionSource,
    TemplateSynthesisSource, ThresholdExplorationClassifier,
};
use crate::application::{Collaborators, EngineEvent, SessionEngine};
use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::{
    CareerPathReaction, CareerReaction, Config, EndChoice, EngineState, ExplorationDecision,
    ModuleDecision, ModuleSuggestion, Package, SatisfactionResponse, SessionState, Summary,
    UserProfile,
};
use crate::domain::ports::NullObserver;
use crate::infrastructure::retry::RetryPolicy;

const MAX_STEPS: usize = 2_000;
const MAX_GENERATION_RETRIES: u32 = 3;

const SIMULATED_MODULE: (&str, &str) = (
    "mobilite",
    "Plusieurs réponses évoquent une mobilité géographique.",
);

/// Answers cycled through by the simulated user. Three of them carry
/// career-change signals so that exploration is offered.
const CANNED_ANSWERS: [&str; 8] = [
    "J'ai commencé dans la logistique puis j'ai encadré une équipe de six personnes.",
    "Ce qui me motive, c'est de résoudre des problèmes concrets avec les autres.",
    "J'envisage une reconversion, sans savoir encore laquelle.",
    "J'aime organiser, planifier et voir un projet aboutir.",
    "L'autonomie et le respect comptent beaucoup pour moi.",
    "Je me demande si je ne devrais pas changer de métier.",
    "Je travaille mieux dans une petite structure où chacun se connaît.",
    "Un nouveau secteur comme la formation pourrait me convenir.",
];

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Package id (defaults to the configured package)
    #[arg(short, long)]
    pub package: Option<String>,

    /// First name of the simulated user
    #[arg(short, long, default_value = "Camille")]
    pub name: String,

    /// Ask for one extra question at the end confirmation
    #[arg(long)]
    pub deepen: bool,

    /// Accept the module offered at the first phase boundary instead of declining it
    #[arg(long)]
    pub accept_modules: bool,

    /// Rating given to every satisfaction survey (1-5)
    #[arg(long, default_value = "4")]
    pub rating: u8,
}

/// Choices the simulated user makes at each suspension point.
#[derive(Debug, Clone, Copy)]
pub struct SimulationChoices {
    pub deepen: bool,
    pub accept_modules: bool,
    pub rating: u8,
}

impl From<&SimulateArgs> for SimulationChoices {
    fn from(args: &SimulateArgs) -> Self {
        Self {
            deepen: args.deepen,
            accept_modules: args.accept_modules,
            rating: args.rating,
        }
    }
}

/// Final session and every event it produced.
#[derive(Debug)]
pub struct SimulationRun {
    pub state: SessionState,
    pub events: Vec<EngineEvent>,
}

#[derive(Debug, Serialize)]
pub struct SimulationOutput {
    pub session_id: String,
    pub package: String,
    pub final_state: EngineState,
    pub answers: usize,
    pub core_answers: u32,
    pub progress: u8,
    pub satisfaction: Vec<SatisfactionResponse>,
    pub career_reactions: Vec<CareerPathReaction>,
    pub summary: Option<Summary>,
    pub events: Vec<EngineEvent>,
}

impl CommandOutput for SimulationOutput {
    fn to_human(&self) -> String {
        let asked = self
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::QuestionAsked { .. }))
            .count();
        let milestones: Vec<EngineEvent> = self
            .events
            .iter()
            .filter(|e| {
                !matches!(
                    e,
                    EngineEvent::QuestionAsked { .. } | EngineEvent::AnswersUpdated { .. }
                )
            })
            .cloned()
            .collect();

        let mut lines = vec![
            format!("Session {} ({})", self.session_id, self.package),
            format!(
                "State: {}   Answers: {} ({} core)   Progress: {}%   Questions asked: {asked}",
                self.final_state, self.answers, self.core_answers, self.progress
            ),
            TableFormatter::new().format_events(&milestones),
        ];

        if let Some(summary) = &self.summary {
            lines.push(format!("\nProfile: {}", summary.profile_type));
            lines.push(summary.synthesis.clone());
            for strength in &summary.strengths {
                lines.push(format!("  + {strength}"));
            }
            for step in &summary.action_plan {
                lines.push(format!("  → {step}"));
            }
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Engine wired to the deterministic adapters.
pub fn build_engine(package: Package, config: &Config) -> Result<SessionEngine> {
    let (module_id, reason) = SIMULATED_MODULE;
    let collaborators = Collaborators {
        questions: Arc::new(ScriptedQuestionSource::new()),
        synthesis: Arc::new(TemplateSynthesisSource::new()),
        exploration: Arc::new(ThresholdExplorationClassifier::new()),
        scope: Arc::new(KeywordScopeClassifier::new()),
        modules: Arc::new(ScriptedModuleAdvisor::sequence(vec![ModuleSuggestion::needed(
            module_id, reason,
        )])),
    };

    let engine = SessionEngine::new(
        package,
        config.engine.clone(),
        collaborators,
        Arc::new(NullObserver),
    )?
    .with_retry_policy(RetryPolicy::from_config(&config.retry));
    Ok(engine)
}

/// Run a session to a terminal state.
pub async fn run_simulation(
    engine: &SessionEngine,
    profile: UserProfile,
    choices: SimulationChoices,
) -> Result<SimulationRun> {
    let mut state = engine.new_session(profile);
    let mut outcome = engine.start(&mut state).await?;
    let mut events = outcome.events.clone();
    let mut deepened = false;
    let mut retries = 0;

    for step in 0.. {
        if step >= MAX_STEPS {
            bail!("simulation did not finish within {MAX_STEPS} steps");
        }
        debug!(step, state = %outcome.state, "simulation step");

        let next = match outcome.state.clone() {
            EngineState::Complete | EngineState::Abandoned => break,
            EngineState::InPhase { .. } => {
                let pending = outcome
                    .question
                    .as_ref()
                    .context("engine is in a phase without a pending question")?;
                let value = CANNED_ANSWERS[state.answers.len() % CANNED_ANSWERS.len()];
                engine.submit_answer(&mut state, &pending.question.id, value).await?
            }
            EngineState::AwaitingModuleDecision { .. } => {
                let decision = if choices.accept_modules {
                    ModuleDecision::Accept
                } else {
                    ModuleDecision::Decline
                };
                engine.resolve_module_offer(&mut state, decision).await?
            }
            EngineState::AwaitingSatisfaction { .. } => {
                engine.submit_satisfaction(&mut state, choices.rating, None).await?
            }
            EngineState::AwaitingCareerExplorationDecision { need } => {
                for (i, path) in need.suggested_paths.iter().enumerate() {
                    let reaction = if i == 0 {
                        CareerReaction::Interested
                    } else {
                        CareerReaction::NeedMoreInfo
                    };
                    engine.record_career_reaction(&mut state, path.title.clone(), reaction)?;
                }
                engine
                    .resolve_career_exploration(&mut state, ExplorationDecision::Explore)
                    .await?
            }
            EngineState::AwaitingEndConfirmation { .. } => {
                let choice = if choices.deepen && !deepened {
                    deepened = true;
                    EndChoice::Deepen
                } else {
                    EndChoice::GenerateSynthesis
                };
                engine.choose_end(&mut state, choice).await?
            }
            EngineState::GenerationFailed { .. } | EngineState::SynthesisFailed { .. }
                if retries < MAX_GENERATION_RETRIES =>
            {
                retries += 1;
                engine.retry_generation(&mut state).await?
            }
            EngineState::ScopeBlocked { critical: false, .. } => {
                engine.continue_after_scope_block(&mut state).await?
            }
            other => {
                info!(state = %other, "simulation cannot proceed, abandoning");
                engine.abandon(&mut state)?
            }
        };

        events.extend(next.events.iter().cloned());
        outcome = next;
    }

    Ok(SimulationRun { state, events })
}

pub async fn execute(args: SimulateArgs, config: &Config, json_mode: bool) -> Result<()> {
    let package_id = args.package.as_deref().unwrap_or(&config.default_package);
    let package = Package::by_id(package_id)?;
    let engine = build_engine(package, config)?;

    info!(package = %package_id, user = %args.name, "starting simulation");
    let run = run_simulation(&engine, UserProfile::new(&args.name), SimulationChoices::from(&args))
        .await
        .context("Simulation failed")?;

    let progression = engine.progression(&run.state);
    let out = SimulationOutput {
        session_id: run.state.session_id.to_string(),
        package: engine.package().id.clone(),
        final_state: run.state.engine_state.clone(),
        answers: run.state.answers.len(),
        core_answers: run.state.core_answer_count(),
        progress: progression.global_progress,
        satisfaction: run.state.satisfaction.clone(),
        career_reactions: run.state.career_reactions.clone(),
        summary: run.state.summary.clone(),
        events: run.events,
    };
    output(&out, json_mode);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::PhaseId;

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.retry.initial_backoff_ms = 1;
        config.retry.max_backoff_ms = 2;
        config
    }

    fn count(events: &[EngineEvent], predicate: impl Fn(&EngineEvent) -> bool) -> usize {
        events.iter().filter(|e| predicate(e)).count()
    }

    #[tokio::test]
    async fn test_essentiel_runs_to_completion() {
        let engine = build_engine(Package::by_id("essentiel").unwrap(), &fast_config()).unwrap();
        let choices = SimulationChoices {
            deepen: false,
            accept_modules: true,
            rating: 5,
        };

        let run = run_simulation(&engine, UserProfile::new("Camille"), choices)
            .await
            .unwrap();

        assert_eq!(run.state.engine_state, EngineState::Complete);
        assert_eq!(run.state.core_answer_count(), 40);
        assert_eq!(run.state.answers.len(), 43);
        assert!(run.state.summary.is_some());
        assert_eq!(
            count(&run.events, |e| matches!(e, EngineEvent::PhaseBadge { .. })),
            2
        );
        assert_eq!(
            count(&run.events, |e| matches!(e, EngineEvent::ModuleStarted { .. })),
            1
        );
        assert_eq!(
            count(&run.events, |e| matches!(e, EngineEvent::CareerExplorationOffered { .. })),
            1
        );
        assert_eq!(run.state.career_reactions.len(), 2);
        assert_eq!(
            count(&run.events, |e| matches!(e, EngineEvent::Completed { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_declined_module_replaces_first_survey() {
        let engine = build_engine(Package::by_id("premium").unwrap(), &fast_config()).unwrap();
        let choices = SimulationChoices {
            deepen: true,
            accept_modules: false,
            rating: 3,
        };

        let run = run_simulation(&engine, UserProfile::new("Alex"), choices)
            .await
            .unwrap();

        assert_eq!(run.state.engine_state, EngineState::Complete);
        assert_eq!(run.state.core_answer_count(), 81);
        assert!(run.state.milestones.is_module_declined(SIMULATED_MODULE.0));
        assert_eq!(
            count(&run.events, |e| matches!(
                e,
                EngineEvent::EndConfirmation { progress: 100 }
            )),
            2
        );
        let surveyed: Vec<PhaseId> = run.state.satisfaction.iter().map(|s| s.phase).collect();
        assert_eq!(surveyed, vec![PhaseId::Investigation, PhaseId::Conclusion]);
        assert!(run.state.satisfaction.iter().all(|s| s.rating == 3));
    }

    #[tokio::test]
    async fn test_premium_surveys_conclusion_before_synthesis() {
        let engine = build_engine(Package::by_id("premium").unwrap(), &fast_config()).unwrap();
        let choices = SimulationChoices {
            deepen: false,
            accept_modules: true,
            rating: 4,
        };

        let run = run_simulation(&engine, UserProfile::new("Camille"), choices)
            .await
            .unwrap();

        assert_eq!(run.state.engine_state, EngineState::Complete);
        let surveyed: Vec<PhaseId> = run.state.satisfaction.iter().map(|s| s.phase).collect();
        assert_eq!(surveyed, vec![PhaseId::Investigation, PhaseId::Conclusion]);

        let prompt = run
            .events
            .iter()
            .position(|e| {
                matches!(e, EngineEvent::SatisfactionRecorded { phase: PhaseId::Conclusion, .. })
            })
            .expect("conclusion survey recorded");
        let confirmation = run
            .events
            .iter()
            .position(|e| matches!(e, EngineEvent::EndConfirmation { .. }))
            .expect("end confirmation");
        assert!(prompt < confirmation);
    }
}
