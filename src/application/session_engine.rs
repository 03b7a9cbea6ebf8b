use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    core_answers, ActiveModule, Answer, CareerPathReaction, CareerReaction, Complexity, CurrentPhaseInfo,
    EndChoice, EngineConfig, EngineState, ExplorationDecision, ExplorationNeed, InterimSynthesis,
    Milestone, ModuleDecision, ModuleSuggestion, OutOfScopeAnalysis, Package, PendingQuestion,
    PhaseId, Question, QuestionRequest, SatisfactionResponse, SessionState, Summary, UserProfile,
};
use crate::domain::ports::{
    ExplorationClassifier, ModuleAdvisor, QuestionSource, ScopeClassifier, ScopeQuery,
    SessionObserver, SynthesisSource,
};
use crate::infrastructure::retry::RetryPolicy;
use crate::services::completion_gate::{self, CompletionCheck};
use crate::services::scope_guard::{self, ScopeVerdict};
use crate::services::{
    affordable_tier, calculate_progression, category_progress, completed_phase_info,
    current_phase_info, determine_question_complexity, get_time_budget, select_category,
    Progression, TimeBudget,
};

/// Side effect produced by a step, in emission order.
///
/// Each event is also dispatched to the [`SessionObserver`] as it happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    AnswersUpdated {
        count: usize,
    },
    QuestionAsked {
        question_id: String,
        phase: PhaseId,
        category_id: String,
        complexity: Complexity,
        #[serde(skip_serializing_if = "Option::is_none")]
        module_id: Option<String>,
    },
    PhaseBadge {
        phase: PhaseId,
        phase_name: String,
    },
    ModuleOffered {
        module_id: String,
        reason: String,
    },
    ModuleStarted {
        module_id: String,
        questions: u32,
    },
    ModuleDeclined {
        module_id: String,
    },
    ModuleFinished {
        module_id: String,
    },
    SatisfactionPrompt {
        info: CurrentPhaseInfo,
    },
    SatisfactionRecorded {
        phase: PhaseId,
        rating: u8,
    },
    CareerExplorationOffered {
        need: ExplorationNeed,
    },
    CareerExplorationResolved {
        decision: ExplorationDecision,
    },
    EndWarning {
        progress: u8,
    },
    EndConfirmation {
        progress: u8,
    },
    MiniSynthesis {
        synthesis: InterimSynthesis,
    },
    ScopeRedirect {
        analysis: OutOfScopeAnalysis,
        blocking: bool,
    },
    GenerationFailed {
        attempts: u32,
        error: String,
    },
    Completed {
        summary: Summary,
    },
    Abandoned {
        answers: usize,
    },
}

impl EngineEvent {
    /// Serialized tag of the event.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AnswersUpdated { .. } => "answers_updated",
            Self::QuestionAsked { .. } => "question_asked",
            Self::PhaseBadge { .. } => "phase_badge",
            Self::ModuleOffered { .. } => "module_offered",
            Self::ModuleStarted { .. } => "module_started",
            Self::ModuleDeclined { .. } => "module_declined",
            Self::ModuleFinished { .. } => "module_finished",
            Self::SatisfactionPrompt { .. } => "satisfaction_prompt",
            Self::SatisfactionRecorded { .. } => "satisfaction_recorded",
            Self::CareerExplorationOffered { .. } => "career_exploration_offered",
            Self::CareerExplorationResolved { .. } => "career_exploration_resolved",
            Self::EndWarning { .. } => "end_warning",
            Self::EndConfirmation { .. } => "end_confirmation",
            Self::MiniSynthesis { .. } => "mini_synthesis",
            Self::ScopeRedirect { .. } => "scope_redirect",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::Completed { .. } => "completed",
            Self::Abandoned { .. } => "abandoned",
        }
    }
}

impl fmt::Display for EngineEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnswersUpdated { count } => write!(f, "answers updated ({count})"),
            Self::QuestionAsked {
                phase,
                category_id,
                complexity,
                module_id,
                ..
            } => match module_id {
                Some(module) => write!(f, "question asked [module {module}, {complexity}]"),
                None => write!(f, "question asked [phase {}, {category_id}, {complexity}]", phase.number()),
            },
            Self::PhaseBadge { phase_name, .. } => write!(f, "badge: {phase_name} terminée"),
            Self::ModuleOffered { module_id, reason } => {
                write!(f, "module offered: {module_id} ({reason})")
            }
            Self::ModuleStarted { module_id, questions } => {
                write!(f, "module started: {module_id} ({questions} questions)")
            }
            Self::ModuleDeclined { module_id } => write!(f, "module declined: {module_id}"),
            Self::ModuleFinished { module_id } => write!(f, "module finished: {module_id}"),
            Self::SatisfactionPrompt { info } => write!(f, "satisfaction survey: {}", info.name),
            Self::SatisfactionRecorded { phase, rating } => {
                write!(f, "satisfaction recorded: phase {} rated {rating}/5", phase.number())
            }
            Self::CareerExplorationOffered { need } => {
                write!(f, "career exploration offered (confidence {})", need.confidence)
            }
            Self::CareerExplorationResolved { decision } => {
                write!(f, "career exploration: {decision:?}")
            }
            Self::EndWarning { progress } => write!(f, "end warning at {progress}%"),
            Self::EndConfirmation { progress } => write!(f, "end confirmation at {progress}%"),
            Self::MiniSynthesis { synthesis } => write!(f, "mini-synthesis: {}", synthesis.synthesis),
            Self::ScopeRedirect { analysis, blocking } => write!(
                f,
                "out of scope ({:?}{}): {}",
                analysis.severity,
                if *blocking { ", blocking" } else { "" },
                analysis.message
            ),
            Self::GenerationFailed { attempts, error } => {
                write!(f, "generation failed after {attempts} attempts: {error}")
            }
            Self::Completed { summary } => write!(f, "completed: {}", summary.profile_type),
            Self::Abandoned { answers } => write!(f, "abandoned after {answers} answers"),
        }
    }
}

/// Result of one engine step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    /// State the session is left in
    pub state: EngineState,
    pub events: Vec<EngineEvent>,
    /// Question awaiting an answer, when the state accepts one
    pub question: Option<PendingQuestion>,
}

/// External collaborators of the engine.
#[derive(Clone)]
pub struct Collaborators {
    pub questions: Arc<dyn QuestionSource>,
    pub synthesis: Arc<dyn SynthesisSource>,
    pub exploration: Arc<dyn ExplorationClassifier>,
    pub scope: Arc<dyn ScopeClassifier>,
    pub modules: Arc<dyn ModuleAdvisor>,
}

/// Whether a gate stage settled the step.
enum Flow {
    Continue,
    Settled,
}

/// Progression engine for one package.
///
/// Every host action takes the session state by mutable reference, applies
/// the gate logic, performs the collaborator calls and returns a
/// [`StepOutcome`]. The engine itself holds no session data, so one engine
/// can serve any number of sessions of its package.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use bilan_engine::adapters::*;
/// use bilan_engine::application::{Collaborators, SessionEngine};
/// use bilan_engine::domain::models::{EngineConfig, Package, UserProfile};
/// use bilan_engine::domain::ports::NullObserver;
///
/// # async fn example() -> anyhow::Result<()> {
/// let engine = SessionEngine::new(
///     Package::by_id("essentiel")?,
///     EngineConfig::default(),
///     Collaborators {
///         questions: Arc::new(ScriptedQuestionSource::new()),
///         synthesis: Arc::new(TemplateSynthesisSource::new()),
///         exploration: Arc::new(ThresholdExplorationClassifier::new()),
///         scope: Arc::new(KeywordScopeClassifier::new()),
///         modules: Arc::new(ScriptedModuleAdvisor::never()),
///     },
///     Arc::new(NullObserver),
/// )?;
///
/// let mut session = engine.new_session(UserProfile::new("Camille"));
/// let outcome = engine.start(&mut session).await?;
/// if let Some(pending) = outcome.question {
///     engine
///         .submit_answer(&mut session, &pending.question.id, "Dix ans en logistique.")
///         .await?;
/// }
/// # Ok(())
/// # }
/// ```
pub struct SessionEngine {
    package: Package,
    config: EngineConfig,
    collaborators: Collaborators,
    observer: Arc<dyn SessionObserver>,
    retry: RetryPolicy,
}

impl SessionEngine {
    /// Create an engine after validating the package.
    pub fn new(
        package: Package,
        config: EngineConfig,
        collaborators: Collaborators,
        observer: Arc<dyn SessionObserver>,
    ) -> DomainResult<Self> {
        package.validate()?;
        Ok(Self {
            package,
            config,
            collaborators,
            observer,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the generation retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub const fn package(&self) -> &Package {
        &self.package
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn new_session(&self, profile: UserProfile) -> SessionState {
        SessionState::new(self.package.id.clone(), profile)
    }

    pub fn progression(&self, state: &SessionState) -> Progression {
        calculate_progression(&state.answers, &self.package)
    }

    pub fn time_budget(&self, state: &SessionState) -> DomainResult<TimeBudget> {
        get_time_budget(&self.package, &state.answers, Some(state.started_at), Utc::now())
    }

    pub fn current_phase_info(&self, state: &SessionState) -> DomainResult<CurrentPhaseInfo> {
        current_phase_info(&self.package, &state.answers)
    }

    /// Start a session, or resume a restored one.
    ///
    /// Asks the first question when the session sits in a phase without a
    /// pending question; otherwise reports the current state unchanged.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn start(&self, state: &mut SessionState) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        if state.package_id != self.package.id {
            return Err(DomainError::ValidationFailed(format!(
                "session package '{}' does not match engine package '{}'",
                state.package_id, self.package.id
            )));
        }

        let mut events = Vec::new();
        if state.engine_state.accepts_answer() && state.pending_question.is_none() {
            info!(package = %self.package.id, "session started");
            self.ask_next_question(state, &mut events).await?;
        }
        Ok(Self::outcome(state, events))
    }

    /// Submit the user's answer to the pending question.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn submit_answer(
        &self,
        state: &mut SessionState,
        question_id: &str,
        value: &str,
    ) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        let pending = match (&state.engine_state, &state.pending_question) {
            (EngineState::InPhase { .. }, Some(pending)) => pending.clone(),
            _ => return Err(DomainError::transition(&state.engine_state, "submit_answer")),
        };
        if pending.question.id != question_id {
            return Err(DomainError::StaleSubmission {
                expected: pending.question.id,
                received: question_id.to_string(),
            });
        }

        let mut events = Vec::new();

        if let Some(analysis) = self.analyze_scope(state, &pending, value).await {
            match scope_guard::verdict(&analysis) {
                ScopeVerdict::Accept => {}
                ScopeVerdict::Redirect => {
                    state.out_of_scope_warning_count += 1;
                    warn!(
                        severity = ?analysis.severity,
                        warnings = state.out_of_scope_warning_count,
                        "answer out of scope, re-asking"
                    );
                    self.emit(state, &mut events, EngineEvent::ScopeRedirect { analysis, blocking: false });
                    let request = pending.request.reissue(state.answers.len());
                    self.request_question(state, request, &mut events).await?;
                    return Ok(Self::outcome(state, events));
                }
                ScopeVerdict::Block { critical } => {
                    state.out_of_scope_warning_count += 1;
                    warn!(critical, severity = ?analysis.severity, "answer out of scope, blocking");
                    let message = analysis.message.clone();
                    self.emit(state, &mut events, EngineEvent::ScopeRedirect { analysis, blocking: true });
                    state.engine_state = EngineState::ScopeBlocked { critical, message };
                    return Ok(Self::outcome(state, events));
                }
            }
        }

        state.pending_question = None;
        let mut answer = Answer::new(
            pending.question.id.clone(),
            pending.question.title.clone(),
            value,
            pending.request.category_id.clone(),
        );
        if let Some(module_id) = &pending.request.module_id {
            answer = answer.in_module(module_id.clone());
        }
        let is_core = answer.is_core();
        state.answers.push(answer);

        info!(
            answers = state.answers.len(),
            core = state.core_answer_count(),
            category = %pending.request.category_id,
            "answer recorded"
        );
        self.emit(
            state,
            &mut events,
            EngineEvent::AnswersUpdated {
                count: state.answers.len(),
            },
        );

        if is_core {
            self.run_gate(state, &mut events).await?;
        } else {
            self.advance_module(state, &mut events).await?;
        }
        Ok(Self::outcome(state, events))
    }

    /// Accept or decline the offered module.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn resolve_module_offer(
        &self,
        state: &mut SessionState,
        decision: ModuleDecision,
    ) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        let EngineState::AwaitingModuleDecision { module_id, .. } = state.engine_state.clone() else {
            return Err(DomainError::transition(&state.engine_state, "resolve_module_offer"));
        };

        let mut events = Vec::new();
        match decision {
            ModuleDecision::Accept => {
                let questions = self.config.module_question_count;
                info!(module = %module_id, questions, "module accepted");
                state.active_module = Some(ActiveModule {
                    module_id: module_id.clone(),
                    remaining_questions: questions,
                });
                self.emit(state, &mut events, EngineEvent::ModuleStarted { module_id, questions });
                self.ask_next_question(state, &mut events).await?;
            }
            ModuleDecision::Decline => {
                info!(module = %module_id, "module declined");
                state.milestones.fire(Milestone::ModuleDeclined(module_id.clone()));
                self.emit(state, &mut events, EngineEvent::ModuleDeclined { module_id });
                self.resume_after_offer(state, &mut events).await?;
            }
        }
        Ok(Self::outcome(state, events))
    }

    /// Record the satisfaction survey of the phase just completed.
    ///
    /// A survey taken once the journey is complete leads to the end
    /// confirmation.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn submit_satisfaction(
        &self,
        state: &mut SessionState,
        rating: u8,
        comment: Option<String>,
    ) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        let EngineState::AwaitingSatisfaction { phase } = state.engine_state else {
            return Err(DomainError::transition(&state.engine_state, "submit_satisfaction"));
        };
        if !(1..=5).contains(&rating) {
            return Err(DomainError::ValidationFailed(format!(
                "satisfaction rating must be between 1 and 5, got {rating}"
            )));
        }

        let mut events = Vec::new();
        state.satisfaction.push(SatisfactionResponse {
            phase,
            rating,
            comment,
            submitted_at: Utc::now(),
        });
        state.milestones.fire(Milestone::SatisfactionSubmitted(phase));
        info!(phase = %phase, rating, "satisfaction recorded");
        self.emit(state, &mut events, EngineEvent::SatisfactionRecorded { phase, rating });

        let progression = self.progression(state);
        if let Flow::Continue = self.apply_completion(state, &progression, &mut events).await? {
            self.resume_after_offer(state, &mut events).await?;
        }
        Ok(Self::outcome(state, events))
    }

    /// Resolve the career-exploration offer and move on to the next question.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn resolve_career_exploration(
        &self,
        state: &mut SessionState,
        decision: ExplorationDecision,
    ) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        if !matches!(state.engine_state, EngineState::AwaitingCareerExplorationDecision { .. }) {
            return Err(DomainError::transition(&state.engine_state, "resolve_career_exploration"));
        }

        let mut events = Vec::new();
        info!(?decision, "career exploration resolved");
        self.emit(state, &mut events, EngineEvent::CareerExplorationResolved { decision });
        self.ask_next_question(state, &mut events).await?;
        Ok(Self::outcome(state, events))
    }

    /// Store the user's reaction to an explored career path.
    pub fn record_career_reaction(
        &self,
        state: &mut SessionState,
        path_title: impl Into<String>,
        reaction: CareerReaction,
    ) -> DomainResult<()> {
        self.ensure_open(state)?;
        let path_title = path_title.into();
        debug!(session_id = %state.session_id, path = %path_title, ?reaction, "career reaction");
        state.career_reactions.push(CareerPathReaction {
            path_title,
            reaction,
        });
        Ok(())
    }

    /// Answer the end confirmation: generate the summary or deepen.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn choose_end(
        &self,
        state: &mut SessionState,
        choice: EndChoice,
    ) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        if !matches!(state.engine_state, EngineState::AwaitingEndConfirmation { .. }) {
            return Err(DomainError::transition(&state.engine_state, "choose_end"));
        }

        let mut events = Vec::new();
        match choice {
            EndChoice::Deepen => {
                info!("deepen requested");
                state.deepen_requested = true;
                let progression = self.progression(state);
                if let Flow::Continue = self.apply_completion(state, &progression, &mut events).await? {
                    state.deepen_requested = false;
                    self.ask_next_question(state, &mut events).await?;
                }
            }
            EndChoice::GenerateSynthesis => self.generate_summary(state, &mut events).await,
        }
        Ok(Self::outcome(state, events))
    }

    /// Re-issue the request that exhausted its retries.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn retry_generation(&self, state: &mut SessionState) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        let mut events = Vec::new();
        match state.engine_state.clone() {
            EngineState::GenerationFailed { request, .. } => {
                info!(category = %request.category_id, "retrying question generation");
                let request = request.reissue(state.answers.len());
                self.request_question(state, request, &mut events).await?;
            }
            EngineState::SynthesisFailed { .. } => {
                info!("retrying summary generation");
                self.generate_summary(state, &mut events).await;
            }
            other => return Err(DomainError::transition(&other, "retry_generation")),
        }
        Ok(Self::outcome(state, events))
    }

    /// Leave a non-critical scope block and re-ask the blocked question.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub async fn continue_after_scope_block(
        &self,
        state: &mut SessionState,
    ) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        if !matches!(state.engine_state, EngineState::ScopeBlocked { critical: false, .. }) {
            return Err(DomainError::transition(&state.engine_state, "continue_after_scope_block"));
        }

        let mut events = Vec::new();
        info!("continuing after scope block");
        match state.pending_question.take() {
            Some(pending) => {
                let request = pending.request.reissue(state.answers.len());
                self.request_question(state, request, &mut events).await?;
            }
            None => self.ask_next_question(state, &mut events).await?,
        }
        Ok(Self::outcome(state, events))
    }

    /// End the session early. Allowed from any non-terminal state.
    #[instrument(name = "session", skip_all, fields(session_id = %state.session_id))]
    pub fn abandon(&self, state: &mut SessionState) -> DomainResult<StepOutcome> {
        self.ensure_open(state)?;
        let mut events = Vec::new();
        info!(from = %state.engine_state, answers = state.answers.len(), "session abandoned");
        state.pending_question = None;
        state.engine_state = EngineState::Abandoned;
        self.emit(
            state,
            &mut events,
            EngineEvent::Abandoned {
                answers: state.answers.len(),
            },
        );
        Ok(Self::outcome(state, events))
    }

    fn ensure_open(&self, state: &SessionState) -> DomainResult<()> {
        if state.is_closed() {
            return Err(DomainError::SessionClosed(state.engine_state.to_string()));
        }
        Ok(())
    }

    fn outcome(state: &SessionState, events: Vec<EngineEvent>) -> StepOutcome {
        let question = if state.engine_state.accepts_answer() {
            state.pending_question.clone()
        } else {
            None
        };
        StepOutcome {
            state: state.engine_state.clone(),
            events,
            question,
        }
    }

    fn emit(&self, state: &SessionState, events: &mut Vec<EngineEvent>, event: EngineEvent) {
        let observer = self.observer.as_ref();
        match &event {
            EngineEvent::AnswersUpdated { .. } => observer.on_answers_update(&state.answers),
            EngineEvent::PhaseBadge { phase, phase_name } => observer.on_phase_badge(*phase, phase_name),
            EngineEvent::ModuleOffered { module_id, reason } => observer.on_module_offer(module_id, reason),
            EngineEvent::SatisfactionPrompt { info } => observer.on_satisfaction_prompt(info),
            EngineEvent::CareerExplorationOffered { need } => observer.on_career_exploration_offer(need),
            EngineEvent::EndWarning { .. } => observer.on_end_warning(),
            EngineEvent::EndConfirmation { progress } => observer.on_end_confirmation(*progress),
            EngineEvent::MiniSynthesis { synthesis } => observer.on_mini_synthesis(synthesis),
            EngineEvent::ScopeRedirect { analysis, blocking } => {
                observer.on_scope_redirect(analysis, *blocking);
            }
            EngineEvent::GenerationFailed { attempts, error } => {
                observer.on_generation_failed(*attempts, error);
            }
            EngineEvent::Completed { summary } => observer.on_complete(&state.answers, summary),
            _ => {}
        }
        events.push(event);
    }

    /// Scope analysis of a submitted answer, when the vigilance window is open.
    async fn analyze_scope(
        &self,
        state: &SessionState,
        pending: &PendingQuestion,
        value: &str,
    ) -> Option<OutOfScopeAnalysis> {
        if !scope_guard::is_vigilant(
            state.core_answer_count(),
            state.out_of_scope_warning_count,
            &self.config,
        ) {
            return None;
        }

        let query = ScopeQuery {
            answer_text: value,
            prior_answers: &state.answers,
            question_text: &pending.question.title,
            user_name: &state.profile.name,
        };
        match self.collaborators.scope.analyze_response_scope(query).await {
            Ok(analysis) => Some(analysis),
            Err(err) => {
                warn!(error = %err, "scope classifier failed, accepting answer");
                None
            }
        }
    }

    /// Gate stages run after a core answer was appended.
    async fn run_gate(&self, state: &mut SessionState, events: &mut Vec<EngineEvent>) -> DomainResult<()> {
        let progression = self.progression(state);
        debug!(
            progress = progression.global_progress,
            answered = progression.questions_answered,
            target = progression.questions_target,
            "progression"
        );

        if completion_gate::end_warning_due(&progression, &state.milestones, &self.config) {
            state.milestones.fire(Milestone::EndWarning);
            state.engine_state = EngineState::AwaitingEndWarningAck;
            info!(progress = progression.global_progress, "end warning");
            self.emit(
                state,
                events,
                EngineEvent::EndWarning {
                    progress: progression.global_progress,
                },
            );
        }

        if let Flow::Settled = self.apply_completion(state, &progression, events).await? {
            return Ok(());
        }

        let core = state.core_answer_count();
        if let Some(left) = completion_gate::phase_boundary(&self.package, core) {
            if let Flow::Settled = self.phase_boundary(state, left, events).await? {
                return Ok(());
            }
        }

        if let Flow::Settled = self.check_exploration(state, events).await {
            return Ok(());
        }

        if completion_gate::mini_synthesis_due(core, &self.config) {
            self.mini_synthesis(state, events).await;
        }

        self.ask_next_question(state, events).await
    }

    async fn apply_completion(
        &self,
        state: &mut SessionState,
        progression: &Progression,
        events: &mut Vec<EngineEvent>,
    ) -> DomainResult<Flow> {
        match completion_gate::check_completion(progression, state.deepen_requested, &self.config) {
            CompletionCheck::NotComplete => Ok(Flow::Continue),
            CompletionCheck::DeepenOverride => {
                state.deepen_requested = false;
                info!(progress = progression.global_progress, "deepening, one more question");
                self.ask_next_question(state, events).await?;
                Ok(Flow::Settled)
            }
            CompletionCheck::AwaitConfirmation => {
                let last = PhaseId::Conclusion;
                if completion_gate::satisfaction_due(&self.package, last, &state.milestones) {
                    let info = completed_phase_info(&self.package, last)?;
                    info!(phase = %last, "satisfaction survey due before confirmation");
                    state.engine_state = EngineState::AwaitingSatisfaction { phase: last };
                    self.emit(state, events, EngineEvent::SatisfactionPrompt { info });
                    return Ok(Flow::Settled);
                }

                let progress = progression.global_progress;
                info!(progress, "journey complete, awaiting confirmation");
                state.engine_state = EngineState::AwaitingEndConfirmation { progress };
                self.emit(state, events, EngineEvent::EndConfirmation { progress });
                Ok(Flow::Settled)
            }
        }
    }

    async fn phase_boundary(
        &self,
        state: &mut SessionState,
        left: PhaseId,
        events: &mut Vec<EngineEvent>,
    ) -> DomainResult<Flow> {
        if state.milestones.fire(Milestone::PhaseCompleted(left)) {
            info!(phase = %left, "phase completed");
            self.emit(
                state,
                events,
                EngineEvent::PhaseBadge {
                    phase: left,
                    phase_name: left.name().to_string(),
                },
            );
        }

        let suggestion = match self
            .collaborators
            .modules
            .suggest_optional_module(&state.answers)
            .await
        {
            Ok(suggestion) => suggestion,
            Err(err) => {
                warn!(error = %err, "module advisor failed, no module offered");
                ModuleSuggestion::not_needed()
            }
        };

        if let Some((module_id, reason)) = completion_gate::module_offer(&suggestion, &state.milestones) {
            info!(module = %module_id, "module offered");
            state.milestones.fire(Milestone::ModuleOffered(module_id.clone()));
            state.engine_state = EngineState::AwaitingModuleDecision {
                module_id: module_id.clone(),
                reason: reason.clone(),
            };
            self.emit(state, events, EngineEvent::ModuleOffered { module_id, reason });
            return Ok(Flow::Settled);
        }

        if completion_gate::satisfaction_due(&self.package, left, &state.milestones) {
            let info = completed_phase_info(&self.package, left)?;
            info!(phase = %left, "satisfaction survey due");
            state.engine_state = EngineState::AwaitingSatisfaction { phase: left };
            self.emit(state, events, EngineEvent::SatisfactionPrompt { info });
            return Ok(Flow::Settled);
        }

        Ok(Flow::Continue)
    }

    async fn check_exploration(&self, state: &mut SessionState, events: &mut Vec<EngineEvent>) -> Flow {
        if !completion_gate::exploration_check_due(
            state.core_answer_count(),
            &state.milestones,
            &self.config,
        ) {
            return Flow::Continue;
        }
        state.milestones.fire(Milestone::CareerExplorationOffered);

        let need = match self
            .collaborators
            .exploration
            .detect_career_exploration_need(&state.answers)
            .await
        {
            Ok(need) => need,
            Err(err) => {
                warn!(error = %err, "exploration classifier failed, not offering");
                ExplorationNeed::none()
            }
        };

        if !completion_gate::exploration_warranted(&need, &self.config) {
            debug!(
                needs = need.needs_exploration,
                confidence = need.confidence,
                "career exploration not warranted"
            );
            return Flow::Continue;
        }

        info!(confidence = need.confidence, "career exploration offered");
        state.engine_state = EngineState::AwaitingCareerExplorationDecision { need: need.clone() };
        self.emit(state, events, EngineEvent::CareerExplorationOffered { need });
        Flow::Settled
    }

    async fn mini_synthesis(&self, state: &SessionState, events: &mut Vec<EngineEvent>) {
        let core: Vec<Answer> = core_answers(&state.answers).cloned().collect();
        let recent = &core[core.len().saturating_sub(self.config.mini_synthesis_window)..];

        match self
            .collaborators
            .synthesis
            .generate_synthesis(recent, &state.profile)
            .await
        {
            Ok(synthesis) => {
                debug!(answers = recent.len(), "mini-synthesis");
                self.emit(state, events, EngineEvent::MiniSynthesis { synthesis });
            }
            Err(err) => warn!(error = %err, "mini-synthesis failed, skipping"),
        }
    }

    /// Continue after a module or satisfaction suspension.
    async fn resume_after_offer(&self, state: &mut SessionState, events: &mut Vec<EngineEvent>) -> DomainResult<()> {
        if let Flow::Settled = self.check_exploration(state, events).await {
            return Ok(());
        }
        self.ask_next_question(state, events).await
    }

    async fn advance_module(&self, state: &mut SessionState, events: &mut Vec<EngineEvent>) -> DomainResult<()> {
        let remaining = state.active_module.as_mut().map_or(0, |module| {
            module.remaining_questions = module.remaining_questions.saturating_sub(1);
            module.remaining_questions
        });
        if remaining > 0 {
            return self.ask_next_question(state, events).await;
        }

        if let Some(module) = state.active_module.take() {
            info!(module = %module.module_id, "module finished");
            self.emit(
                state,
                events,
                EngineEvent::ModuleFinished {
                    module_id: module.module_id,
                },
            );
        }
        self.resume_after_offer(state, events).await
    }

    /// Decide category and complexity for the next slot.
    fn next_request(&self, state: &SessionState) -> DomainResult<QuestionRequest> {
        let phase = self.package.phase_for(state.core_answer_count());
        let phase_config = self.package.phase(phase)?;
        let budget = self.time_budget(state)?;
        let remaining = budget.remaining(phase);

        if let Some(module) = &state.active_module {
            return Ok(QuestionRequest {
                request_id: Uuid::new_v4(),
                phase,
                category_id: module.module_id.clone(),
                category_index: 0,
                complexity: affordable_tier(remaining).min(Complexity::Complex),
                expected_answer_count: state.answers.len(),
                module_id: Some(module.module_id.clone()),
            });
        }

        let progress = category_progress(&state.answers);
        let selection = select_category(phase_config, &progress, budget.phase(phase), &self.config)?;
        let category = phase_config.category_at(selection.index)?;
        let asked = progress.get(&selection.category_id).copied().unwrap_or(0);
        let complexity = determine_question_complexity(category, phase, remaining, asked);
        debug!(
            phase = %phase,
            category = %selection.category_id,
            asked,
            remaining_minutes = remaining,
            %complexity,
            "next question decided"
        );

        Ok(QuestionRequest {
            request_id: Uuid::new_v4(),
            phase,
            category_id: selection.category_id,
            category_index: selection.index,
            complexity,
            expected_answer_count: state.answers.len(),
            module_id: None,
        })
    }

    async fn ask_next_question(&self, state: &mut SessionState, events: &mut Vec<EngineEvent>) -> DomainResult<()> {
        let request = self.next_request(state)?;
        self.request_question(state, request, events).await
    }

    /// Generate the question for `request` under the retry policy.
    async fn request_question(
        &self,
        state: &mut SessionState,
        request: QuestionRequest,
        events: &mut Vec<EngineEvent>,
    ) -> DomainResult<()> {
        state.in_flight_request = Some(request.request_id);

        let source = self.collaborators.questions.as_ref();
        let request_ref = &request;
        let answers = state.answers.as_slice();
        let profile = &state.profile;
        let result = self
            .retry
            .execute(move || source.generate_question(request_ref, answers, profile))
            .await;

        match result {
            Ok(question) => self.apply_generated(state, request, question, events),
            Err(exhausted) => {
                let error = format!("{:#}", exhausted.source);
                let attempts = exhausted.attempts;
                state.in_flight_request = None;
                state.pending_question = None;
                state.engine_state = EngineState::GenerationFailed {
                    request,
                    attempts,
                    error: error.clone(),
                };
                self.emit(state, events, EngineEvent::GenerationFailed { attempts, error });
                Ok(())
            }
        }
    }

    /// Install a generated question as the pending one.
    ///
    /// Applied only while `request` is the request in flight and the answer
    /// sequence still has the length it was issued for. A stale response
    /// leaves the session untouched.
    fn apply_generated(
        &self,
        state: &mut SessionState,
        request: QuestionRequest,
        question: Question,
        events: &mut Vec<EngineEvent>,
    ) -> DomainResult<()> {
        if state.in_flight_request != Some(request.request_id)
            || request.expected_answer_count != state.answers.len()
        {
            warn!(
                request_id = %request.request_id,
                in_flight = ?state.in_flight_request,
                expected = request.expected_answer_count,
                actual = state.answers.len(),
                "discarding stale question"
            );
            return Err(DomainError::StaleResponse {
                request_id: request.request_id.to_string(),
                expected_answers: request.expected_answer_count,
                actual_answers: state.answers.len(),
            });
        }

        info!(
            question_id = %question.id,
            phase = %request.phase,
            category = %request.category_id,
            complexity = %request.complexity,
            "question ready"
        );
        self.emit(
            state,
            events,
            EngineEvent::QuestionAsked {
                question_id: question.id.clone(),
                phase: request.phase,
                category_id: request.category_id.clone(),
                complexity: request.complexity,
                module_id: request.module_id.clone(),
            },
        );
        state.in_flight_request = None;
        state.engine_state = EngineState::InPhase {
            phase: request.phase,
        };
        state.pending_question = Some(PendingQuestion { request, question });
        Ok(())
    }

    async fn generate_summary(&self, state: &mut SessionState, events: &mut Vec<EngineEvent>) {
        state.engine_state = EngineState::GeneratingSynthesis;
        info!(answers = state.answers.len(), "generating final summary");

        let source = self.collaborators.synthesis.as_ref();
        let answers = state.answers.as_slice();
        let package = &self.package;
        let profile = &state.profile;
        let result = self
            .retry
            .execute(move || source.generate_summary(answers, package, profile))
            .await;

        match result {
            Ok(summary) => {
                state.summary = Some(summary.clone());
                state.engine_state = EngineState::Complete;
                if state.milestones.fire(Milestone::Completed) {
                    info!(profile_type = %summary.profile_type, "session complete");
                    self.emit(state, events, EngineEvent::Completed { summary });
                }
            }
            Err(exhausted) => {
                let error = format!("{:#}", exhausted.source);
                let attempts = exhausted.attempts;
                state.engine_state = EngineState::SynthesisFailed {
                    attempts,
                    error: error.clone(),
                };
                self.emit(state, events, EngineEvent::GenerationFailed { attempts, error });
            }
        }
    }
}
