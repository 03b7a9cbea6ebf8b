//! Session-scoped state owned by the host.
//!
//! The answer sequence is the single source of truth for progression;
//! everything else here is either a one-shot milestone, a suspension
//! point, or bookkeeping the host may persist opaquely.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answer::{core_count, Answer};
use super::exploration::{CareerPathReaction, ExplorationNeed};
use super::milestones::SessionMilestones;
use super::package::PhaseId;
use super::question::{PendingQuestion, QuestionRequest};
use super::profile::UserProfile;
use super::synthesis::{SatisfactionResponse, Summary};

/// Engine state machine.
///
/// ```text
/// InPhase(1) → InPhase(2) → InPhase(3) → AwaitingEndConfirmation → GeneratingSynthesis → Complete
///     ↘ AwaitingModuleDecision / AwaitingSatisfaction / AwaitingCareerExplorationDecision ↗
///     ↘ GenerationFailed / ScopeBlocked           any non-terminal → Abandoned
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EngineState {
    /// A question of this phase is pending
    InPhase { phase: PhaseId },
    AwaitingModuleDecision { module_id: String, reason: String },
    AwaitingSatisfaction { phase: PhaseId },
    AwaitingCareerExplorationDecision { need: ExplorationNeed },
    /// Transient: the advisory is emitted and processing continues
    AwaitingEndWarningAck,
    AwaitingEndConfirmation { progress: u8 },
    GeneratingSynthesis,
    /// Final summary generation exhausted its retries
    SynthesisFailed { attempts: u32, error: String },
    /// Question generation exhausted its retries
    GenerationFailed { request: QuestionRequest, attempts: u32, error: String },
    /// Blocking out-of-scope modal
    ScopeBlocked { critical: bool, message: String },
    Complete,
    Abandoned,
}

impl EngineState {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }

    /// Whether the host is expected to submit an answer now.
    pub const fn accepts_answer(&self) -> bool {
        matches!(self, Self::InPhase { .. })
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::InPhase { .. } => "in_phase",
            Self::AwaitingModuleDecision { .. } => "awaiting_module_decision",
            Self::AwaitingSatisfaction { .. } => "awaiting_satisfaction",
            Self::AwaitingCareerExplorationDecision { .. } => "awaiting_career_exploration_decision",
            Self::AwaitingEndWarningAck => "awaiting_end_warning_ack",
            Self::AwaitingEndConfirmation { .. } => "awaiting_end_confirmation",
            Self::GeneratingSynthesis => "generating_synthesis",
            Self::SynthesisFailed { .. } => "synthesis_failed",
            Self::GenerationFailed { .. } => "generation_failed",
            Self::ScopeBlocked { .. } => "scope_blocked",
            Self::Complete => "complete",
            Self::Abandoned => "abandoned",
        }
    }
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InPhase { phase } => write!(f, "in_phase({})", phase.number()),
            other => write!(f, "{}", other.name()),
        }
    }
}

/// Derived view of where the user stands in the current phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPhaseInfo {
    pub phase: PhaseId,
    pub name: String,
    /// 1-based position of the next question within the phase
    pub position: u32,
    pub total_in_phase: u32,
    pub satisfaction_active: bool,
}

/// An accepted module deep-dive in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveModule {
    pub module_id: String,
    pub remaining_questions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session_id: Uuid,
    pub package_id: String,
    pub profile: UserProfile,
    pub started_at: DateTime<Utc>,
    /// Append-only answer sequence
    pub answers: Vec<Answer>,
    pub milestones: SessionMilestones,
    pub engine_state: EngineState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_question: Option<PendingQuestion>,
    /// Request whose question is being generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_flight_request: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_module: Option<ActiveModule>,
    /// One-shot "deepen" override at the completion gate
    #[serde(default)]
    pub deepen_requested: bool,
    #[serde(default)]
    pub out_of_scope_warning_count: u32,
    #[serde(default)]
    pub satisfaction: Vec<SatisfactionResponse>,
    #[serde(default)]
    pub career_reactions: Vec<CareerPathReaction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<Summary>,
}

impl SessionState {
    pub fn new(package_id: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            package_id: package_id.into(),
            profile,
            started_at: Utc::now(),
            answers: Vec::new(),
            milestones: SessionMilestones::new(),
            engine_state: EngineState::InPhase {
                phase: PhaseId::Preliminary,
            },
            pending_question: None,
            in_flight_request: None,
            active_module: None,
            deepen_requested: false,
            out_of_scope_warning_count: 0,
            satisfaction: Vec::new(),
            career_reactions: Vec::new(),
            summary: None,
        }
    }

    /// Answers that count toward progression.
    pub fn core_answer_count(&self) -> u32 {
        core_count(&self.answers)
    }

    pub fn is_closed(&self) -> bool {
        self.engine_state.is_terminal()
    }
}
