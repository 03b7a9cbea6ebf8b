pub mod answer;
pub mod config;
pub mod exploration;
pub mod milestones;
pub mod package;
pub mod profile;
pub mod question;
pub mod scope;
pub mod session;
pub mod synthesis;

pub use answer::{core_answers, core_count, Answer, Complexity};
pub use config::{Config, EngineConfig, LoggingConfig, RetryConfig};
pub use exploration::{
    CareerPath, CareerPathReaction, CareerReaction, ExplorationDecision, ExplorationNeed,
    ModuleDecision, ModuleSuggestion,
};
pub use milestones::{Milestone, SessionMilestones};
pub use package::{Category, Package, PhaseConfig, PhaseId};
pub use profile::{CoachingStyle, UserProfile};
pub use question::{PendingQuestion, Question, QuestionRequest, QuestionType};
pub use scope::{OutOfScopeAnalysis, Severity, SuggestedAction};
pub use session::{ActiveModule, CurrentPhaseInfo, EngineState, SessionState};
pub use synthesis::{EndChoice, InterimSynthesis, SatisfactionResponse, Summary};
