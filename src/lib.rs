//! Bilan - progression engine for skills-assessment questionnaires
//!
//! Decides, from an accumulating list of answers, which phase and category
//! to explore next, how demanding the next question should be, when the
//! one-shot side effects fire (phase badges, satisfaction surveys, optional
//! modules, career exploration) and when the journey is complete enough for
//! a final synthesis. Question text and syntheses come from pluggable
//! collaborators.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, collaborator ports and errors
//! - **Service Layer** (`services`): pure progression rules
//! - **Application Layer** (`application`): the session engine
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging, retry
//! - **Adapters** (`adapters`): deterministic in-process collaborators
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use bilan_engine::cli::commands::simulate::{build_engine, run_simulation, SimulationChoices};
//! use bilan_engine::{Config, Package, UserProfile};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = build_engine(Package::by_id("essentiel")?, &Config::default())?;
//!     let choices = SimulationChoices { deepen: false, accept_modules: true, rating: 4 };
//!     let run = run_simulation(&engine, UserProfile::new("Camille"), choices).await?;
//!     println!("{} answers", run.state.answers.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use application::{Collaborators, EngineEvent, SessionEngine, StepOutcome};
pub use domain::models::{
    Answer, Config, EngineConfig, EngineState, Package, PhaseId, SessionState, UserProfile,
};
pub use domain::ports::{
    ExplorationClassifier, ModuleAdvisor, QuestionSource, ScopeClassifier, SessionObserver,
    SynthesisSource,
};
pub use domain::{DomainError, DomainResult};
pub use infrastructure::config::{ConfigError, ConfigLoader};
