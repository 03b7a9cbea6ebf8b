//! Port trait definitions (Hexagonal Architecture)
//!
//! The engine depends on these collaborator contracts only:
//! - QuestionSource: produces the next question for a category/complexity decision
//! - SynthesisSource: interim recaps and the final summary
//! - ExplorationClassifier, ScopeClassifier, ModuleAdvisor: enhancement classifiers
//! - SessionObserver: host callbacks fired as side effects
//!
//! Collaborators return `anyhow::Result`; the engine decides which failures
//! are retried, which are ignored and which are surfaced to the host.

pub mod classifiers;
pub mod observer;
pub mod question_source;
pub mod synthesis_source;

pub use classifiers::{ExplorationClassifier, ModuleAdvisor, ScopeClassifier, ScopeQuery};
pub use observer::{NullObserver, SessionObserver};
pub use question_source::QuestionSource;
pub use synthesis_source::SynthesisSource;
