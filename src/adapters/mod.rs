//! Deterministic in-process collaborators.
//!
//! Stand-ins for the model-backed sources a host would plug in. The
//! `simulate` command and the test suites run on these.

pub mod classifiers;
pub mod recording;
pub mod scripted;

pub use classifiers::{KeywordScopeClassifier, ScriptedModuleAdvisor, ThresholdExplorationClassifier};
pub use recording::{ObservedCall, RecordingObserver};
pub use scripted::{ScriptedQuestionSource, TemplateSynthesisSource};
