//! Common test utilities for integration tests
//!
//! Provides shared fixtures, helpers, and test utilities used across
//! multiple integration test files.

#![allow(dead_code)]

use std::sync::Arc;

use bilan_engine::adapters::{
    KeywordScopeClassifier, RecordingObserver, ScriptedModuleAdvisor, ScriptedQuestionSource,
    TemplateSynthesisSource, ThresholdExplorationClassifier,
};
use bilan_engine::application::{Collaborators, SessionEngine, StepOutcome};
use bilan_engine::domain::models::{
    Category, EngineConfig, Package, PhaseId, SessionState, UserProfile,
};
use bilan_engine::infrastructure::RetryPolicy;

/// Package with one category per phase and the given targets, no surveys.
pub fn flat_package(targets: [u32; 3]) -> Package {
    surveyed_package(targets, [false; 3])
}

/// Package with one category per phase and per-phase satisfaction surveys.
pub fn surveyed_package(targets: [u32; 3], surveys: [bool; 3]) -> Package {
    let phase = |i: usize, id: &str, phase: PhaseId| {
        (
            targets[i],
            60,
            surveys[i],
            vec![Category::new(id, phase, 1, targets[i])],
        )
    };
    Package::custom(
        "test",
        "Test",
        [
            phase(0, "parcours", PhaseId::Preliminary),
            phase(1, "valeurs", PhaseId::Investigation),
            phase(2, "projet", PhaseId::Conclusion),
        ],
    )
    .expect("valid test package")
}

/// Phases targeting 5/5/5 questions.
pub fn five_five_five() -> Package {
    flat_package([5, 5, 5])
}

/// Engine plus handles on every collaborator for call-count assertions.
pub struct TestEngine {
    pub engine: SessionEngine,
    pub questions: Arc<ScriptedQuestionSource>,
    pub synthesis: Arc<TemplateSynthesisSource>,
    pub exploration: Arc<ThresholdExplorationClassifier>,
    pub scope: Arc<KeywordScopeClassifier>,
    pub modules: Arc<ScriptedModuleAdvisor>,
    pub observer: Arc<RecordingObserver>,
}

pub struct TestEngineBuilder {
    package: Package,
    config: EngineConfig,
    questions: ScriptedQuestionSource,
    exploration: ThresholdExplorationClassifier,
    scope: KeywordScopeClassifier,
    modules: ScriptedModuleAdvisor,
}

impl TestEngineBuilder {
    pub fn new(package: Package) -> Self {
        Self {
            package,
            config: EngineConfig::default(),
            questions: ScriptedQuestionSource::new(),
            exploration: ThresholdExplorationClassifier::new(),
            scope: KeywordScopeClassifier::new(),
            modules: ScriptedModuleAdvisor::never(),
        }
    }

    pub fn questions(mut self, questions: ScriptedQuestionSource) -> Self {
        self.questions = questions;
        self
    }

    pub fn exploration(mut self, exploration: ThresholdExplorationClassifier) -> Self {
        self.exploration = exploration;
        self
    }

    pub fn scope(mut self, scope: KeywordScopeClassifier) -> Self {
        self.scope = scope;
        self
    }

    pub fn modules(mut self, modules: ScriptedModuleAdvisor) -> Self {
        self.modules = modules;
        self
    }

    pub fn build(self) -> TestEngine {
        let questions = Arc::new(self.questions);
        let synthesis = Arc::new(TemplateSynthesisSource::new());
        let exploration = Arc::new(self.exploration);
        let scope = Arc::new(self.scope);
        let modules = Arc::new(self.modules);
        let observer = Arc::new(RecordingObserver::new());

        let engine = SessionEngine::new(
            self.package,
            self.config,
            Collaborators {
                questions: questions.clone(),
                synthesis: synthesis.clone(),
                exploration: exploration.clone(),
                scope: scope.clone(),
                modules: modules.clone(),
            },
            observer.clone(),
        )
        .expect("valid engine")
        .with_retry_policy(RetryPolicy::new(3, 1, 4));

        TestEngine {
            engine,
            questions,
            synthesis,
            exploration,
            scope,
            modules,
            observer,
        }
    }
}

impl TestEngine {
    /// Fresh session for "Camille", already started.
    pub async fn started_session(&self) -> (SessionState, StepOutcome) {
        let mut state = self.engine.new_session(UserProfile::new("Camille"));
        let outcome = self.engine.start(&mut state).await.expect("session starts");
        (state, outcome)
    }

    /// Answer the pending question with `value`.
    pub async fn answer(&self, state: &mut SessionState, value: &str) -> StepOutcome {
        let question_id = state
            .pending_question
            .as_ref()
            .expect("a pending question")
            .question
            .id
            .clone();
        self.engine
            .submit_answer(state, &question_id, value)
            .await
            .expect("answer accepted")
    }
}

/// Well-formed, in-scope answer number `i`.
pub fn answer_text(i: usize) -> String {
    format!("Réponse {i} : j'ai coordonné plusieurs projets avec des équipes variées.")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
