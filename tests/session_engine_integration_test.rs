//! End-to-end scenarios for the session engine.

mod common;

use bilan_engine::adapters::{
    KeywordScopeClassifier, ObservedCall, ScriptedModuleAdvisor, ScriptedQuestionSource,
    ThresholdExplorationClassifier,
};
use bilan_engine::application::EngineEvent;
use bilan_engine::domain::models::{
    CareerPath, EndChoice, EngineState, ExplorationDecision, ExplorationNeed, ModuleDecision,
    PhaseId, Severity,
};
use bilan_engine::domain::DomainError;

use common::{
    answer_text, five_five_five, flat_package, setup_test_logging, surveyed_package,
    TestEngineBuilder,
};

fn badges(events: &[EngineEvent]) -> Vec<PhaseId> {
    events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::PhaseBadge { phase, .. } => Some(*phase),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fifteen_answers_walk_all_phases() {
    setup_test_logging();
    let t = TestEngineBuilder::new(five_five_five()).build();
    let (mut state, outcome) = t.started_session().await;
    assert_eq!(outcome.question.unwrap().request.phase, PhaseId::Preliminary);

    for i in 1..=15 {
        let outcome = t.answer(&mut state, &answer_text(i)).await;
        let progress = t.engine.progression(&state).global_progress;

        match i {
            5 => assert_eq!(badges(&outcome.events), vec![PhaseId::Preliminary]),
            10 => assert_eq!(badges(&outcome.events), vec![PhaseId::Investigation]),
            _ => assert!(badges(&outcome.events).is_empty(), "unexpected badge after {i}"),
        }

        if i < 15 {
            assert!(progress < 100, "progress {progress} after {i} answers");
            assert!(outcome.question.is_some());
        } else {
            assert_eq!(progress, 100);
            assert_eq!(outcome.state, EngineState::AwaitingEndConfirmation { progress: 100 });
            assert!(outcome.question.is_none());
        }
    }

    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::EndWarning)),
        1
    );

    let outcome = t
        .engine
        .choose_end(&mut state, EndChoice::GenerateSynthesis)
        .await
        .unwrap();
    assert_eq!(outcome.state, EngineState::Complete);
    assert_eq!(t.synthesis.summary_calls(), 1);
    assert_eq!(
        t.observer.calls().iter().filter(|c| matches!(c, ObservedCall::Complete { .. })).count(),
        1
    );
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::Complete { answers: 15 })),
        1
    );

    let err = t
        .engine
        .choose_end(&mut state, EndChoice::GenerateSynthesis)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SessionClosed(_)));
}

#[tokio::test]
async fn test_declined_module_is_never_offered_again() {
    let t = TestEngineBuilder::new(five_five_five())
        .modules(ScriptedModuleAdvisor::always("x", "r"))
        .build();
    let (mut state, _) = t.started_session().await;

    for i in 1..=5 {
        t.answer(&mut state, &answer_text(i)).await;
    }
    assert_eq!(
        state.engine_state,
        EngineState::AwaitingModuleDecision {
            module_id: "x".to_string(),
            reason: "r".to_string(),
        }
    );

    let outcome = t
        .engine
        .resolve_module_offer(&mut state, ModuleDecision::Decline)
        .await
        .unwrap();
    assert!(outcome.question.is_some());
    assert!(state.milestones.is_module_declined("x"));

    for i in 6..=10 {
        let outcome = t.answer(&mut state, &answer_text(i)).await;
        assert!(!outcome
            .events
            .iter()
            .any(|e| matches!(e, EngineEvent::ModuleOffered { .. })));
    }

    assert_eq!(t.modules.calls(), 2);
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::ModuleOffer(_))),
        1
    );
    assert_eq!(state.engine_state, EngineState::InPhase { phase: PhaseId::Conclusion });
}

#[tokio::test]
async fn test_career_exploration_is_offered_once() {
    let need = ExplorationNeed {
        needs_exploration: true,
        confidence: 100,
        reason: "always".to_string(),
        suggested_paths: vec![CareerPath {
            title: "Formateur".to_string(),
            description: "Transmettre".to_string(),
        }],
    };
    let t = TestEngineBuilder::new(flat_package([15, 15, 15]))
        .exploration(ThresholdExplorationClassifier::fixed(need))
        .build();
    let (mut state, _) = t.started_session().await;

    for i in 1..=30 {
        t.answer(&mut state, &answer_text(i)).await;
        if matches!(
            state.engine_state,
            EngineState::AwaitingCareerExplorationDecision { .. }
        ) {
            t.engine
                .resolve_career_exploration(&mut state, ExplorationDecision::Skip)
                .await
                .unwrap();
        }
    }

    assert_eq!(state.core_answer_count(), 30);
    assert_eq!(t.exploration.calls(), 1);
    assert_eq!(
        t.observer
            .count(|c| matches!(c, ObservedCall::CareerExplorationOffer { confidence: 100 })),
        1
    );
}

#[tokio::test]
async fn test_critical_answer_is_discarded_and_blocks() {
    let t = TestEngineBuilder::new(five_five_five()).build();
    let (mut state, outcome) = t.started_session().await;
    let question_id = outcome.question.unwrap().question.id;

    let outcome = t
        .engine
        .submit_answer(&mut state, &question_id, "Bonjour, j'ai 15 ans.")
        .await
        .unwrap();

    assert!(state.answers.is_empty());
    assert!(matches!(
        outcome.state,
        EngineState::ScopeBlocked { critical: true, .. }
    ));
    assert!(outcome.question.is_none());
    assert_eq!(state.out_of_scope_warning_count, 1);
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::ScopeRedirect { blocking: true })),
        1
    );

    assert!(matches!(
        t.engine.continue_after_scope_block(&mut state).await,
        Err(DomainError::InvalidStateTransition { .. })
    ));
    let outcome = t.engine.abandon(&mut state).unwrap();
    assert_eq!(outcome.state, EngineState::Abandoned);
}

#[tokio::test]
async fn test_low_severity_and_in_scope_answers_are_appended() {
    let t = TestEngineBuilder::new(five_five_five()).build();
    let (mut state, _) = t.started_session().await;

    t.answer(&mut state, "Dix ans dans la logistique.").await;
    t.answer(&mut state, "Je suis venu à pied, la météo était clémente.").await;

    assert_eq!(state.answers.len(), 2);
    assert_eq!(state.out_of_scope_warning_count, 0);
    assert_eq!(t.scope.calls(), 2);
}

#[tokio::test]
async fn test_medium_severity_reprompts_without_appending() {
    let t = TestEngineBuilder::new(five_five_five()).build();
    let (mut state, outcome) = t.started_session().await;
    let first = outcome.question.unwrap();

    let outcome = t
        .engine
        .submit_answer(&mut state, &first.question.id, "Voici ma recette de gratin.")
        .await
        .unwrap();

    assert!(state.answers.is_empty());
    assert_eq!(state.out_of_scope_warning_count, 1);
    let second = outcome.question.unwrap();
    assert_ne!(second.question.id, first.question.id);
    assert_eq!(second.request.category_id, first.request.category_id);
    assert!(matches!(
        outcome.events.first(),
        Some(EngineEvent::ScopeRedirect { analysis, blocking: false }) if analysis.severity == Severity::Medium
    ));
}

#[tokio::test]
async fn test_vigilance_window_closes_without_warnings() {
    let t = TestEngineBuilder::new(five_five_five())
        .scope(KeywordScopeClassifier::new())
        .build();
    let (mut state, _) = t.started_session().await;

    for i in 1..=7 {
        t.answer(&mut state, &answer_text(i)).await;
    }
    assert_eq!(t.scope.calls(), 5);

    t.answer(&mut state, "Une recette de cuisine").await;
    assert_eq!(state.answers.len(), 8);
}

#[tokio::test]
async fn test_question_source_recovers_on_third_attempt() {
    let t = TestEngineBuilder::new(five_five_five())
        .questions(ScriptedQuestionSource::failing_first(2))
        .build();
    let (state, outcome) = t.started_session().await;

    assert_eq!(t.questions.calls(), 3);
    assert!(outcome.question.is_some());
    assert_eq!(outcome.state, EngineState::InPhase { phase: PhaseId::Preliminary });
    assert_eq!(
        outcome
            .events
            .iter()
            .filter(|e| matches!(e, EngineEvent::QuestionAsked { .. }))
            .count(),
        1
    );
    assert!(!outcome
        .events
        .iter()
        .any(|e| matches!(e, EngineEvent::GenerationFailed { .. })));
    assert_eq!(t.questions.requests().await.len(), 1);
    assert_eq!(state.pending_question, outcome.question);
}

#[tokio::test]
async fn test_exhausted_question_source_surfaces_failure() {
    let t = TestEngineBuilder::new(five_five_five())
        .questions(ScriptedQuestionSource::failing_first(3))
        .build();
    let (mut state, outcome) = t.started_session().await;

    assert!(matches!(
        outcome.state,
        EngineState::GenerationFailed { attempts: 3, .. }
    ));
    assert!(state.pending_question.is_none());

    let outcome = t.engine.retry_generation(&mut state).await.unwrap();
    assert!(outcome.question.is_some());
    assert_eq!(t.questions.calls(), 4);
}

#[tokio::test]
async fn test_completion_boundary_and_deepen_cycle() {
    let t = TestEngineBuilder::new(flat_package([34, 33, 33])).build();
    let (mut state, _) = t.started_session().await;

    for i in 1..=99 {
        let outcome = t.answer(&mut state, &answer_text(i)).await;
        if matches!(outcome.state, EngineState::AwaitingCareerExplorationDecision { .. }) {
            t.engine
                .resolve_career_exploration(&mut state, ExplorationDecision::Skip)
                .await
                .unwrap();
        }
    }
    assert_eq!(t.engine.progression(&state).global_progress, 99);
    assert!(state.engine_state.accepts_answer());

    let outcome = t.answer(&mut state, &answer_text(100)).await;
    assert_eq!(outcome.state, EngineState::AwaitingEndConfirmation { progress: 100 });

    let outcome = t.engine.choose_end(&mut state, EndChoice::Deepen).await.unwrap();
    let extra = outcome.question.expect("one more question");
    assert_eq!(extra.request.phase, PhaseId::Conclusion);

    let outcome = t.answer(&mut state, "Une dernière précision.").await;
    assert_eq!(outcome.state, EngineState::AwaitingEndConfirmation { progress: 100 });
    assert_eq!(state.core_answer_count(), 101);
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::EndConfirmation(100))),
        2
    );

    let outcome = t
        .engine
        .choose_end(&mut state, EndChoice::GenerateSynthesis)
        .await
        .unwrap();
    assert_eq!(outcome.state, EngineState::Complete);
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::Complete { answers: 101 })),
        1
    );
}

#[tokio::test]
async fn test_conclusion_survey_precedes_end_confirmation() {
    let t = TestEngineBuilder::new(surveyed_package([5, 5, 5], [false, false, true])).build();
    let (mut state, _) = t.started_session().await;

    let mut outcome = None;
    for i in 1..=15 {
        outcome = Some(t.answer(&mut state, &answer_text(i)).await);
    }
    let outcome = outcome.expect("fifteen answers");
    assert_eq!(
        outcome.state,
        EngineState::AwaitingSatisfaction {
            phase: PhaseId::Conclusion
        }
    );
    assert!(outcome.question.is_none());
    assert_eq!(
        t.observer
            .count(|c| matches!(c, ObservedCall::SatisfactionPrompt(PhaseId::Conclusion))),
        1
    );
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::EndConfirmation(_))),
        0
    );

    let outcome = t
        .engine
        .submit_satisfaction(&mut state, 4, Some("Très utile".to_string()))
        .await
        .unwrap();
    assert_eq!(outcome.state, EngineState::AwaitingEndConfirmation { progress: 100 });
    assert_eq!(state.satisfaction.len(), 1);
    assert_eq!(state.satisfaction[0].phase, PhaseId::Conclusion);

    t.engine.choose_end(&mut state, EndChoice::Deepen).await.unwrap();
    let outcome = t.answer(&mut state, &answer_text(16)).await;
    assert_eq!(outcome.state, EngineState::AwaitingEndConfirmation { progress: 100 });
    assert_eq!(
        t.observer.count(|c| matches!(c, ObservedCall::SatisfactionPrompt(_))),
        1
    );
}

#[tokio::test]
async fn test_session_state_survives_serialization() {
    let t = TestEngineBuilder::new(five_five_five()).build();
    let (mut state, _) = t.started_session().await;
    for i in 1..=3 {
        t.answer(&mut state, &answer_text(i)).await;
    }

    let json = serde_json::to_string(&state).unwrap();
    let mut restored: bilan_engine::SessionState = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, state);

    let outcome = t.engine.start(&mut restored).await.unwrap();
    assert_eq!(outcome.question, state.pending_question);
    t.answer(&mut restored, &answer_text(4)).await;
    assert_eq!(restored.core_answer_count(), 4);
}
