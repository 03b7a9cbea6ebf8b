//! Domain errors for the bilan progression engine.

use thiserror::Error;

/// Domain-level errors raised by the engine.
///
/// Collaborator failures (question generation, classifiers) are not
/// represented here: they are absorbed into recoverable engine states.
/// Everything below is either a host misuse or a configuration bug.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    #[error("Phase not found: {0}")]
    PhaseNotFound(u8),

    #[error("Category index {index} out of range for phase {phase} ({len} categories)")]
    CategoryIndexOutOfRange { phase: String, index: usize, len: usize },

    #[error("Invalid package {package}: {reason}")]
    InvalidPackage { package: String, reason: String },

    #[error("Action '{action}' is not allowed in state {from}")]
    InvalidStateTransition { from: String, action: String },

    #[error("Stale submission: pending question is {expected}, received {received}")]
    StaleSubmission { expected: String, received: String },

    #[error("Stale response for request {request_id}: issued at {expected_answers} answers, session has {actual_answers}")]
    StaleResponse {
        request_id: String,
        expected_answers: usize,
        actual_answers: usize,
    },

    #[error("Session is closed ({0})")]
    SessionClosed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Shorthand for a rejected host action.
    pub fn transition(from: impl std::fmt::Display, action: impl Into<String>) -> Self {
        Self::InvalidStateTransition {
            from: from.to_string(),
            action: action.into(),
        }
    }
}
