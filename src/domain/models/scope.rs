//! Out-of-scope classification of a single answer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestedAction {
    Continue,
    DiscardAndReprompt,
    Stop,
}

/// Classifier output for one answer. Only lives for the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfScopeAnalysis {
    pub is_in_scope: bool,
    pub severity: Severity,
    pub suggested_action: SuggestedAction,
    /// Redirect message shown to the user as an assistant message
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alternative_resources: Vec<String>,
}

impl OutOfScopeAnalysis {
    /// An in-scope verdict.
    pub fn in_scope() -> Self {
        Self {
            is_in_scope: true,
            severity: Severity::Low,
            suggested_action: SuggestedAction::Continue,
            message: String::new(),
            alternative_resources: Vec::new(),
        }
    }

    pub fn out_of_scope(
        severity: Severity,
        suggested_action: SuggestedAction,
        message: impl Into<String>,
    ) -> Self {
        Self {
            is_in_scope: false,
            severity,
            suggested_action,
            message: message.into(),
            alternative_resources: Vec::new(),
        }
    }
}
