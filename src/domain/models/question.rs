//! Questions and the requests that produce them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::answer::Complexity;
use super::package::PhaseId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    Text,
    MultipleChoice,
}

/// A question produced by the question source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub theme: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    pub required: bool,
}

impl Question {
    /// Free-text, required question.
    pub fn text(id: impl Into<String>, title: impl Into<String>, theme: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            question_type: QuestionType::Text,
            theme: theme.into(),
            choices: None,
            required: true,
        }
    }
}

/// The category/complexity decision for one question slot.
///
/// The decision travels with the generation call and comes back with the
/// generated question, so no state is read across the async boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRequest {
    /// Fresh id per issued request; used to discard stale responses
    pub request_id: Uuid,
    pub phase: PhaseId,
    pub category_id: String,
    /// Position of the category in the phase's ordered list
    pub category_index: usize,
    pub complexity: Complexity,
    /// Length of the answer sequence when the request was issued
    pub expected_answer_count: usize,
    /// Set for module follow-up questions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
}

impl QuestionRequest {
    /// Same decision under a new request id, for a re-prompt.
    #[must_use]
    pub fn reissue(&self, expected_answer_count: usize) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            expected_answer_count,
            ..self.clone()
        }
    }
}

/// A generated question awaiting the user's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingQuestion {
    pub request: QuestionRequest,
    pub question: Question,
}
