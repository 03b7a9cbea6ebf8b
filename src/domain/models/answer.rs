//! Answers and question complexity tiers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Ordered depth tiers of a question (and of an answer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
    Reflective,
}

impl Complexity {
    /// All tiers, least demanding first.
    pub const ALL: [Self; 4] = [Self::Simple, Self::Medium, Self::Complex, Self::Reflective];

    /// Nominal minutes a question of this tier takes to answer.
    pub const fn estimated_minutes(self) -> u32 {
        match self {
            Self::Simple => 2,
            Self::Medium => 4,
            Self::Complex => 7,
            Self::Reflective => 10,
        }
    }

    /// One tier up, saturating at `Reflective`.
    pub const fn deeper(self) -> Self {
        match self {
            Self::Simple => Self::Medium,
            Self::Medium => Self::Complex,
            Self::Complex | Self::Reflective => Self::Reflective,
        }
    }

    /// One tier down, saturating at `Simple`.
    pub const fn lighter(self) -> Self {
        match self {
            Self::Simple | Self::Medium => Self::Simple,
            Self::Complex => Self::Medium,
            Self::Reflective => Self::Complex,
        }
    }

    /// Infer the tier of a free-text response from its trimmed length.
    pub fn infer(response: &str) -> Self {
        match response.trim().chars().count() {
            0..=39 => Self::Simple,
            40..=159 => Self::Medium,
            160..=399 => Self::Complex,
            _ => Self::Reflective,
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple => write!(f, "simple"),
            Self::Medium => write!(f, "medium"),
            Self::Complex => write!(f, "complex"),
            Self::Reflective => write!(f, "reflective"),
        }
    }
}

/// One recorded user response. Answers are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: String,
    /// Exact question text shown, kept to avoid repetition and to restore sessions
    pub question_title: String,
    pub value: String,
    pub complexity: Complexity,
    /// Category (or module id, for module follow-ups) this answer belongs to
    pub category_id: String,
    /// Set when the answer belongs to an optional module deep-dive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Answer {
    pub fn new(
        question_id: impl Into<String>,
        question_title: impl Into<String>,
        value: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        let value = value.into();
        Self {
            question_id: question_id.into(),
            question_title: question_title.into(),
            complexity: Complexity::infer(&value),
            value,
            category_id: category_id.into(),
            module_id: None,
            timestamp: Utc::now(),
        }
    }

    /// Tag this answer as a module follow-up.
    #[must_use]
    pub fn in_module(mut self, module_id: impl Into<String>) -> Self {
        self.module_id = Some(module_id.into());
        self
    }

    /// Core answers drive progression; module follow-ups do not.
    pub const fn is_core(&self) -> bool {
        self.module_id.is_none()
    }
}

/// Iterator over the core answers of a sequence.
pub fn core_answers(answers: &[Answer]) -> impl Iterator<Item = &Answer> {
    answers.iter().filter(|a| a.is_core())
}

/// Number of core answers in a sequence.
pub fn core_count(answers: &[Answer]) -> u32 {
    u32::try_from(core_answers(answers).count()).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_complexity_by_length() {
        assert_eq!(Complexity::infer("Oui"), Complexity::Simple);
        assert_eq!(Complexity::infer(&"a".repeat(39)), Complexity::Simple);
        assert_eq!(Complexity::infer(&"a".repeat(40)), Complexity::Medium);
        assert_eq!(Complexity::infer(&"a".repeat(200)), Complexity::Complex);
        assert_eq!(Complexity::infer(&"a".repeat(400)), Complexity::Reflective);
    }

    #[test]
    fn test_infer_ignores_surrounding_whitespace() {
        let padded = format!("   {}   ", "a".repeat(30));
        assert_eq!(Complexity::infer(&padded), Complexity::Simple);
    }

    #[test]
    fn test_tier_order_and_steps() {
        assert!(Complexity::Simple < Complexity::Reflective);
        assert_eq!(Complexity::Reflective.deeper(), Complexity::Reflective);
        assert_eq!(Complexity::Simple.lighter(), Complexity::Simple);
        assert_eq!(Complexity::Medium.deeper(), Complexity::Complex);
    }

    #[test]
    fn test_core_count_skips_module_answers() {
        let answers = vec![
            Answer::new("q1", "Q1", "réponse", "parcours"),
            Answer::new("m1", "M1", "réponse", "reconversion").in_module("reconversion"),
            Answer::new("q2", "Q2", "réponse", "motivations"),
        ];
        assert_eq!(core_count(&answers), 2);
        assert!(!answers[1].is_core());
    }
}
