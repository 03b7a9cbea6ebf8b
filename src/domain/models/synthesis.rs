//! Interim recaps, final summaries and satisfaction feedback.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::package::PhaseId;

/// Interim recap of recent answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterimSynthesis {
    pub synthesis: String,
    pub confirmation_request: String,
}

/// Final report of the bilan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub profile_type: String,
    pub synthesis: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub development_areas: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub action_plan: Vec<String>,
}

/// Host choice at the end-of-journey confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndChoice {
    GenerateSynthesis,
    Deepen,
}

/// Satisfaction survey result for one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatisfactionResponse {
    pub phase: PhaseId,
    /// 1..=5
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
