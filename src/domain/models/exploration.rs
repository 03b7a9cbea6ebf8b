//! Career-exploration and optional-module classifier outputs.

use serde::{Deserialize, Serialize};

/// A career path suggested during exploration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerPath {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Whether a career-exploration side quest should be offered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorationNeed {
    pub needs_exploration: bool,
    /// 0..=100
    pub confidence: u8,
    pub reason: String,
    #[serde(default)]
    pub suggested_paths: Vec<CareerPath>,
}

impl ExplorationNeed {
    pub fn none() -> Self {
        Self {
            needs_exploration: false,
            confidence: 0,
            reason: String::new(),
            suggested_paths: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerReaction {
    Interested,
    NotInterested,
    NeedMoreInfo,
}

/// The user's reaction to one explored path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerPathReaction {
    pub path_title: String,
    pub reaction: CareerReaction,
}

/// Host decision on a career-exploration offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationDecision {
    Explore,
    Skip,
}

/// Output of the module suggestion source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSuggestion {
    pub is_needed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ModuleSuggestion {
    pub fn not_needed() -> Self {
        Self {
            is_needed: false,
            module_id: None,
            reason: None,
        }
    }

    pub fn needed(module_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            is_needed: true,
            module_id: Some(module_id.into()),
            reason: Some(reason.into()),
        }
    }
}

/// Host decision on a module offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleDecision {
    Accept,
    Decline,
}
