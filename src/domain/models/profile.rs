//! The beneficiary taking the bilan.

use serde::{Deserialize, Serialize};

/// Tone the question and synthesis sources should adopt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoachingStyle {
    #[default]
    Collaborative,
    Analytic,
    Creative,
}

impl std::str::FromStr for CoachingStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "collaborative" => Ok(Self::Collaborative),
            "analytic" => Ok(Self::Analytic),
            "creative" => Ok(Self::Creative),
            other => Err(format!("unknown coaching style: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub coaching_style: CoachingStyle,
    /// Current or last job title, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_position: Option<String>,
}

impl UserProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coaching_style: CoachingStyle::default(),
            current_position: None,
        }
    }

    #[must_use]
    pub const fn with_style(mut self, coaching_style: CoachingStyle) -> Self {
        self.coaching_style = coaching_style;
        self
    }
}
