//! Package catalog: phases, categories and their question quotas.
//!
//! A package is immutable configuration loaded once per session. Each of
//! its three phases declares a target question count, a nominal duration
//! and an ordered list of categories with min/max quotas.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::errors::{DomainError, DomainResult};

/// One of the three ordered stages of a bilan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseId {
    /// Phase 1: context, motivations and expectations
    Preliminary,
    /// Phase 2: skills, interests, values, personality
    Investigation,
    /// Phase 3: project definition and action plan
    Conclusion,
}

impl PhaseId {
    /// All phases in order.
    pub const ALL: [Self; 3] = [Self::Preliminary, Self::Investigation, Self::Conclusion];

    /// 1-based phase number.
    pub const fn number(self) -> u8 {
        match self {
            Self::Preliminary => 1,
            Self::Investigation => 2,
            Self::Conclusion => 3,
        }
    }

    /// 0-based position, used to index per-phase arrays.
    pub const fn index(self) -> usize {
        self.number() as usize - 1
    }

    pub fn from_number(number: u8) -> DomainResult<Self> {
        match number {
            1 => Ok(Self::Preliminary),
            2 => Ok(Self::Investigation),
            3 => Ok(Self::Conclusion),
            other => Err(DomainError::PhaseNotFound(other)),
        }
    }

    /// Key handed to the question source.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Preliminary => "phase_preliminaire",
            Self::Investigation => "phase_investigation",
            Self::Conclusion => "phase_conclusion",
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Preliminary => "Phase préliminaire",
            Self::Investigation => "Phase d'investigation",
            Self::Conclusion => "Phase de conclusion",
        }
    }

    /// Next phase, or `None` after the conclusion.
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Preliminary => Some(Self::Investigation),
            Self::Investigation => Some(Self::Conclusion),
            Self::Conclusion => None,
        }
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Preliminary => write!(f, "preliminary"),
            Self::Investigation => write!(f, "investigation"),
            Self::Conclusion => write!(f, "conclusion"),
        }
    }
}

/// A topical sub-area of a phase with question quotas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable identifier, also used to tag answers
    pub id: String,
    /// Phase owning this category
    pub phase: PhaseId,
    /// Questions required before any other category may be deepened
    pub min_questions: u32,
    /// Hard cap of questions in this category
    pub max_questions: u32,
}

impl Category {
    pub fn new(id: impl Into<String>, phase: PhaseId, min_questions: u32, max_questions: u32) -> Self {
        Self {
            id: id.into(),
            phase,
            min_questions,
            max_questions,
        }
    }
}

/// Per-phase configuration of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    pub phase: PhaseId,
    /// Number of core questions expected in this phase
    pub target_questions: u32,
    /// Nominal duration of the phase in minutes
    pub duration_minutes: u32,
    /// Whether a satisfaction survey follows this phase
    pub satisfaction_survey: bool,
    /// Ordered categories; order drives selection precedence
    pub categories: Vec<Category>,
}

impl PhaseConfig {
    /// Nominal minutes allotted to one question of this phase.
    pub fn minutes_per_question(&self) -> f64 {
        if self.target_questions == 0 {
            return 0.0;
        }
        f64::from(self.duration_minutes) / f64::from(self.target_questions)
    }

    /// Category at `index`, failing loudly on a bad index.
    pub fn category_at(&self, index: usize) -> DomainResult<&Category> {
        self.categories
            .get(index)
            .ok_or_else(|| DomainError::CategoryIndexOutOfRange {
                phase: self.phase.to_string(),
                index,
                len: self.categories.len(),
            })
    }
}

/// A named offering with three phases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    /// Exactly three phases, in `PhaseId` order
    pub phases: Vec<PhaseConfig>,
}

/// Quotas for one category across the three catalog tiers
/// (essentiel, approfondi, premium).
type Quota = (&'static str, [(u32, u32); 3]);

const PRELIMINARY_QUOTAS: &[Quota] = &[
    ("parcours", [(2, 5), (3, 7), (4, 9)]),
    ("motivations", [(2, 4), (3, 6), (4, 8)]),
    ("attentes", [(2, 4), (3, 6), (4, 8)]),
];

const INVESTIGATION_QUOTAS: &[Quota] = &[
    ("competences", [(3, 6), (4, 9), (6, 12)]),
    ("interets", [(3, 6), (4, 9), (6, 12)]),
    ("valeurs", [(3, 6), (4, 9), (6, 12)]),
    ("personnalite", [(3, 6), (4, 9), (6, 12)]),
    ("environnement", [(3, 6), (4, 9), (6, 12)]),
];

const CONCLUSION_QUOTAS: &[Quota] = &[
    ("projet", [(2, 5), (3, 7), (4, 9)]),
    ("plan_action", [(2, 4), (3, 6), (4, 8)]),
    ("ressources", [(2, 3), (2, 4), (3, 5)]),
];

/// (id, name, per-phase targets, per-phase minutes, conclusion surveyed)
const CATALOG: &[(&str, &str, [u32; 3], [u32; 3], bool)] = &[
    ("essentiel", "Essentiel", [10, 20, 10], [180, 360, 180], false),
    ("approfondi", "Approfondi", [15, 30, 15], [240, 600, 240], false),
    ("premium", "Premium", [20, 40, 20], [300, 840, 300], true),
];

fn catalog_phase(
    phase: PhaseId,
    tier: usize,
    target: u32,
    minutes: u32,
    satisfaction_survey: bool,
) -> PhaseConfig {
    let quotas = match phase {
        PhaseId::Preliminary => PRELIMINARY_QUOTAS,
        PhaseId::Investigation => INVESTIGATION_QUOTAS,
        PhaseId::Conclusion => CONCLUSION_QUOTAS,
    };
    PhaseConfig {
        phase,
        target_questions: target,
        duration_minutes: minutes,
        satisfaction_survey,
        categories: quotas
            .iter()
            .map(|(id, tiers)| Category::new(*id, phase, tiers[tier].0, tiers[tier].1))
            .collect(),
    }
}

impl Package {
    /// The built-in package catalog.
    pub fn catalog() -> Vec<Self> {
        CATALOG
            .iter()
            .enumerate()
            .map(|(tier, (id, name, targets, minutes, conclusion_survey))| Self {
                id: (*id).to_string(),
                name: (*name).to_string(),
                phases: PhaseId::ALL
                    .iter()
                    .map(|phase| {
                        let i = phase.index();
                        let survey = *phase != PhaseId::Conclusion || *conclusion_survey;
                        catalog_phase(*phase, tier, targets[i], minutes[i], survey)
                    })
                    .collect(),
            })
            .collect()
    }

    /// Look up a catalog package by id.
    pub fn by_id(id: &str) -> DomainResult<Self> {
        Self::catalog()
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DomainError::PackageNotFound(id.to_string()))
    }

    /// Build a custom package from `(target, minutes, survey, categories)` per phase.
    pub fn custom(
        id: impl Into<String>,
        name: impl Into<String>,
        phases: [(u32, u32, bool, Vec<Category>); 3],
    ) -> DomainResult<Self> {
        let package = Self {
            id: id.into(),
            name: name.into(),
            phases: phases
                .into_iter()
                .zip(PhaseId::ALL)
                .map(|((target, minutes, survey, categories), phase)| PhaseConfig {
                    phase,
                    target_questions: target,
                    duration_minutes: minutes,
                    satisfaction_survey: survey,
                    categories,
                })
                .collect(),
        };
        package.validate()?;
        Ok(package)
    }

    pub fn phase(&self, phase: PhaseId) -> DomainResult<&PhaseConfig> {
        self.phases
            .get(phase.index())
            .filter(|p| p.phase == phase)
            .ok_or(DomainError::PhaseNotFound(phase.number()))
    }

    /// Sum of all phase targets.
    pub fn total_target(&self) -> u32 {
        self.phases.iter().map(|p| p.target_questions).sum()
    }

    /// Total nominal duration in minutes.
    pub fn total_minutes(&self) -> u32 {
        self.phases.iter().map(|p| p.duration_minutes).sum()
    }

    /// Phase of the question following `core_answers` answered questions.
    ///
    /// Past the last target the conclusion phase is kept, so deepening
    /// questions stay in phase 3.
    pub fn phase_for(&self, core_answers: u32) -> PhaseId {
        let mut upper = 0;
        for config in &self.phases {
            upper += config.target_questions;
            if core_answers < upper {
                return config.phase;
            }
        }
        PhaseId::Conclusion
    }

    /// Number of core answers given before `phase` starts.
    pub fn phase_start(&self, phase: PhaseId) -> u32 {
        self.phases
            .iter()
            .take(phase.index())
            .map(|p| p.target_questions)
            .sum()
    }

    /// Check catalog invariants; a failure is a configuration bug.
    pub fn validate(&self) -> DomainResult<()> {
        let invalid = |reason: String| DomainError::InvalidPackage {
            package: self.id.clone(),
            reason,
        };

        if self.phases.len() != PhaseId::ALL.len() {
            return Err(invalid(format!("expected 3 phases, found {}", self.phases.len())));
        }

        let mut seen = HashSet::new();
        for (config, expected) in self.phases.iter().zip(PhaseId::ALL) {
            if config.phase != expected {
                return Err(invalid(format!("phase {} declared out of order", config.phase)));
            }
            if config.categories.is_empty() {
                return Err(invalid(format!("phase {} has no categories", config.phase)));
            }
            if config.target_questions == 0 {
                return Err(invalid(format!("phase {} has a zero target", config.phase)));
            }

            let mut min_sum = 0;
            let mut max_sum = 0;
            for category in &config.categories {
                if !seen.insert(category.id.as_str()) {
                    return Err(invalid(format!("duplicate category '{}'", category.id)));
                }
                if category.phase != config.phase {
                    return Err(invalid(format!(
                        "category '{}' belongs to {} but is listed in {}",
                        category.id, category.phase, config.phase
                    )));
                }
                if category.max_questions == 0 || category.min_questions > category.max_questions {
                    return Err(invalid(format!(
                        "category '{}' has quotas {}..{}",
                        category.id, category.min_questions, category.max_questions
                    )));
                }
                min_sum += category.min_questions;
                max_sum += category.max_questions;
            }

            if min_sum > config.target_questions || config.target_questions > max_sum {
                return Err(invalid(format!(
                    "phase {} target {} outside category quotas {}..{}",
                    config.phase, config.target_questions, min_sum, max_sum
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_packages_are_valid() {
        let catalog = Package::catalog();
        assert_eq!(catalog.len(), 3);
        for package in &catalog {
            package.validate().unwrap();
        }
    }

    #[test]
    fn test_catalog_targets() {
        assert_eq!(Package::by_id("essentiel").unwrap().total_target(), 40);
        assert_eq!(Package::by_id("approfondi").unwrap().total_target(), 60);
        assert_eq!(Package::by_id("premium").unwrap().total_target(), 80);
        assert_eq!(Package::by_id("premium").unwrap().total_minutes(), 24 * 60);
    }

    #[test]
    fn test_unknown_package() {
        assert_eq!(
            Package::by_id("gold"),
            Err(DomainError::PackageNotFound("gold".to_string()))
        );
    }

    #[test]
    fn test_phase_for_boundaries() {
        let package = Package::by_id("essentiel").unwrap();
        assert_eq!(package.phase_for(0), PhaseId::Preliminary);
        assert_eq!(package.phase_for(9), PhaseId::Preliminary);
        assert_eq!(package.phase_for(10), PhaseId::Investigation);
        assert_eq!(package.phase_for(29), PhaseId::Investigation);
        assert_eq!(package.phase_for(30), PhaseId::Conclusion);
        assert_eq!(package.phase_for(55), PhaseId::Conclusion);
        assert_eq!(package.phase_start(PhaseId::Conclusion), 30);
    }

    #[test]
    fn test_conclusion_survey_only_in_premium() {
        let essentiel = Package::by_id("essentiel").unwrap();
        let premium = Package::by_id("premium").unwrap();
        assert!(essentiel.phase(PhaseId::Investigation).unwrap().satisfaction_survey);
        assert!(!essentiel.phase(PhaseId::Conclusion).unwrap().satisfaction_survey);
        assert!(premium.phase(PhaseId::Conclusion).unwrap().satisfaction_survey);
    }

    #[test]
    fn test_validate_rejects_unreachable_target() {
        let result = Package::custom(
            "broken",
            "Broken",
            [
                (10, 60, true, vec![Category::new("a", PhaseId::Preliminary, 1, 2)]),
                (1, 60, true, vec![Category::new("b", PhaseId::Investigation, 1, 1)]),
                (1, 60, false, vec![Category::new("c", PhaseId::Conclusion, 1, 1)]),
            ],
        );
        assert!(matches!(result, Err(DomainError::InvalidPackage { .. })));
    }

    #[test]
    fn test_validate_rejects_duplicate_category() {
        let result = Package::custom(
            "dup",
            "Dup",
            [
                (1, 60, true, vec![Category::new("a", PhaseId::Preliminary, 1, 1)]),
                (1, 60, true, vec![Category::new("a", PhaseId::Investigation, 1, 1)]),
                (1, 60, false, vec![Category::new("c", PhaseId::Conclusion, 1, 1)]),
            ],
        );
        assert!(matches!(result, Err(DomainError::InvalidPackage { .. })));
    }

    #[test]
    fn test_category_at_out_of_range() {
        let package = Package::by_id("essentiel").unwrap();
        let phase = package.phase(PhaseId::Preliminary).unwrap();
        assert_eq!(phase.category_at(0).unwrap().id, "parcours");
        assert!(matches!(
            phase.category_at(9),
            Err(DomainError::CategoryIndexOutOfRange { index: 9, len: 3, .. })
        ));
    }

    #[test]
    fn test_minutes_per_question() {
        let package = Package::by_id("essentiel").unwrap();
        let phase = package.phase(PhaseId::Investigation).unwrap();
        assert!((phase.minutes_per_question() - 18.0).abs() < f64::EPSILON);
    }
}
