//! Count-based progression.
//!
//! The sole authority for "is the journey complete". Depends only on the
//! number of core answers and the package target, never on elapsed time.

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{core_count, Answer, CurrentPhaseInfo, Package, PhaseId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    /// 0..=100, floor of answered / target
    pub global_progress: u8,
    pub questions_answered: u32,
    pub questions_target: u32,
}

impl Progression {
    pub const fn is_complete(&self, completion_percent: u8) -> bool {
        self.global_progress >= completion_percent
    }
}

/// Global progress of an answer sequence against the package target.
pub fn calculate_progression(answers: &[Answer], package: &Package) -> Progression {
    let answered = core_count(answers);
    let target = package.total_target();

    let global_progress = if target == 0 {
        100
    } else {
        let percent = u64::from(answered) * 100 / u64::from(target);
        u8::try_from(percent.min(100)).unwrap_or(100)
    };

    Progression {
        global_progress,
        questions_answered: answered,
        questions_target: target,
    }
}

/// Where the next question sits within its phase.
pub fn current_phase_info(package: &Package, answers: &[Answer]) -> DomainResult<CurrentPhaseInfo> {
    let answered = core_count(answers);
    let phase = package.phase_for(answered);
    let config = package.phase(phase)?;
    let in_phase = answered.saturating_sub(package.phase_start(phase));

    Ok(CurrentPhaseInfo {
        phase,
        name: phase.name().to_string(),
        position: in_phase + 1,
        total_in_phase: config.target_questions,
        satisfaction_active: config.satisfaction_survey,
    })
}

/// Info for a phase that has just been completed.
pub fn completed_phase_info(package: &Package, phase: PhaseId) -> DomainResult<CurrentPhaseInfo> {
    let config = package.phase(phase)?;
    Ok(CurrentPhaseInfo {
        phase,
        name: phase.name().to_string(),
        position: config.target_questions,
        total_in_phase: config.target_questions,
        satisfaction_active: config.satisfaction_survey,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answers(n: usize) -> Vec<Answer> {
        (0..n)
            .map(|i| Answer::new(format!("q{i}"), format!("Q{i}"), "réponse", "parcours"))
            .collect()
    }

    #[test]
    fn test_empty_sequence() {
        let package = Package::by_id("essentiel").unwrap();
        let progression = calculate_progression(&[], &package);
        assert_eq!(progression.global_progress, 0);
        assert_eq!(progression.questions_target, 40);
    }

    #[test]
    fn test_floor_below_target_is_incomplete() {
        let package = Package::by_id("approfondi").unwrap();
        let progression = calculate_progression(&answers(59), &package);
        assert_eq!(progression.global_progress, 98);
        assert!(!progression.is_complete(100));

        let progression = calculate_progression(&answers(60), &package);
        assert_eq!(progression.global_progress, 100);
        assert!(progression.is_complete(100));
    }

    #[test]
    fn test_capped_at_100() {
        let package = Package::by_id("essentiel").unwrap();
        let progression = calculate_progression(&answers(55), &package);
        assert_eq!(progression.global_progress, 100);
        assert_eq!(progression.questions_answered, 55);
    }

    #[test]
    fn test_module_answers_do_not_progress() {
        let package = Package::by_id("essentiel").unwrap();
        let mut seq = answers(4);
        seq.push(Answer::new("m", "M", "r", "reconversion").in_module("reconversion"));
        assert_eq!(calculate_progression(&seq, &package).global_progress, 10);
    }

    #[test]
    fn test_current_phase_info() {
        let package = Package::by_id("essentiel").unwrap();
        let info = current_phase_info(&package, &answers(12)).unwrap();
        assert_eq!(info.phase, PhaseId::Investigation);
        assert_eq!(info.position, 3);
        assert_eq!(info.total_in_phase, 20);
        assert!(info.satisfaction_active);
    }

    #[test]
    fn test_current_phase_info_past_target() {
        let package = Package::by_id("essentiel").unwrap();
        let info = current_phase_info(&package, &answers(42)).unwrap();
        assert_eq!(info.phase, PhaseId::Conclusion);
        assert_eq!(info.position, 13);
        assert!(!info.satisfaction_active);
    }

    #[test]
    fn test_completed_phase_info() {
        let package = Package::by_id("essentiel").unwrap();
        let info = completed_phase_info(&package, PhaseId::Preliminary).unwrap();
        assert_eq!(info.position, info.total_in_phase);
        assert_eq!(info.name, "Phase préliminaire");
    }
}
