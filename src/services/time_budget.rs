//! Time budget per phase.
//!
//! Advisory only: the remaining minutes tune question complexity and
//! category deepening. Completion is decided by [`super::progression`]
//! and never by this module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;
use crate::domain::models::{core_count, Answer, Package, PhaseId};

/// Remaining time of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseBudget {
    pub phase: PhaseId,
    pub duration_minutes: u32,
    /// Never negative
    pub remaining_minutes: f64,
}

impl PhaseBudget {
    /// Share of the phase duration still available, in `[0.0, 1.0]`.
    pub fn remaining_ratio(&self) -> f64 {
        if self.duration_minutes == 0 {
            return 0.0;
        }
        (self.remaining_minutes / f64::from(self.duration_minutes)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeBudget {
    /// Phase of the next question
    pub active_phase: PhaseId,
    /// One entry per phase, in order
    pub phases: [PhaseBudget; 3],
}

impl TimeBudget {
    pub fn remaining(&self, phase: PhaseId) -> f64 {
        self.phases[phase.index()].remaining_minutes
    }

    pub fn phase(&self, phase: PhaseId) -> &PhaseBudget {
        &self.phases[phase.index()]
    }

    pub fn phase1_remaining(&self) -> f64 {
        self.remaining(PhaseId::Preliminary)
    }

    pub fn phase2_remaining(&self) -> f64 {
        self.remaining(PhaseId::Investigation)
    }

    pub fn phase3_remaining(&self) -> f64 {
        self.remaining(PhaseId::Conclusion)
    }

    pub fn total_remaining(&self) -> f64 {
        self.phases.iter().map(|p| p.remaining_minutes).sum()
    }
}

/// Compute the remaining time of every phase.
///
/// Each core answer in a phase consumes `duration / target` minutes. When
/// `session_start` is given, wall-clock time spent beyond the durations of
/// the earlier phases additionally caps the active phase.
pub fn get_time_budget(
    package: &Package,
    answers: &[Answer],
    session_start: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DomainResult<TimeBudget> {
    let answered = core_count(answers);
    let active_phase = package.phase_for(answered);

    let elapsed_minutes = session_start.map(|start| {
        let elapsed = now.signed_duration_since(start).num_seconds().max(0);
        elapsed as f64 / 60.0
    });

    let mut phases = [PhaseBudget {
        phase: PhaseId::Preliminary,
        duration_minutes: 0,
        remaining_minutes: 0.0,
    }; 3];

    for phase in PhaseId::ALL {
        let config = package.phase(phase)?;
        let start = package.phase_start(phase);
        let in_phase = answered.saturating_sub(start).min(config.target_questions);
        let duration = f64::from(config.duration_minutes);

        let mut remaining = f64::from(in_phase).mul_add(-config.minutes_per_question(), duration);

        if phase == active_phase {
            if let Some(elapsed) = elapsed_minutes {
                let earlier: u32 = PhaseId::ALL
                    .iter()
                    .take(phase.index())
                    .filter_map(|p| package.phase(*p).ok())
                    .map(|p| p.duration_minutes)
                    .sum();
                let consumed = (elapsed - f64::from(earlier)).max(0.0);
                remaining = remaining.min(duration - consumed);
            }
        }

        phases[phase.index()] = PhaseBudget {
            phase,
            duration_minutes: config.duration_minutes,
            remaining_minutes: remaining.max(0.0),
        };
    }

    Ok(TimeBudget {
        active_phase,
        phases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn answers(n: usize) -> Vec<Answer> {
        (0..n)
            .map(|i| Answer::new(format!("q{i}"), format!("Question {i}"), "réponse", "parcours"))
            .collect()
    }

    #[test]
    fn test_fresh_session_has_full_budget() {
        let package = Package::by_id("essentiel").unwrap();
        let budget = get_time_budget(&package, &[], None, Utc::now()).unwrap();
        assert_eq!(budget.active_phase, PhaseId::Preliminary);
        assert!((budget.phase1_remaining() - 180.0).abs() < 1e-9);
        assert!((budget.phase2_remaining() - 360.0).abs() < 1e-9);
        assert!((budget.total_remaining() - 720.0).abs() < 1e-9);
    }

    #[test]
    fn test_answers_consume_active_phase() {
        let package = Package::by_id("essentiel").unwrap();
        // 18 minutes per question in phase 1 (180 / 10)
        let budget = get_time_budget(&package, &answers(4), None, Utc::now()).unwrap();
        assert!((budget.phase1_remaining() - 108.0).abs() < 1e-9);
        assert!((budget.phase2_remaining() - 360.0).abs() < 1e-9);
    }

    #[test]
    fn test_finished_phases_are_zero() {
        let package = Package::by_id("essentiel").unwrap();
        let budget = get_time_budget(&package, &answers(12), None, Utc::now()).unwrap();
        assert_eq!(budget.active_phase, PhaseId::Investigation);
        assert!(budget.phase1_remaining().abs() < 1e-9);
        assert!((budget.phase2_remaining() - 324.0).abs() < 1e-9);
    }

    #[test]
    fn test_module_answers_do_not_consume_budget() {
        let package = Package::by_id("essentiel").unwrap();
        let mut seq = answers(2);
        seq.push(Answer::new("m", "M", "r", "reconversion").in_module("reconversion"));
        let budget = get_time_budget(&package, &seq, None, Utc::now()).unwrap();
        assert!((budget.phase1_remaining() - 144.0).abs() < 1e-9);
    }

    #[test]
    fn test_wall_clock_caps_active_phase() {
        let package = Package::by_id("essentiel").unwrap();
        let now = Utc::now();
        let start = now - Duration::minutes(150);
        let budget = get_time_budget(&package, &answers(1), Some(start), now).unwrap();
        // count-based would leave 162, wall clock leaves 30
        assert!((budget.phase1_remaining() - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_remaining_never_negative() {
        let package = Package::by_id("essentiel").unwrap();
        let now = Utc::now();
        let start = now - Duration::days(30);
        let budget = get_time_budget(&package, &answers(45), Some(start), now).unwrap();
        for phase in budget.phases {
            assert!(phase.remaining_minutes >= 0.0);
        }
        assert!(budget.phase3_remaining().abs() < 1e-9);
    }

    #[test]
    fn test_missing_start_falls_back_to_counts() {
        let package = Package::by_id("premium").unwrap();
        let with_none = get_time_budget(&package, &answers(5), None, Utc::now()).unwrap();
        assert!((with_none.phase1_remaining() - 225.0).abs() < 1e-9);
    }
}
