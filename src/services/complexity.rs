//! Question complexity selection.
//!
//! The phase sets a base tendency (lighter in phase 1, more reflective in
//! phase 3). Opening a category lowers it by one tier, deepening past the
//! category minimum raises it by one. The result is then capped by the
//! most demanding tier the remaining phase time can still accommodate.

use crate::domain::models::{Category, Complexity, PhaseId};

const fn phase_tendency(phase: PhaseId) -> Complexity {
    match phase {
        PhaseId::Preliminary => Complexity::Medium,
        PhaseId::Investigation => Complexity::Complex,
        PhaseId::Conclusion => Complexity::Reflective,
    }
}

/// Most demanding tier that fits in `time_remaining` minutes.
pub fn affordable_tier(time_remaining: f64) -> Complexity {
    Complexity::ALL
        .iter()
        .rev()
        .copied()
        .find(|tier| f64::from(tier.estimated_minutes()) <= time_remaining)
        .unwrap_or(Complexity::Simple)
}

/// Choose the complexity tier of the next question.
///
/// Pure and deterministic. Less time remaining never yields a more
/// demanding tier.
pub fn determine_question_complexity(
    category: &Category,
    phase: PhaseId,
    time_remaining_in_phase: f64,
    questions_asked_in_category: u32,
) -> Complexity {
    let base = phase_tendency(phase);
    let tendency = if questions_asked_in_category == 0 {
        base.lighter()
    } else if questions_asked_in_category >= category.min_questions {
        base.deeper()
    } else {
        base
    };

    tendency.min(affordable_tier(time_remaining_in_phase))
}
