//! Category selection within the active phase.
//!
//! Precedence, first match wins:
//! 1. first category still below its minimum
//! 2. first category the deepening heuristic allows (min reached, below max)
//! 3. first category still below its maximum
//! 4. first category of the phase (only reachable if the phase overran)

use std::collections::HashMap;

use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{core_answers, Answer, Category, EngineConfig, PhaseConfig, PhaseId};

use super::time_budget::PhaseBudget;

/// Chosen category and its position in the phase's list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySelection {
    pub category_id: String,
    /// Question sources are indexed, not keyed
    pub index: usize,
}

/// Count core answers per category id.
pub fn category_progress(answers: &[Answer]) -> HashMap<String, u32> {
    let mut progress = HashMap::new();
    for answer in core_answers(answers) {
        *progress.entry(answer.category_id.clone()).or_insert(0) += 1;
    }
    progress
}

/// Deepening heuristic for a category whose minimum is met.
///
/// Deepen only while enough of the phase budget remains; the conclusion
/// phase deepens each category by a single extra question at most.
pub fn should_deepen_category(
    category: &Category,
    phase: PhaseId,
    asked_in_category: u32,
    phase_budget: &PhaseBudget,
    config: &EngineConfig,
) -> bool {
    if asked_in_category >= category.max_questions {
        return false;
    }
    if phase_budget.remaining_ratio() < config.deepen_min_remaining_ratio {
        return false;
    }
    if phase == PhaseId::Conclusion {
        return asked_in_category <= category.min_questions;
    }
    true
}

/// Select the next category to explore in `phase`.
pub fn select_category(
    phase: &PhaseConfig,
    progress: &HashMap<String, u32>,
    phase_budget: &PhaseBudget,
    config: &EngineConfig,
) -> DomainResult<CategorySelection> {
    let asked = |c: &Category| progress.get(&c.id).copied().unwrap_or(0);
    let pick = |index: usize, c: &Category, rule: &str| {
        debug!(phase = %phase.phase, category = %c.id, index, rule, "category selected");
        CategorySelection {
            category_id: c.id.clone(),
            index,
        }
    };

    if let Some((i, c)) = phase
        .categories
        .iter()
        .enumerate()
        .find(|&(_, c)| asked(c) < c.min_questions)
    {
        return Ok(pick(i, c, "below_min"));
    }

    if let Some((i, c)) = phase.categories.iter().enumerate().find(|&(_, c)| {
        let n = asked(c);
        n < c.max_questions && should_deepen_category(c, phase.phase, n, phase_budget, config)
    }) {
        return Ok(pick(i, c, "deepen"));
    }

    if let Some((i, c)) = phase
        .categories
        .iter()
        .enumerate()
        .find(|&(_, c)| asked(c) < c.max_questions)
    {
        return Ok(pick(i, c, "below_max"));
    }

    let first = phase.category_at(0)?;
    Ok(pick(0, first, "fallback"))
}
