//! Pure decision functions of the progression engine.
//!
//! Nothing in here performs I/O or mutates session state; the
//! application layer composes these into a step.

pub mod category_selector;
pub mod completion_gate;
pub mod complexity;
pub mod progression;
pub mod scope_guard;
pub mod time_budget;

pub use category_selector::{category_progress, select_category, should_deepen_category, CategorySelection};
pub use completion_gate::{check_completion, CompletionCheck};
pub use complexity::{affordable_tier, determine_question_complexity};
pub use progression::{calculate_progression, completed_phase_info, current_phase_info, Progression};
pub use scope_guard::{is_vigilant, ScopeVerdict};
pub use time_budget::{get_time_budget, PhaseBudget, TimeBudget};
