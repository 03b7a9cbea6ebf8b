//! Out-of-scope answer guard.

use crate::domain::models::{EngineConfig, OutOfScopeAnalysis, Severity, SuggestedAction};

/// What to do with a classified answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeVerdict {
    /// Record the answer and continue
    Accept,
    /// Drop the answer and re-ask the same category
    Redirect,
    /// Drop the answer and suspend in a blocking modal
    Block { critical: bool },
}

impl ScopeVerdict {
    /// Whether the answer must not be appended.
    pub const fn discards_answer(self) -> bool {
        !matches!(self, Self::Accept)
    }
}

/// Whether the scope classifier runs for the next answer.
///
/// Active during the first answers of a session and, once any warning
/// has been issued, for the rest of it.
pub const fn is_vigilant(core_answers: u32, warning_count: u32, config: &EngineConfig) -> bool {
    core_answers < config.scope_vigilance_answers || warning_count > 0
}

pub fn verdict(analysis: &OutOfScopeAnalysis) -> ScopeVerdict {
    if analysis.is_in_scope || analysis.severity == Severity::Low {
        return ScopeVerdict::Accept;
    }
    let critical = analysis.severity == Severity::Critical;
    if critical || analysis.suggested_action == SuggestedAction::Stop {
        ScopeVerdict::Block { critical }
    } else {
        ScopeVerdict::Redirect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_scope_and_low_are_accepted() {
        assert_eq!(verdict(&OutOfScopeAnalysis::in_scope()), ScopeVerdict::Accept);
        let low = OutOfScopeAnalysis::out_of_scope(Severity::Low, SuggestedAction::Continue, "hm");
        assert_eq!(verdict(&low), ScopeVerdict::Accept);
        assert!(!verdict(&low).discards_answer());
    }

    #[test]
    fn test_medium_and_high_redirect() {
        for severity in [Severity::Medium, Severity::High] {
            let analysis = OutOfScopeAnalysis::out_of_scope(
                severity,
                SuggestedAction::DiscardAndReprompt,
                "Revenons à votre parcours.",
            );
            assert_eq!(verdict(&analysis), ScopeVerdict::Redirect);
        }
    }

    #[test]
    fn test_critical_blocks() {
        let analysis = OutOfScopeAnalysis::out_of_scope(
            Severity::Critical,
            SuggestedAction::Continue,
            "stop",
        );
        assert_eq!(verdict(&analysis), ScopeVerdict::Block { critical: true });
        assert!(verdict(&analysis).discards_answer());
    }

    #[test]
    fn test_stop_action_blocks_without_critical() {
        let analysis =
            OutOfScopeAnalysis::out_of_scope(Severity::Medium, SuggestedAction::Stop, "stop");
        assert_eq!(verdict(&analysis), ScopeVerdict::Block { critical: false });
    }

    #[test]
    fn test_vigilance_window() {
        let config = EngineConfig::default();
        assert!(is_vigilant(0, 0, &config));
        assert!(is_vigilant(4, 0, &config));
        assert!(!is_vigilant(5, 0, &config));
        assert!(is_vigilant(25, 1, &config));
    }
}
