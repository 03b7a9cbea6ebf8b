use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{Answer, InterimSynthesis, Package, Summary, UserProfile};

/// Port for recaps and the final report
#[async_trait]
pub trait SynthesisSource: Send + Sync {
    /// Recap of recent answers with a confirmation request.
    async fn generate_synthesis(
        &self,
        recent_answers: &[Answer],
        profile: &UserProfile,
    ) -> Result<InterimSynthesis>;

    /// Final structured summary of the whole bilan.
    async fn generate_summary(
        &self,
        answers: &[Answer],
        package: &Package,
        profile: &UserProfile,
    ) -> Result<Summary>;
}
