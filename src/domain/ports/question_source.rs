use anyhow::Result;
use async_trait::async_trait;

use crate::domain::models::{Answer, Question, QuestionRequest, UserProfile};

/// Port for question generation
///
/// Implementations usually call a generative model. Retrying the same
/// request may legitimately yield a different question; retries exist
/// for failure recovery, not determinism.
///
/// # Examples
///
/// ```no_run
/// use bilan_engine::domain::ports::QuestionSource;
/// use bilan_engine::domain::models::{QuestionRequest, UserProfile};
/// use anyhow::Result;
///
/// async fn example(source: &dyn QuestionSource, request: &QuestionRequest) -> Result<()> {
///     let question = source
///         .generate_question(request, &[], &UserProfile::new("Camille"))
///         .await?;
///     println!("{}", question.title);
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Generate the question for one slot
    ///
    /// # Arguments
    ///
    /// * `request` - Phase key, category (id and index), complexity tier and
    ///   optional module scope chosen by the engine
    /// * `answers` - Full answer sequence so far (used to avoid repetition)
    /// * `profile` - User name and coaching style
    async fn generate_question(
        &self,
        request: &QuestionRequest,
        answers: &[Answer],
        profile: &UserProfile,
    ) -> Result<Question>;
}
