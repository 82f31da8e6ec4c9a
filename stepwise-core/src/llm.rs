use async_trait::async_trait;

use crate::StepwiseError;

/// Text-completion seam behind the prompt renderer.
///
/// The model truncates its reply at the first occurrence of any of the
/// given stop sequences; the stop sequence itself is not included.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        stop_sequences: &[String],
    ) -> Result<String, StepwiseError>;
}
