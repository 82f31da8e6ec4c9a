mod template;

use async_trait::async_trait;
use stepwise_core::{StepwiseError, ToolDescriptor, Trajectory};

pub use template::TextPrompt;

/// Renders the request for one step and returns the model's raw reply text.
///
/// Implementations are injected into the step-loop by composition; the
/// default is [`TextPrompt`]. Must be deterministic given identical inputs,
/// up to the model's own nondeterminism.
#[async_trait]
pub trait ReActPrompt: Send + Sync {
    async fn reply(
        &self,
        force_finish: bool,
        exemplars: &[Trajectory],
        state: &Trajectory,
        stop_prefix: &str,
        stop_sequences: &[String],
        tools: &[ToolDescriptor],
    ) -> Result<String, StepwiseError>;
}
