use stepwise_core::{StepwiseError, ToolError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("model reply failed: {0}")]
    Model(#[source] StepwiseError),
    #[error("tool call failed for '{name}': {source}")]
    Tool {
        name: String,
        #[source]
        source: ToolError,
    },
    #[error("environment failed to start: {0}")]
    Environment(#[source] ToolError),
    #[error("trajectory is already finished")]
    Finished,
    #[error("operation was cancelled")]
    Cancelled,
}
