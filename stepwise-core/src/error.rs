use thiserror::Error;

#[derive(Debug, Error)]
pub enum StepwiseError {
    #[error("model call failed: {0}")]
    Model(String),
    #[error("Parsing failed on output '{output}': {reason}")]
    ParseFailed { output: String, reason: String },
    #[error("trajectory already carries a finished step")]
    TrajectoryFinished,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Operation was cancelled")]
    Cancelled,
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}
