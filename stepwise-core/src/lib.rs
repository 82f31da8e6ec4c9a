mod call;
mod constants;
mod error;
mod llm;
mod tool;
mod trajectory;
mod value;

pub use call::{parse_call, render_call, render_response, ArgumentFormat, FunctionCall};
pub use constants::{
    ACT_PATTERN, ERROR_MARKER, FINISH_PATTERN, FINISH_TOOL, OBSERVE_MARKER, QUESTION_MARKER,
    THOUGHT_PATTERN,
};
pub use error::StepwiseError;
pub use llm::CompletionModel;
pub use tool::{Tool, ToolDescriptor, ToolError};
pub use trajectory::{Trajectory, TrajectoryStep};
pub use value::Value;
