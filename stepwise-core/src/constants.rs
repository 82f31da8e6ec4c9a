//! Marker literals shared between the prompt renderer, the reply parser and
//! the step-loop controller. Keeping them in one place avoids silent drift
//! between the text that gets rendered and the text that gets matched.

/// Reserved call name by which the model declares voluntary completion.
pub const FINISH_TOOL: &str = "Finish";

/// Prefix tagging observations that carry a recovered parse error.
pub const ERROR_MARKER: &str = "#ERROR#";

/// Start of the next human turn; default stop sequence.
pub const QUESTION_MARKER: &str = "[Question]";

/// Start of an observation turn; default stop sequence.
pub const OBSERVE_MARKER: &str = "[Observe]";

/// Default pattern matching the beginning of a thought line.
pub const THOUGHT_PATTERN: &str = r"\[Thought\]:";

/// Default pattern matching the beginning of an action line.
pub const ACT_PATTERN: &str = r"\[Act\]:";

/// Default pattern matching the beginning of a finish line.
pub const FINISH_PATTERN: &str = r"\[Finish\]:";
