use regex::Regex;
use stepwise_core::{
    parse_call, StepwiseError, TrajectoryStep, Value, ACT_PATTERN, ERROR_MARKER, FINISH_PATTERN,
    FINISH_TOOL, THOUGHT_PATTERN,
};
use tracing::warn;

/// Turns one raw model reply into the step it describes.
///
/// Implementations never fail: replies that cannot be interpreted come back
/// as a non-finished step whose observation carries the error, so the loop
/// can surface it to the model on the next turn.
pub trait ParseReply: Send + Sync {
    fn parse(&self, reply: &str) -> TrajectoryStep;
}

/// Marker-based reply parser.
///
/// Finds the first occurrence of the thought, action and finish markers and
/// interprets whichever of action/finish comes first; an absent marker sorts
/// after every real match. The thought is only taken when its marker
/// strictly precedes the chosen branch's marker.
pub struct MarkerParser {
    action: Regex,
    thought: Regex,
    finish: Regex,
    final_stop_sequence: Option<String>,
}

impl MarkerParser {
    pub fn new() -> Self {
        Self::with_patterns(ACT_PATTERN, THOUGHT_PATTERN, FINISH_PATTERN)
            .expect("default marker patterns compile")
    }

    pub fn with_patterns(
        action_pattern: &str,
        thought_pattern: &str,
        finish_pattern: &str,
    ) -> Result<Self, StepwiseError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| StepwiseError::InvalidConfig(e.to_string()))
        };
        Ok(Self {
            action: compile(action_pattern)?,
            thought: compile(thought_pattern)?,
            finish: compile(finish_pattern)?,
            final_stop_sequence: Some("\n\n".to_string()),
        })
    }

    /// Additional stop sequence at which the final answer is truncated
    /// after the finish marker. `None` disables truncation.
    pub fn final_stop_sequence(mut self, stop: Option<String>) -> Self {
        self.final_stop_sequence = stop;
        self
    }

    fn try_parse(&self, reply: &str) -> Result<TrajectoryStep, StepwiseError> {
        // First-match spans, with "absent" sorting after every real match.
        let span = |re: &Regex| {
            re.find(reply)
                .map_or((reply.len(), reply.len()), |m| (m.start(), m.end()))
        };
        let (act_start, act_end) = span(&self.action);
        let (thought_start, thought_end) = span(&self.thought);
        let (finish_start, finish_end) = span(&self.finish);

        if act_start < finish_start {
            // A custom thought pattern may match past the action marker;
            // such an overlapping thought is treated as absent.
            let thought = if thought_start < act_start && thought_end <= act_start {
                reply[thought_end..act_start].trim().to_string()
            } else {
                String::new()
            };
            let (call, format) = parse_call(reply[act_end..].trim())?;
            Ok(TrajectoryStep {
                is_finished: call.name == FINISH_TOOL,
                thought,
                action: Some(call),
                observation: None,
                format: Some(format),
            })
        } else if finish_start < act_start {
            let thought = if thought_start < finish_start && thought_end <= finish_start {
                reply[thought_end..finish_start].trim().to_string()
            } else {
                String::new()
            };
            let mut answer = reply[finish_end..].trim();
            if let Some(stop) = &self.final_stop_sequence {
                if let Some(at) = answer.find(stop.as_str()) {
                    answer = answer[..at].trim();
                }
            }
            Ok(TrajectoryStep {
                is_finished: true,
                thought,
                action: None,
                observation: Some(Value::String(answer.to_string())),
                format: None,
            })
        } else {
            Err(StepwiseError::ParseFailed {
                output: reply.to_string(),
                reason: format!(
                    "found neither {} nor {}",
                    self.action.as_str(),
                    self.finish.as_str()
                ),
            })
        }
    }
}

impl Default for MarkerParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseReply for MarkerParser {
    fn parse(&self, reply: &str) -> TrajectoryStep {
        self.try_parse(reply).unwrap_or_else(|e| {
            warn!(error = %e, "reply did not parse, recovering");
            TrajectoryStep {
                observation: Some(Value::String(format!("{ERROR_MARKER}: {e}"))),
                ..TrajectoryStep::default()
            }
        })
    }
}
