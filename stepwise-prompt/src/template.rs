use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use stepwise_core::{CompletionModel, StepwiseError, ToolDescriptor, Trajectory};

use crate::ReActPrompt;

/// Default text renderer for the ReAct protocol.
///
/// Builds a single completion prompt: tool descriptions, worked exemplar
/// traces, then the current trajectory, each rendered as
/// `[Question]` / `[Thought]` / `[Act]` / `[Observe]` / `[Finish]` lines.
/// When a stop prefix is configured it is spliced into the `[Question]` and
/// `[Observe]` markers so the matching stop sequences fire on them.
pub struct TextPrompt {
    model: Arc<dyn CompletionModel>,
}

impl TextPrompt {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    fn render(
        &self,
        force_finish: bool,
        exemplars: &[Trajectory],
        state: &Trajectory,
        stop_prefix: &str,
        tools: &[ToolDescriptor],
    ) -> String {
        let mut out = String::new();
        out.push_str("Here is a list of available tools:\n");
        for tool in tools {
            out.push('\n');
            let _ = writeln!(out, "Tool name: {}", tool.name);
            let _ = writeln!(out, "Tool description: {}", tool.description);
            if let Some(example) = &tool.example {
                let _ = writeln!(out, "Tool example: {example}");
            }
        }
        out.push('\n');
        out.push_str("Here are examples of how different tasks can be solved with these tools:\n");
        for exemplar in exemplars {
            render_trajectory(&mut out, exemplar, stop_prefix);
        }
        out.push('\n');
        render_trajectory(&mut out, state, stop_prefix);
        if force_finish {
            out.push_str("[Finish]: ");
        }
        out
    }
}

fn render_trajectory(out: &mut String, trajectory: &Trajectory, stop_prefix: &str) {
    let _ = writeln!(out, "[{}Question]: {}", stop_prefix, trajectory.inputs());
    for step in trajectory.updates() {
        if !step.thought.is_empty() {
            let _ = writeln!(out, "[Thought]: {}", step.thought);
        }
        if let Some(action) = step.render_action() {
            let _ = writeln!(out, "[Act]: {action}");
        }
        if let Some(observation) = step.render_observation() {
            if step.is_finished && step.action.is_none() {
                // A finish step's observation is the final answer.
                let _ = writeln!(out, "[Finish]: {observation}");
            } else {
                // Tool results, and recovered parse errors echoed back so
                // the model can self-correct.
                let _ = writeln!(out, "[{stop_prefix}Observe]: {observation}");
            }
        }
    }
}

#[async_trait]
impl ReActPrompt for TextPrompt {
    async fn reply(
        &self,
        force_finish: bool,
        exemplars: &[Trajectory],
        state: &Trajectory,
        stop_prefix: &str,
        stop_sequences: &[String],
        tools: &[ToolDescriptor],
    ) -> Result<String, StepwiseError> {
        let prompt = self.render(force_finish, exemplars, state, stop_prefix, tools);
        self.model.complete(&prompt, stop_sequences).await
    }
}
