use std::sync::Arc;

use stepwise_core::{
    render_response, StepwiseError, Trajectory, TrajectoryStep, Value, FINISH_TOOL,
    OBSERVE_MARKER, QUESTION_MARKER,
};
use stepwise_prompt::ReActPrompt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::environment::Environment;
use crate::error::AgentError;
use crate::parse::{MarkerParser, ParseReply};

/// Step-loop controller for the ReAct strategy.
///
/// Owns no trajectory itself: state is passed into [`advance`], so
/// independent trajectories (parallel samples, tree-of-thought branches)
/// can run concurrently against the same agent. Each `advance` appends
/// exactly one step; the loop is guaranteed to reach the finished state
/// within `max_steps + 1` iterations because the iteration after the
/// budget is exhausted always forces a finish.
///
/// [`advance`]: ReActAgent::advance
pub struct ReActAgent {
    prompt: Arc<dyn ReActPrompt>,
    parser: Arc<dyn ParseReply>,
    exemplars: Vec<Trajectory>,
    max_steps: usize,
    stop_prefix: String,
    cancellation: CancellationToken,
}

impl std::fmt::Debug for ReActAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReActAgent")
            .field("exemplars_len", &self.exemplars.len())
            .field("max_steps", &self.max_steps)
            .field("stop_prefix", &self.stop_prefix)
            .finish()
    }
}

pub struct ReActAgentBuilder {
    prompt: Option<Arc<dyn ReActPrompt>>,
    parser: Arc<dyn ParseReply>,
    exemplars: Vec<Trajectory>,
    max_steps: usize,
    stop_prefix: String,
    cancellation: CancellationToken,
}

impl ReActAgent {
    pub fn builder() -> ReActAgentBuilder {
        ReActAgentBuilder {
            prompt: None,
            parser: Arc::new(MarkerParser::new()),
            exemplars: Vec::new(),
            max_steps: 10,
            stop_prefix: String::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Stop sequences handed to the prompt renderer: the custom stop prefix
    /// when one is configured, otherwise the next-question and observation
    /// markers, so the model cannot role-play past its turn.
    pub fn stop_sequences(&self) -> Vec<String> {
        if self.stop_prefix.is_empty() {
            vec![QUESTION_MARKER.to_string(), OBSERVE_MARKER.to_string()]
        } else {
            vec![format!("[{}", self.stop_prefix)]
        }
    }

    pub fn initialize_state(&self, inputs: impl Into<String>) -> Trajectory {
        Trajectory::new(inputs)
    }

    pub fn is_finished(&self, state: &Trajectory) -> bool {
        state.is_finished()
    }

    /// The final answer, or `None` while the trajectory is still running
    /// (and for a finished step that carries no observation).
    pub fn extract_output(&self, state: &Trajectory) -> Option<String> {
        if !state.is_finished() {
            return None;
        }
        state
            .last()
            .and_then(|step| step.observation.as_ref())
            .map(|value| render_response(None, value))
    }

    /// Performs one iteration: prompt the model, parse or force-finish,
    /// execute any tool call, and append the resulting step.
    pub async fn advance<E>(
        &self,
        state: &mut Trajectory,
        environment: &E,
    ) -> Result<(), AgentError>
    where
        E: Environment + ?Sized,
    {
        if state.is_finished() {
            return Err(AgentError::Finished);
        }
        if self.cancellation.is_cancelled() {
            return Err(AgentError::Cancelled);
        }

        let force_finish = state.updates().len() >= self.max_steps;
        let stop_sequences = self.stop_sequences();
        let prompt_call = self.prompt.reply(
            force_finish,
            &self.exemplars,
            state,
            &self.stop_prefix,
            &stop_sequences,
            environment.tools(),
        );
        let reply = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => return Err(AgentError::Cancelled),
            reply = prompt_call => reply.map_err(AgentError::Model)?,
        };
        let reply = format!("{}\n", reply.trim());

        let step = if force_finish {
            // Past the budget the reply is taken verbatim as the final
            // answer, well-formed or not.
            warn!(steps = state.updates().len(), "step budget exhausted, forcing finish");
            TrajectoryStep::finished(Value::String(reply.trim().to_string()))
        } else {
            let mut step = self.parser.parse(&reply);
            if let Some(call) = step.action.clone() {
                let observation = if call.name == FINISH_TOOL {
                    // Voluntary completion: the argument is the answer,
                    // no tool dispatch involved.
                    call.args.first().cloned().unwrap_or(Value::Null)
                } else {
                    debug!(tool = %call.name, "dispatching tool call");
                    let dispatch = environment.run_tool(&call);
                    let result = tokio::select! {
                        biased;
                        _ = self.cancellation.cancelled() => return Err(AgentError::Cancelled),
                        result = dispatch => result,
                    };
                    result.map_err(|source| AgentError::Tool {
                        name: call.name.clone(),
                        source,
                    })?
                };
                step.observation = Some(observation);
            }
            step
        };

        debug!(
            step = state.updates().len(),
            is_finished = step.is_finished,
            has_action = step.action.is_some(),
            "appending step"
        );
        state.push(step).map_err(|_| AgentError::Finished)
    }

    /// Runs a whole trajectory for `inputs`, bracketed by environment
    /// start/stop. The environment is released on every exit path,
    /// including tool failures and cancellation.
    pub async fn run<E>(
        &self,
        inputs: &str,
        environment: &mut E,
    ) -> Result<Option<String>, AgentError>
    where
        E: Environment + ?Sized,
    {
        environment.start().await.map_err(AgentError::Environment)?;
        let outcome = self.drive(inputs, environment).await;
        environment.stop().await;
        outcome
    }

    async fn drive<E>(&self, inputs: &str, environment: &E) -> Result<Option<String>, AgentError>
    where
        E: Environment + ?Sized,
    {
        let mut state = self.initialize_state(inputs);
        while !self.is_finished(&state) {
            self.advance(&mut state, environment).await?;
        }
        Ok(self.extract_output(&state))
    }
}

impl ReActAgentBuilder {
    pub fn prompt(mut self, prompt: Arc<dyn ReActPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn parser(mut self, parser: Arc<dyn ParseReply>) -> Self {
        self.parser = parser;
        self
    }

    pub fn exemplars(mut self, exemplars: Vec<Trajectory>) -> Self {
        self.exemplars = exemplars;
        self
    }

    /// Number of steps after which the next iteration forces a finish.
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Marks positions for early stopping in the question and observation
    /// turns; empty by default.
    pub fn stop_prefix(mut self, stop_prefix: impl Into<String>) -> Self {
        self.stop_prefix = stop_prefix.into();
        self
    }

    pub fn cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn build(self) -> Result<ReActAgent, StepwiseError> {
        let prompt = self
            .prompt
            .ok_or_else(|| StepwiseError::InvalidConfig("missing prompt".to_string()))?;
        Ok(ReActAgent {
            prompt,
            parser: self.parser,
            exemplars: self.exemplars,
            max_steps: self.max_steps,
            stop_prefix: self.stop_prefix,
            cancellation: self.cancellation,
        })
    }
}
