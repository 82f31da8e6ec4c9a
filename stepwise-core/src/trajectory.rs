use serde::{Deserialize, Serialize};

use crate::call::{render_call, render_response, ArgumentFormat, FunctionCall};
use crate::{StepwiseError, Value};

/// One thought/action/observation unit of a trajectory.
///
/// A step parsed from a model reply carries its action with the observation
/// still absent; the controller fills the observation in before the step is
/// appended, never after. A finish step has no action and its observation is
/// the final answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TrajectoryStep {
    #[serde(default)]
    pub is_finished: bool,
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub action: Option<FunctionCall>,
    #[serde(default)]
    pub observation: Option<Value>,
    #[serde(default)]
    pub format: Option<ArgumentFormat>,
}

impl TrajectoryStep {
    /// A finish step carrying the final answer.
    pub fn finished(observation: Value) -> Self {
        Self {
            is_finished: true,
            observation: Some(observation),
            ..Self::default()
        }
    }

    /// The action formatted for insertion in a prompt.
    pub fn render_action(&self) -> Option<String> {
        self.action
            .as_ref()
            .map(|call| render_call(call, self.format.unwrap_or_default()))
    }

    /// The observation formatted for insertion in a prompt.
    pub fn render_observation(&self) -> Option<String> {
        self.observation
            .as_ref()
            .map(|value| render_response(self.format, value))
    }
}

/// The ordered history of steps plus the original task input for one run.
///
/// Append-only: steps are never removed or mutated once appended, and a
/// finished step is always the last one. Both invariants are enforced here
/// rather than left to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Trajectory {
    inputs: String,
    updates: Vec<TrajectoryStep>,
}

impl Trajectory {
    pub fn new(inputs: impl Into<String>) -> Self {
        Self {
            inputs: inputs.into(),
            updates: Vec::new(),
        }
    }

    /// Builds a complete trajectory, e.g. an exemplar trace. Fails if any
    /// step other than the last is finished.
    pub fn from_steps(
        inputs: impl Into<String>,
        steps: Vec<TrajectoryStep>,
    ) -> Result<Self, StepwiseError> {
        let mut trajectory = Self::new(inputs);
        for step in steps {
            trajectory.push(step)?;
        }
        Ok(trajectory)
    }

    pub fn inputs(&self) -> &str {
        &self.inputs
    }

    pub fn updates(&self) -> &[TrajectoryStep] {
        &self.updates
    }

    pub fn last(&self) -> Option<&TrajectoryStep> {
        self.updates.last()
    }

    /// True once the last appended step declared completion.
    pub fn is_finished(&self) -> bool {
        self.updates.last().is_some_and(|step| step.is_finished)
    }

    /// Appends the next step; rejected once the trajectory is finished.
    pub fn push(&mut self, step: TrajectoryStep) -> Result<(), StepwiseError> {
        if self.is_finished() {
            return Err(StepwiseError::TrajectoryFinished);
        }
        self.updates.push(step);
        Ok(())
    }
}
