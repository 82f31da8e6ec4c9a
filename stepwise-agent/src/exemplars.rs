use stepwise_core::{
    ArgumentFormat, FunctionCall, Trajectory, TrajectoryStep, Value, FINISH_TOOL,
};

/// Two worked trajectories demonstrating the expected reply format: one
/// multi-lookup arithmetic task, one mixing the call-expression and
/// JSON-object argument forms.
///
/// Returns a fresh collection per call; exemplar traces are never shared
/// between agent instances.
pub fn default_exemplars() -> Vec<Trajectory> {
    vec![height_difference(), reversed_name()]
}

fn height_difference() -> Trajectory {
    Trajectory::from_steps(
        "How much taller is Everest than K2?",
        vec![
            TrajectoryStep {
                thought: "First we need to find out how tall Everest and K2 are. We can use \
                          the Search tool for that."
                    .to_string(),
                action: Some(FunctionCall::new("Search").arg("how tall is Everest?")),
                observation: Some(Value::String("8,849 m".to_string())),
                format: Some(ArgumentFormat::Python),
                ..TrajectoryStep::default()
            },
            TrajectoryStep {
                action: Some(FunctionCall::new("Search").arg("how tall is K2?")),
                observation: Some(Value::String("8,611 m".to_string())),
                format: Some(ArgumentFormat::Python),
                ..TrajectoryStep::default()
            },
            TrajectoryStep {
                thought: "Now we need to subtract their heights. We can use the Calculator \
                          tool for that."
                    .to_string(),
                action: Some(FunctionCall::new("Calculator").arg("8849 - 8611")),
                observation: Some(Value::String("238".to_string())),
                format: Some(ArgumentFormat::Python),
                ..TrajectoryStep::default()
            },
            TrajectoryStep {
                is_finished: true,
                thought: "Everest is 238 meters taller than K2.".to_string(),
                action: Some(FunctionCall::new(FINISH_TOOL).arg("238 meters")),
                observation: Some(Value::String("238 meters".to_string())),
                format: Some(ArgumentFormat::Python),
            },
        ],
    )
    .expect("exemplar trace is well-formed")
}

fn reversed_name() -> Trajectory {
    Trajectory::from_steps(
        "Spell the name of the scientist who invented relativity backwards.",
        vec![
            TrajectoryStep {
                thought: "First we need to find out who invented relativity. We can use the \
                          Search tool for that."
                    .to_string(),
                action: Some(FunctionCall::new("Search").arg("who invented relativity?")),
                observation: Some(Value::String("Albert Einstein".to_string())),
                format: Some(ArgumentFormat::Python),
                ..TrajectoryStep::default()
            },
            TrajectoryStep {
                thought: "Now we can use the Reverse tool to spell the retrieved name \
                          backwards."
                    .to_string(),
                action: Some(FunctionCall::new("Reverse").kwarg("text", "Albert Einstein")),
                observation: Some(Value::String("nietsniE treblA".to_string())),
                format: Some(ArgumentFormat::Json),
                ..TrajectoryStep::default()
            },
            TrajectoryStep {
                is_finished: true,
                thought: "Albert Einstein invented relativity and his name backwards is \
                          nietsniE treblA."
                    .to_string(),
                action: Some(FunctionCall::new(FINISH_TOOL).arg("nietsniE treblA")),
                observation: Some(Value::String("nietsniE treblA".to_string())),
                format: Some(ArgumentFormat::Python),
            },
        ],
    )
    .expect("exemplar trace is well-formed")
}
