use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use stepwise_core::{
    CompletionModel, FunctionCall, StepwiseError, ToolDescriptor, Trajectory, TrajectoryStep,
    Value,
};
use stepwise_prompt::{ReActPrompt, TextPrompt};

/// Model stub recording the rendered prompt and the stop sequences it was
/// asked to honor.
#[derive(Default)]
struct RecordingModel {
    prompt: Mutex<Option<String>>,
    stop_sequences: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionModel for RecordingModel {
    async fn complete(
        &self,
        prompt: &str,
        stop_sequences: &[String],
    ) -> Result<String, StepwiseError> {
        *self.prompt.lock().unwrap() = Some(prompt.to_string());
        *self.stop_sequences.lock().unwrap() = stop_sequences.to_vec();
        Ok("[Finish]: stub".to_string())
    }
}

fn search_tool() -> ToolDescriptor {
    ToolDescriptor {
        name: "Search".to_string(),
        description: "Searches the web.".to_string(),
        example: Some("Search(\"how tall is Everest?\")".to_string()),
    }
}

fn bare_tool() -> ToolDescriptor {
    ToolDescriptor {
        name: "Calculator".to_string(),
        description: "Evaluates arithmetic.".to_string(),
        example: None,
    }
}

fn exemplar() -> Trajectory {
    Trajectory::from_steps(
        "How tall is Everest?",
        vec![
            TrajectoryStep {
                thought: "I should look this up.".to_string(),
                action: Some(FunctionCall::new("Search").arg("height of Everest")),
                observation: Some(json!("8,849 m")),
                ..TrajectoryStep::default()
            },
            TrajectoryStep::finished(Value::String("8,849 m".to_string())),
        ],
    )
    .unwrap()
}

async fn rendered(
    force_finish: bool,
    exemplars: &[Trajectory],
    state: &Trajectory,
    stop_prefix: &str,
    tools: &[ToolDescriptor],
) -> String {
    let model = Arc::new(RecordingModel::default());
    let prompt = TextPrompt::new(model.clone());
    prompt
        .reply(force_finish, exemplars, state, stop_prefix, &[], tools)
        .await
        .unwrap();
    let captured = model.prompt.lock().unwrap().take();
    captured.expect("model was called")
}

#[tokio::test]
async fn lists_tools_with_optional_examples() {
    let state = Trajectory::new("task");
    let text = rendered(false, &[], &state, "", &[search_tool(), bare_tool()]).await;

    assert!(text.starts_with("Here is a list of available tools:\n"));
    assert!(text.contains("Tool name: Search\n"));
    assert!(text.contains("Tool description: Searches the web.\n"));
    assert!(text.contains("Tool example: Search(\"how tall is Everest?\")\n"));
    assert!(text.contains("Tool name: Calculator\n"));
    assert!(!text.contains("Tool example: Calculator"));
}

#[tokio::test]
async fn renders_exemplars_then_current_state() {
    let state = Trajectory::new("Who invented relativity?");
    let text = rendered(false, &[exemplar()], &state, "", &[search_tool()]).await;

    assert!(text.contains(
        "Here are examples of how different tasks can be solved with these tools:\n"
    ));
    assert!(text.contains("[Question]: How tall is Everest?\n"));
    assert!(text.contains("[Thought]: I should look this up.\n"));
    assert!(text.contains("[Act]: Search(\"height of Everest\")\n"));
    assert!(text.contains("[Observe]: 8,849 m\n"));
    assert!(text.contains("[Finish]: 8,849 m\n"));

    // The live task comes after the worked examples.
    let exemplar_at = text.find("How tall is Everest?").unwrap();
    let state_at = text.find("[Question]: Who invented relativity?").unwrap();
    assert!(exemplar_at < state_at);
    assert!(text.ends_with("[Question]: Who invented relativity?\n"));
}

#[tokio::test]
async fn stop_prefix_is_spliced_into_question_and_observe_markers() {
    let state = Trajectory::new("Who invented relativity?");
    let text = rendered(false, &[exemplar()], &state, "sys", &[search_tool()]).await;

    assert!(text.contains("[sysQuestion]: How tall is Everest?\n"));
    assert!(text.contains("[sysObserve]: 8,849 m\n"));
    assert!(text.contains("[sysQuestion]: Who invented relativity?\n"));
    // Thought, Act and Finish markers are never prefixed.
    assert!(text.contains("[Thought]: I should look this up.\n"));
    assert!(text.contains("[Act]: Search(\"height of Everest\")\n"));
    assert!(text.contains("[Finish]: 8,849 m\n"));
}

#[tokio::test]
async fn force_finish_appends_an_open_finish_marker() {
    let state = Trajectory::new("task");
    let text = rendered(true, &[], &state, "", &[]).await;
    assert!(text.ends_with("[Finish]: "));
}

#[tokio::test]
async fn recovered_errors_are_echoed_as_observations() {
    let mut state = Trajectory::new("task");
    state
        .push(TrajectoryStep {
            observation: Some(Value::String(
                "#ERROR#: no thought, action, or finish found".to_string(),
            )),
            ..TrajectoryStep::default()
        })
        .unwrap();
    let text = rendered(false, &[], &state, "", &[]).await;
    assert!(text.contains("[Observe]: #ERROR#: no thought, action, or finish found\n"));
}

#[tokio::test]
async fn stop_sequences_are_forwarded_to_the_model() {
    let model = Arc::new(RecordingModel::default());
    let prompt = TextPrompt::new(model.clone());
    let state = Trajectory::new("task");
    let stops = vec!["[Question]".to_string(), "[Observe]".to_string()];
    prompt
        .reply(false, &[], &state, "", &stops, &[])
        .await
        .unwrap();
    assert_eq!(*model.stop_sequences.lock().unwrap(), stops);
}
