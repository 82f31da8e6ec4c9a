/// Observations, tool arguments and tool results are plain JSON values.
pub type Value = serde_json::Value;
