use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use stepwise_core::{FunctionCall, Tool, ToolDescriptor, ToolError, Value, FINISH_TOOL};
use thiserror::Error;

/// Tool-execution collaborator, acquired with scoped start/stop around each
/// trajectory run.
///
/// Tool failures are the environment's policy to shape; the step-loop does
/// not catch them and propagates whatever `run_tool` returns.
#[async_trait]
pub trait Environment: Send + Sync {
    fn tools(&self) -> &[ToolDescriptor];

    async fn run_tool(&self, call: &FunctionCall) -> Result<Value, ToolError>;

    async fn start(&mut self) -> Result<(), ToolError> {
        Ok(())
    }

    async fn stop(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryBuildError {
    #[error("tool name must not be empty or whitespace: {name:?}")]
    InvalidName { name: String },
    #[error("duplicate tool name: {name}")]
    DuplicateName { name: String },
    #[error("'{name}' is reserved for declaring completion")]
    ReservedName { name: String },
}

/// In-process environment dispatching calls to registered tools by name.
pub struct RegistryEnvironment {
    descriptors: Vec<ToolDescriptor>,
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for RegistryEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryEnvironment")
            .field("descriptors", &self.descriptors)
            .field("tools_len", &self.tools.len())
            .finish()
    }
}

impl RegistryEnvironment {
    pub fn builder() -> RegistryEnvironmentBuilder {
        RegistryEnvironmentBuilder { tools: Vec::new() }
    }
}

#[derive(Default)]
pub struct RegistryEnvironmentBuilder {
    tools: Vec<Arc<dyn Tool>>,
}

impl RegistryEnvironmentBuilder {
    pub fn register(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn build(self) -> Result<RegistryEnvironment, RegistryBuildError> {
        let mut descriptors = Vec::new();
        let mut tools = BTreeMap::new();
        for tool in self.tools {
            let name = tool.name().to_string();
            if name.trim().is_empty() {
                return Err(RegistryBuildError::InvalidName { name });
            }
            if name == FINISH_TOOL {
                return Err(RegistryBuildError::ReservedName { name });
            }
            if tools.contains_key(&name) {
                return Err(RegistryBuildError::DuplicateName { name });
            }
            descriptors.push(ToolDescriptor {
                name: name.clone(),
                description: tool.description().to_string(),
                example: tool.example().map(str::to_string),
            });
            tools.insert(name, tool);
        }
        Ok(RegistryEnvironment { descriptors, tools })
    }
}

#[async_trait]
impl Environment for RegistryEnvironment {
    fn tools(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    async fn run_tool(&self, call: &FunctionCall) -> Result<Value, ToolError> {
        let tool = self
            .tools
            .get(&call.name)
            .ok_or_else(|| ToolError::UnknownTool(call.name.clone()))?;
        tool.invoke(&call.args, &call.kwargs).await
    }
}
