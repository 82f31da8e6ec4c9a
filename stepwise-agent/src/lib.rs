mod agent;
mod environment;
mod error;
mod exemplars;
mod parse;

pub use agent::{ReActAgent, ReActAgentBuilder};
pub use environment::{
    Environment, RegistryBuildError, RegistryEnvironment, RegistryEnvironmentBuilder,
};
pub use error::AgentError;
pub use exemplars::default_exemplars;
pub use parse::{MarkerParser, ParseReply};
