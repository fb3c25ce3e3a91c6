//! Error types for the chat layer.

use forge_agents::AgentError;
use thiserror::Error;

/// Result type for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

/// Chat layer errors.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Startup-time wiring problem (roles, tools, settings).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request was rejected before reaching any agent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The chat completion backend failed.
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Unknown agent role: {0}")]
    UnknownRole(String),

    #[error(transparent)]
    Agent(AgentError),
}

impl ChatError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error should be fixed at startup rather than per request.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_)
                | Self::Agent(AgentError::Configuration(_))
                | Self::Agent(AgentError::ToolNotFound(_))
                | Self::Agent(AgentError::DuplicateTool(_))
        )
    }
}

impl From<AgentError> for ChatError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::RoleNotFound(role) => Self::UnknownRole(role),
            other => Self::Agent(other),
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Backend(format!("Network error: {}", err))
    }
}
