//! Error types for agents module.

use thiserror::Error;

/// Result type alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// Errors that can occur while configuring roles or running tools.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Tool '{0}' not found in registry")]
    ToolNotFound(String),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Unknown agent role: {0}")]
    RoleNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Tool execution failed: {tool} - {message}")]
    ToolFailed { tool: String, message: String },

    #[error("Project error: {0}")]
    Project(#[from] forge_core::CoreError),
}

impl AgentError {
    /// Create an invalid arguments error.
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a tool failure error.
    pub fn tool_failed(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ToolFailed {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
