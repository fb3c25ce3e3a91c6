//! Error types for the HTTP layer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use forge_agents::AgentError;
use forge_chat::ChatError;
use forge_core::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

/// Result type for server startup and configuration.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that stop the server from starting or running.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// An error on its way to becoming an HTTP response.
///
/// This is the only place domain errors turn into status codes.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(code, message),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, "backend_error", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &ErrorResponse {
        &self.body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.body.message, "Request failed");
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(_) => ApiError::not_found(err.to_string()),
            CoreError::AlreadyExists(_) => ApiError::conflict(err.to_string()),
            CoreError::Validation(message) => ApiError::unprocessable(message),
            CoreError::Storage(_) => ApiError::internal(err.to_string()),
        }
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::Project(core) => core.into(),
            AgentError::RoleNotFound(_) | AgentError::ToolNotFound(_) => {
                ApiError::not_found(err.to_string())
            }
            AgentError::InvalidArguments { .. } => ApiError::unprocessable(err.to_string()),
            other => ApiError::internal(other.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(message) => ApiError::unprocessable(message),
            ChatError::UnknownRole(_) => ApiError::not_found(err.to_string()),
            ChatError::Backend(_) => ApiError::bad_gateway(err.to_string()),
            ChatError::Agent(agent) => agent.into(),
            other => ApiError::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let cases = [
            (CoreError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (CoreError::AlreadyExists("x".into()), StatusCode::CONFLICT),
            (CoreError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (CoreError::Storage("disk".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_chat_error_mapping() {
        assert_eq!(
            ApiError::from(ChatError::validation("empty")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::from(ChatError::UnknownRole("janitor".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ChatError::backend("down")).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(ChatError::Configuration("bad wiring".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = ApiError::from(CoreError::validation("Project name cannot be empty"));
        assert_eq!(err.body().message, "Project name cannot be empty");
        assert_eq!(err.body().code, "validation_error");
    }
}
