//! Forgebase chat layer.
//!
//! Conversational agents over a streaming chat completion backend:
//!
//! - [`ChatBackend`]: the backend port, with an Azure OpenAI adapter
//! - [`ConversationalAgent`]: one role's conversation, backend-attached or stub
//! - [`AgentFactory`]: one cached agent per role
//! - [`Orchestrator`]: the user-facing conversation plus specialist calls

pub mod agent;
pub mod backend_agent;
pub mod config;
pub mod error;
pub mod factory;
pub mod instructions;
pub mod llm;
pub mod mock;
pub mod orchestrator;
pub mod stub;
pub mod types;

pub use agent::{ChunkStream, ConversationalAgent};
pub use backend_agent::{BackendAgent, MAX_TOOL_ROUNDS};
pub use config::BackendSettings;
pub use error::{ChatError, ChatResult};
pub use factory::AgentFactory;
pub use instructions::InstructionLoader;
pub use llm::{AzureOpenAiBackend, BackendEvent, BackendStream, ChatBackend, ChatRequest};
pub use orchestrator::{Orchestrator, SpecialistReport};
pub use stub::{StubAgent, StubCategory};
pub use types::{ChatMessage, MessageRole, Thread, ToolCall};
