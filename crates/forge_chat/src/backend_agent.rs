//! Agent attached to a real chat completion backend.

use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use forge_agents::{Role, RoleConfig, Tool, ToolArgs};
use futures::StreamExt;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::agent::{validate_message, ChunkStream, ConversationalAgent, ThreadSlot};
use crate::error::ChatResult;
use crate::llm::{BackendEvent, ChatBackend, ChatRequest};
use crate::types::{ChatMessage, ToolCall};

/// Tool-call rounds allowed per user message.
pub const MAX_TOOL_ROUNDS: usize = 5;

/// Conversational agent that streams from a [`ChatBackend`] and runs the
/// tools the backend asks for.
pub struct BackendAgent {
    config: RoleConfig,
    instructions: Arc<str>,
    backend: Arc<dyn ChatBackend>,
    tools: Arc<Vec<Arc<dyn Tool>>>,
    thread: ThreadSlot,
    max_tool_rounds: usize,
}

impl BackendAgent {
    /// `tools` must already be this agent's own instances, in role order.
    pub fn new(
        config: RoleConfig,
        instructions: impl Into<String>,
        backend: Arc<dyn ChatBackend>,
        tools: Vec<Arc<dyn Tool>>,
    ) -> Self {
        Self {
            config,
            instructions: Arc::from(instructions.into()),
            backend,
            tools: Arc::new(tools),
            thread: ThreadSlot::default(),
            max_tool_rounds: MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tool_rounds(mut self, rounds: usize) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    pub fn config(&self) -> &RoleConfig {
        &self.config
    }
}

#[async_trait]
impl ConversationalAgent for BackendAgent {
    fn role(&self) -> Role {
        self.config.role
    }

    fn available_tools(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    fn send_message(&self, text: &str) -> ChatResult<ChunkStream> {
        validate_message(text)?;

        let text = text.to_string();
        let role = self.config.role;
        let slot = self.thread.clone();
        let backend = self.backend.clone();
        let tools = self.tools.clone();
        let instructions = self.instructions.clone();
        let max_rounds = self.max_tool_rounds;

        let chunks = stream! {
            let mut guard = slot.acquire().await;
            let thread = guard.get_or_insert_with(Default::default);
            let specs: Vec<_> = tools.iter().map(|t| t.spec()).collect();
            let mut turn = vec![ChatMessage::user(text)];
            debug!(role = %role, thread_id = %thread.id, "Sending message");

            for round in 0..=max_rounds {
                let request = ChatRequest {
                    instructions: instructions.to_string(),
                    messages: thread.messages.iter().chain(turn.iter()).cloned().collect(),
                    tools: specs.clone(),
                };

                let mut events = match backend.stream_chat(request).await {
                    Ok(events) => events,
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                };

                let mut reply = String::new();
                let mut calls: Vec<ToolCall> = Vec::new();
                while let Some(event) = events.next().await {
                    match event {
                        Ok(BackendEvent::Delta(Some(fragment))) if !fragment.is_empty() => {
                            reply.push_str(&fragment);
                            yield Ok(fragment);
                        }
                        Ok(BackendEvent::Delta(_)) => {}
                        Ok(BackendEvent::ToolCalls(requested)) => calls.extend(requested),
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    }
                }

                turn.push(ChatMessage::assistant(reply, calls.clone()));
                if calls.is_empty() {
                    break;
                }

                let exhausted = round == max_rounds;
                for call in &calls {
                    let result = if exhausted {
                        json!({ "status": "error", "error": "Tool call limit reached for this message" })
                    } else {
                        run_tool(&tools, call).await
                    };
                    turn.push(ChatMessage::tool(call.id.clone(), result.to_string()));
                }
                if exhausted {
                    warn!(role = %role, rounds = max_rounds, "Tool round limit reached");
                    break;
                }
            }

            thread.messages.extend(turn);
        };

        Ok(Box::pin(chunks))
    }

    async fn reset(&self) {
        self.thread.clear().await;
        info!(role = %self.config.role, "Conversation reset");
    }

    fn set_project_context(&self, project_id: Option<String>) {
        for tool in self.tools.iter() {
            if let Some(aware) = tool.context_aware() {
                aware.set_project_context(project_id.clone());
            }
        }
        debug!(role = %self.config.role, project_id = ?project_id, "Project context set");
    }

    async fn has_thread(&self) -> bool {
        self.thread.is_active().await
    }
}

/// Execute one requested call. Failures become error payloads for the model.
async fn run_tool(tools: &[Arc<dyn Tool>], call: &ToolCall) -> serde_json::Value {
    let Some(tool) = tools.iter().find(|t| t.name() == call.name) else {
        warn!(tool = %call.name, "Backend requested an unbound tool");
        return json!({ "status": "error", "error": format!("Unknown tool: {}", call.name) });
    };

    let outcome = match ToolArgs::from_json(&call.name, &call.arguments) {
        Ok(args) => tool.execute(args).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            debug!(tool = %call.name, "Tool call succeeded");
            result
        }
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool call failed");
            json!({ "status": "error", "error": e.to_string() })
        }
    }
}
