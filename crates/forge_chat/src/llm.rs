//! Chat completion backends.
//!
//! [`ChatBackend`] is the port agents talk to. [`AzureOpenAiBackend`] streams
//! from an Azure OpenAI deployment; the mock in [`crate::mock`] scripts
//! streams for tests.

use std::pin::Pin;

use async_stream::stream;
use async_trait::async_trait;
use forge_agents::ToolSpec;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::BackendSettings;
use crate::error::{ChatError, ChatResult};
use crate::types::{ChatMessage, MessageRole, ToolCall};

/// One step of a streamed backend reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// A content fragment. `None` when the chunk carried no usable text
    /// (malformed payload, role-only delta, keep-alive).
    Delta(Option<String>),
    /// The turn ended asking for these tool calls.
    ToolCalls(Vec<ToolCall>),
}

pub type BackendStream = Pin<Box<dyn Stream<Item = ChatResult<BackendEvent>> + Send>>;

/// Everything the backend needs for one completion.
#[derive(Debug, Clone, Default)]
pub struct ChatRequest {
    pub instructions: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolSpec>,
}

/// Streaming chat completion capability.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Start a streamed completion. Errors before the first byte are returned
    /// directly; errors mid-stream arrive as `Err` items.
    async fn stream_chat(&self, request: ChatRequest) -> ChatResult<BackendStream>;
}

/// Azure OpenAI chat completions over SSE.
pub struct AzureOpenAiBackend {
    settings: BackendSettings,
    client: reqwest::Client,
}

impl AzureOpenAiBackend {
    pub fn new(settings: BackendSettings) -> Self {
        Self {
            settings,
            client: reqwest::Client::new(),
        }
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    fn request_body(request: &ChatRequest) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.instructions.is_empty() {
            messages.push(json!({ "role": "system", "content": request.instructions }));
        }
        messages.extend(request.messages.iter().map(wire_message));

        let mut body = json!({ "messages": messages, "stream": true });
        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": spec.name,
                            "description": spec.description,
                            "parameters": spec.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = Value::Array(tools);
            body["tool_choice"] = json!("auto");
        }
        body
    }
}

fn wire_message(message: &ChatMessage) -> Value {
    let mut wire = json!({ "role": message.role.as_str(), "content": message.content });
    if message.role == MessageRole::Assistant && !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": { "name": call.name, "arguments": call.arguments }
                })
            })
            .collect();
    }
    if let Some(id) = &message.tool_call_id {
        wire["tool_call_id"] = json!(id);
    }
    wire
}

#[async_trait]
impl ChatBackend for AzureOpenAiBackend {
    fn name(&self) -> &str {
        "azure-openai"
    }

    async fn stream_chat(&self, request: ChatRequest) -> ChatResult<BackendStream> {
        let url = self.settings.chat_completions_url();
        let body = Self::request_body(&request);
        debug!(
            deployment = %self.settings.deployment,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Starting chat completion"
        );

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.settings.api_key)
            .header("Accept", "text/event-stream")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(ChatError::backend(format!(
                "Azure OpenAI API error {}: {}",
                status, error_body
            )));
        }

        let mut bytes = response.bytes_stream();
        let events = stream! {
            let mut parser = SseParser::default();
            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        for event in parser.feed(&chunk) {
                            yield Ok(event);
                        }
                        if parser.done {
                            break;
                        }
                    }
                    Err(e) => {
                        yield Err(ChatError::backend(format!("Error reading stream: {}", e)));
                        return;
                    }
                }
            }
            for event in parser.finish() {
                yield Ok(event);
            }
        };

        Ok(Box::pin(events))
    }
}

/// Incremental parser for OpenAI-style `data: {json}` SSE frames.
///
/// Bytes are buffered until a full line arrives, so a multi-byte character
/// split across network chunks is decoded intact.
#[derive(Default)]
pub(crate) struct SseParser {
    buffer: Vec<u8>,
    calls: Vec<ToolCall>,
    done: bool,
}

impl SseParser {
    /// Feed raw bytes, returning the events completed by them.
    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Vec<BackendEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();

        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.parse_line(line.trim_end()) {
                events.push(event);
            }
            if self.done {
                break;
            }
        }
        events
    }

    /// Flush a trailing unterminated line and any accumulated tool calls.
    pub(crate) fn finish(&mut self) -> Vec<BackendEvent> {
        let mut events = Vec::new();
        if !self.done {
            let rest = std::mem::take(&mut self.buffer);
            let rest = String::from_utf8_lossy(&rest);
            if let Some(event) = self.parse_line(rest.trim_end()) {
                events.push(event);
            }
        }
        if !self.calls.is_empty() {
            events.push(BackendEvent::ToolCalls(std::mem::take(&mut self.calls)));
        }
        events
    }

    fn parse_line(&mut self, line: &str) -> Option<BackendEvent> {
        let data = line.strip_prefix("data:")?.trim_start();
        if data == "[DONE]" {
            self.done = true;
            return None;
        }

        let chunk: StreamChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                warn!(error = %e, "Skipping malformed stream chunk");
                return Some(BackendEvent::Delta(None));
            }
        };

        let delta = chunk.choices.into_iter().next().map(|c| c.delta)?;
        for call in delta.tool_calls.unwrap_or_default() {
            while self.calls.len() <= call.index {
                self.calls.push(ToolCall {
                    id: String::new(),
                    name: String::new(),
                    arguments: String::new(),
                });
            }
            let slot = &mut self.calls[call.index];
            if let Some(id) = call.id {
                slot.id = id;
            }
            if let Some(function) = call.function {
                if let Some(name) = function.name {
                    slot.name = name;
                }
                if let Some(arguments) = function.arguments {
                    slot.arguments.push_str(&arguments);
                }
            }
        }
        Some(BackendEvent::Delta(delta.content))
    }
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<ToolCallDelta>>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    #[serde(default)]
    index: usize,
    id: Option<String>,
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(events: &[BackendEvent]) -> Vec<Option<String>> {
        events
            .iter()
            .filter_map(|e| match e {
                BackendEvent::Delta(c) => Some(c.clone()),
                BackendEvent::ToolCalls(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_parser_content_across_chunk_boundaries() {
        let mut parser = SseParser::default();
        let mut events = parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel");
        assert!(events.is_empty());
        events.extend(parser.feed(b"lo\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\" world\"}}]}\n\n"));
        events.extend(parser.feed(b"data: [DONE]\n\n"));
        events.extend(parser.finish());

        assert_eq!(
            contents(&events),
            vec![Some("Hello".to_string()), Some(" world".to_string())]
        );
        assert!(parser.done);
    }

    #[test]
    fn test_parser_keeps_multibyte_text_split_across_chunks() {
        let frame = "data: {\"choices\":[{\"delta\":{\"content\":\"café 😀\"}}]}\n\n";
        let bytes = frame.as_bytes();
        let split = frame.find('é').unwrap() + 1;

        let mut parser = SseParser::default();
        let mut events = parser.feed(&bytes[..split]);
        assert!(events.is_empty());
        events.extend(parser.feed(&bytes[split..]));

        assert_eq!(contents(&events), vec![Some("café 😀".to_string())]);
    }

    #[test]
    fn test_parser_malformed_chunk_is_empty_delta() {
        let mut parser = SseParser::default();
        let events = parser.feed(b"data: {not json}\n\n: keep-alive\n\n");
        assert_eq!(events, vec![BackendEvent::Delta(None)]);
    }

    #[test]
    fn test_parser_accumulates_tool_calls() {
        let mut parser = SseParser::default();
        parser.feed(concat!(
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"id\":\"call_1\",\"function\":{\"name\":\"save_draft_prd\",\"arguments\":\"{\\\"con\"}}]}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"tool_calls\":[{\"index\":0,\"function\":{\"arguments\":\"tent\\\":\\\"x\\\"}\"}}]}}]}\n\n",
            "data: [DONE]\n\n",
        ).as_bytes());
        let events = parser.finish();

        assert_eq!(
            events,
            vec![BackendEvent::ToolCalls(vec![ToolCall {
                id: "call_1".into(),
                name: "save_draft_prd".into(),
                arguments: "{\"content\":\"x\"}".into(),
            }])]
        );
    }

    #[test]
    fn test_request_body_includes_tools_and_system() {
        let request = ChatRequest {
            instructions: "be brief".into(),
            messages: vec![
                ChatMessage::user("hi"),
                ChatMessage::assistant(
                    "",
                    vec![ToolCall {
                        id: "c1".into(),
                        name: "get_project_data".into(),
                        arguments: "{}".into(),
                    }],
                ),
                ChatMessage::tool("c1", "{}"),
            ],
            tools: vec![ToolSpec {
                name: "get_project_data".into(),
                description: "d".into(),
                parameters: json!({"type": "object"}),
            }],
        };

        let body = AzureOpenAiBackend::request_body(&request);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][2]["tool_calls"][0]["id"], "c1");
        assert_eq!(body["messages"][3]["tool_call_id"], "c1");
        assert_eq!(body["tools"][0]["function"]["name"], "get_project_data");
        assert_eq!(body["stream"], true);
    }
}
