//! Mock chat completion backend for testing.
//!
//! Replays scripted turns instead of calling a hosted model, and captures
//! every request so tests can inspect threads and advertised tools.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream;
use parking_lot::RwLock;

use crate::error::{ChatError, ChatResult};
use crate::llm::{BackendEvent, BackendStream, ChatBackend, ChatRequest};
use crate::types::ToolCall;

/// One scripted item of a backend reply.
#[derive(Debug, Clone)]
pub enum MockStep {
    Text(String),
    /// A chunk whose payload could not be decoded.
    Malformed,
    ToolCall(ToolCall),
    /// Fail mid-stream with a backend error.
    Fail(String),
}

impl MockStep {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn tool_call(id: &str, name: &str, arguments: &str) -> Self {
        Self::ToolCall(ToolCall {
            id: id.to_string(),
            name: name.to_string(),
            arguments: arguments.to_string(),
        })
    }
}

/// Scripted backend.
///
/// Each call to `stream_chat` consumes the next scripted turn. Once the
/// script runs out, every turn replies with the default text.
#[derive(Clone)]
pub struct MockBackend {
    turns: Arc<RwLock<Vec<Vec<MockStep>>>>,
    turn_index: Arc<AtomicUsize>,
    default_reply: Arc<RwLock<String>>,
    captured: Arc<RwLock<Vec<ChatRequest>>>,
    /// Fail before streaming anything.
    refuse: Arc<RwLock<Option<String>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            turns: Arc::new(RwLock::new(Vec::new())),
            turn_index: Arc::new(AtomicUsize::new(0)),
            default_reply: Arc::new(RwLock::new("Mock reply.".to_string())),
            captured: Arc::new(RwLock::new(Vec::new())),
            refuse: Arc::new(RwLock::new(None)),
        }
    }

    /// Add a scripted turn.
    pub fn add_turn(self, steps: Vec<MockStep>) -> Self {
        self.turns.write().push(steps);
        self
    }

    /// Add a turn that streams `text` as whitespace-preserving words.
    pub fn add_text_turn(self, text: &str) -> Self {
        let steps = text.split_inclusive(' ').map(MockStep::text).collect();
        self.add_turn(steps)
    }

    pub fn set_default_reply(self, reply: impl Into<String>) -> Self {
        *self.default_reply.write() = reply.into();
        self
    }

    /// Make every call fail before any chunk is produced.
    pub fn refuse_with(self, message: impl Into<String>) -> Self {
        *self.refuse.write() = Some(message.into());
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.captured.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured.read().len()
    }

    fn next_turn(&self) -> Vec<MockStep> {
        let index = self.turn_index.fetch_add(1, Ordering::SeqCst);
        self.turns
            .read()
            .get(index)
            .cloned()
            .unwrap_or_else(|| vec![MockStep::Text(self.default_reply.read().clone())])
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn stream_chat(&self, request: ChatRequest) -> ChatResult<BackendStream> {
        self.captured.write().push(request);
        if let Some(message) = self.refuse.read().clone() {
            return Err(ChatError::backend(message));
        }

        let mut events = Vec::new();
        let mut calls = Vec::new();
        for step in self.next_turn() {
            match step {
                MockStep::Text(text) => events.push(Ok(BackendEvent::Delta(Some(text)))),
                MockStep::Malformed => events.push(Ok(BackendEvent::Delta(None))),
                MockStep::ToolCall(call) => calls.push(call),
                MockStep::Fail(message) => {
                    events.push(Err(ChatError::backend(message)));
                    break;
                }
            }
        }
        if !calls.is_empty() {
            events.push(Ok(BackendEvent::ToolCalls(calls)));
        }

        Ok(Box::pin(stream::iter(events)))
    }
}
