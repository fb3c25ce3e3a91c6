//! Deterministic agent used when no backend is configured.

use std::sync::Arc;

use async_stream::stream;
use async_trait::async_trait;
use forge_agents::{Role, RoleConfig, Tool};
use regex::Regex;
use tracing::{debug, info};

use crate::agent::{validate_message, ChunkStream, ConversationalAgent, ThreadSlot};
use crate::error::ChatResult;
use crate::types::ChatMessage;

/// Which canned reply a message gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubCategory {
    Greeting,
    Prd,
    Help,
    Fallback,
}

// Checked in order; the first match wins.
const CATEGORY_PATTERNS: &[(StubCategory, &str)] = &[
    (StubCategory::Greeting, r"(?i)\b(hello|hi|hey)\b"),
    (StubCategory::Prd, r"(?i)\b(prd|requirements?|product|features?|document)\b"),
    (StubCategory::Help, r"(?i)\b(help|how|what can you)\b"),
];

impl StubCategory {
    pub fn classify(text: &str) -> Self {
        CATEGORY_PATTERNS
            .iter()
            .find(|(_, pattern)| Regex::new(pattern).is_ok_and(|re| re.is_match(text)))
            .map(|(category, _)| *category)
            .unwrap_or(StubCategory::Fallback)
    }
}

/// Credential-free agent with keyword-selected canned replies.
///
/// Tools are still bound so project context behaves the same, but none are
/// advertised or called.
pub struct StubAgent {
    config: RoleConfig,
    tools: Vec<Arc<dyn Tool>>,
    thread: ThreadSlot,
}

impl StubAgent {
    pub fn new(config: RoleConfig, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            config,
            tools,
            thread: ThreadSlot::default(),
        }
    }

    /// The full reply for `text`.
    pub fn reply_for(&self, text: &str) -> String {
        match StubCategory::classify(text) {
            StubCategory::Greeting => format!(
                "Hello! I'm the {}. I'm running in offline mode, but I can still walk you \
                 through writing a PRD. What product would you like to build?",
                self.config.display_name
            ),
            StubCategory::Prd => "Let's build your PRD. Start by describing the problem your \
                 product solves and who it is for. Then we'll cover goals, features, success \
                 metrics and non-goals."
                .to_string(),
            StubCategory::Help => "I can guide you through a Product Requirements Document \
                 section by section: overview, goals, target users, features, success metrics, \
                 non-goals and timeline. Ask about any of them to begin."
                .to_string(),
            StubCategory::Fallback => "This is a stub reply.".to_string(),
        }
    }
}

#[async_trait]
impl ConversationalAgent for StubAgent {
    fn role(&self) -> Role {
        self.config.role
    }

    fn available_tools(&self) -> Vec<String> {
        Vec::new()
    }

    fn send_message(&self, text: &str) -> ChatResult<ChunkStream> {
        validate_message(text)?;

        let reply = self.reply_for(text);
        let user = ChatMessage::user(text);
        let slot = self.thread.clone();
        let role = self.config.role;

        let chunks = stream! {
            let mut guard = slot.acquire().await;
            let thread = guard.get_or_insert_with(Default::default);
            debug!(role = %role, thread_id = %thread.id, "Stub reply");

            for word in reply.split_inclusive(' ') {
                yield Ok(word.to_string());
                tokio::task::yield_now().await;
            }

            thread.messages.push(user);
            thread.messages.push(ChatMessage::assistant(reply.clone(), Vec::new()));
        };

        Ok(Box::pin(chunks))
    }

    async fn reset(&self) {
        self.thread.clear().await;
        info!(role = %self.config.role, "Conversation reset");
    }

    fn set_project_context(&self, project_id: Option<String>) {
        for tool in &self.tools {
            if let Some(aware) = tool.context_aware() {
                aware.set_project_context(project_id.clone());
            }
        }
    }

    async fn has_thread(&self) -> bool {
        self.thread.is_active().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_agents::RoleRegistry;
    use futures::StreamExt;

    fn agent() -> StubAgent {
        let config = RoleRegistry::standard()
            .get(Role::PrdFacilitator)
            .unwrap()
            .clone();
        StubAgent::new(config, Vec::new())
    }

    async fn collect(stream: ChunkStream) -> Vec<String> {
        stream.map(|chunk| chunk.unwrap()).collect().await
    }

    #[test]
    fn test_classify() {
        assert_eq!(StubCategory::classify("Hello"), StubCategory::Greeting);
        assert_eq!(StubCategory::classify("hey there, PRD time"), StubCategory::Greeting);
        assert_eq!(StubCategory::classify("Draft the PRD"), StubCategory::Prd);
        assert_eq!(StubCategory::classify("help me"), StubCategory::Help);
        assert_eq!(StubCategory::classify("this thing"), StubCategory::Fallback);
    }

    #[tokio::test]
    async fn test_greeting_reply_streams_words() {
        let agent = agent();
        let chunks = collect(agent.send_message("Hello").unwrap()).await;

        assert!(chunks.len() > 1);
        let text = chunks.concat();
        assert!(text.starts_with("Hello!"));
        assert!(text.contains("PRD Facilitator"));
    }

    #[tokio::test]
    async fn test_fallback_reply() {
        let agent = agent();
        let text = collect(agent.send_message("zzz").unwrap()).await.concat();
        assert_eq!(text, "This is a stub reply.");
    }

    #[tokio::test]
    async fn test_thread_lifecycle() {
        let agent = agent();
        assert!(!agent.has_thread().await);

        collect(agent.send_message("Hello").unwrap()).await;
        assert!(agent.has_thread().await);

        agent.reset().await;
        agent.reset().await;
        assert!(!agent.has_thread().await);

        let text = collect(agent.send_message("Hello").unwrap()).await.concat();
        assert!(text.starts_with("Hello!"));
    }

    #[test]
    fn test_empty_message_rejected() {
        let agent = agent();
        assert!(agent.send_message("   ").is_err());
    }
}
