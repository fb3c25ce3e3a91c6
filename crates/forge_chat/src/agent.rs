//! The conversational agent contract.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use forge_agents::Role;
use futures::Stream;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::{ChatError, ChatResult};
use crate::types::Thread;

/// Reply fragments in backend emission order.
///
/// Forward-only and lazy: nothing happens until it is polled. Dropping it
/// early is the only cancellation and leaves the agent usable.
pub type ChunkStream = Pin<Box<dyn Stream<Item = ChatResult<String>> + Send>>;

/// One role's live conversation.
#[async_trait]
pub trait ConversationalAgent: Send + Sync {
    fn role(&self) -> Role;

    /// Names of the tools bound to this agent.
    fn available_tools(&self) -> Vec<String>;

    /// Send a user message and stream the reply.
    ///
    /// Empty text is rejected up front. Replies to the same agent are
    /// serialized: a second stream waits until the first one finishes or
    /// is dropped.
    fn send_message(&self, text: &str) -> ChatResult<ChunkStream>;

    /// Forget the conversation. The next message starts a fresh thread.
    async fn reset(&self);

    /// Point every context-aware tool at `project_id`.
    fn set_project_context(&self, project_id: Option<String>);

    /// Whether a thread currently exists.
    async fn has_thread(&self) -> bool;
}

/// Shared, lockable slot holding an agent's thread.
///
/// A reply holds the owned guard for its whole lifetime and only writes the
/// finished turn back, so an abandoned reply leaves no partial messages.
#[derive(Debug, Clone, Default)]
pub(crate) struct ThreadSlot {
    inner: Arc<Mutex<Option<Thread>>>,
}

impl ThreadSlot {
    pub(crate) async fn acquire(&self) -> OwnedMutexGuard<Option<Thread>> {
        self.inner.clone().lock_owned().await
    }

    pub(crate) async fn clear(&self) {
        self.inner.lock().await.take();
    }

    pub(crate) async fn is_active(&self) -> bool {
        self.inner.lock().await.is_some()
    }
}

/// Reject blank messages before any agent work starts.
pub(crate) fn validate_message(text: &str) -> ChatResult<()> {
    if text.trim().is_empty() {
        return Err(ChatError::validation("Message cannot be empty"));
    }
    Ok(())
}
