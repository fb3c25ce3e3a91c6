//! Agent construction and per-role caching.

use std::collections::HashMap;
use std::sync::Arc;

use forge_agents::{Role, RoleRegistry, Tool, ToolRegistry};
use parking_lot::Mutex;
use tracing::info;

use crate::agent::ConversationalAgent;
use crate::backend_agent::BackendAgent;
use crate::config::BackendSettings;
use crate::error::ChatResult;
use crate::instructions::InstructionLoader;
use crate::llm::{AzureOpenAiBackend, ChatBackend};
use crate::stub::StubAgent;

/// Builds one agent per role and caches it until [`AgentFactory::clear_cache`].
pub struct AgentFactory {
    roles: Arc<RoleRegistry>,
    tools: Arc<ToolRegistry>,
    backend: Option<Arc<dyn ChatBackend>>,
    instructions: InstructionLoader,
    cache: Mutex<HashMap<Role, Arc<dyn ConversationalAgent>>>,
}

impl AgentFactory {
    /// With `backend` set, agents are backend-attached; without it they are stubs.
    pub fn new(
        roles: Arc<RoleRegistry>,
        tools: Arc<ToolRegistry>,
        backend: Option<Arc<dyn ChatBackend>>,
        instructions: InstructionLoader,
    ) -> Self {
        Self {
            roles,
            tools,
            backend,
            instructions,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Pick the Azure backend when settings are complete, stubs otherwise.
    pub fn from_settings(
        roles: Arc<RoleRegistry>,
        tools: Arc<ToolRegistry>,
        settings: Option<BackendSettings>,
        instructions: InstructionLoader,
    ) -> Self {
        let backend = settings.map(|settings| {
            info!(deployment = %settings.deployment, "Using Azure OpenAI backend");
            Arc::new(AzureOpenAiBackend::new(settings)) as Arc<dyn ChatBackend>
        });
        if backend.is_none() {
            info!("Backend credentials not set, using stub agents");
        }
        Self::new(roles, tools, backend, instructions)
    }

    pub fn roles(&self) -> &RoleRegistry {
        &self.roles
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn is_stub(&self) -> bool {
        self.backend.is_none()
    }

    /// The cached agent for `role`, building it on first use.
    ///
    /// Fails with `ToolNotFound` if the role lists an unregistered tool.
    pub fn get_or_create(&self, role: Role) -> ChatResult<Arc<dyn ConversationalAgent>> {
        let mut cache = self.cache.lock();
        if let Some(agent) = cache.get(&role) {
            return Ok(agent.clone());
        }

        let agent = self.build(role)?;
        cache.insert(role, agent.clone());
        Ok(agent)
    }

    /// Drop every cached agent, and with them every conversation.
    pub fn clear_cache(&self) {
        let dropped = {
            let mut cache = self.cache.lock();
            let count = cache.len();
            cache.clear();
            count
        };
        info!(dropped, "Agent cache cleared");
    }

    pub fn cached_roles(&self) -> Vec<Role> {
        self.cache.lock().keys().copied().collect()
    }

    fn build(&self, role: Role) -> ChatResult<Arc<dyn ConversationalAgent>> {
        let config = self.roles.get(role)?;
        let prototypes = self.tools.resolve_many(&config.tool_names)?;

        // Own instances in role order, so project context stays per agent.
        let tools: Vec<Arc<dyn Tool>> = config
            .tool_names
            .iter()
            .filter_map(|name| prototypes.get(name))
            .map(|tool| tool.instantiate())
            .collect();

        let agent: Arc<dyn ConversationalAgent> = match &self.backend {
            Some(backend) => {
                let instructions = self.instructions.load(config);
                Arc::new(BackendAgent::new(
                    config.clone(),
                    instructions,
                    backend.clone(),
                    tools,
                ))
            }
            None => Arc::new(StubAgent::new(config.clone(), tools)),
        };

        let backend = self.backend.as_ref().map(|b| b.name()).unwrap_or("stub");
        info!(role = %role, backend, "Created agent");
        Ok(agent)
    }
}
