//! Composition root for the chat layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use forge_agents::{register_builtin_tools, Role, RoleRegistry, ToolEnv, ToolRegistry};
use forge_core::ProjectStore;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::ChunkStream;
use crate::config::BackendSettings;
use crate::error::{ChatError, ChatResult};
use crate::factory::AgentFactory;
use crate::instructions::InstructionLoader;

/// Buffered reply of a background specialist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialistReport {
    pub full_text: String,
    pub role: String,
    pub tools_used: Vec<String>,
}

/// Owns the user-facing agent and gives access to the background specialists.
pub struct Orchestrator {
    factory: AgentFactory,
    user_facing: Role,
}

impl Orchestrator {
    /// Validate the wiring and build the orchestrator.
    ///
    /// Exactly one role must be user-facing and every role's tools must be
    /// registered; both are checked here rather than on first request.
    pub fn new(factory: AgentFactory) -> ChatResult<Self> {
        let user_facing = factory.roles().user_facing_role()?;
        factory.roles().validate_tools(factory.tools())?;
        info!(
            user_facing = %user_facing,
            stub = factory.is_stub(),
            "Orchestrator ready"
        );
        Ok(Self {
            factory,
            user_facing,
        })
    }

    /// Standard roles and built-in tools over `store`, scoped to `owner_id`.
    pub fn standard(
        store: Arc<dyn ProjectStore>,
        owner_id: &str,
        settings: Option<BackendSettings>,
        instructions: InstructionLoader,
    ) -> ChatResult<Self> {
        let mut tools = ToolRegistry::new();
        register_builtin_tools(&mut tools, ToolEnv::new(store, owner_id))?;
        let factory = AgentFactory::from_settings(
            Arc::new(RoleRegistry::standard()),
            Arc::new(tools),
            settings,
            instructions,
        );
        Self::new(factory)
    }

    pub fn factory(&self) -> &AgentFactory {
        &self.factory
    }

    pub fn user_facing_role(&self) -> Role {
        self.user_facing
    }

    /// Stream the user-facing agent's reply to `text`.
    pub fn send_message(&self, text: &str) -> ChatResult<ChunkStream> {
        let agent = self.factory.get_or_create(self.user_facing)?;
        agent.send_message(text)
    }

    /// Point the user-facing agent's tools at a project.
    pub fn set_project_context(&self, project_id: Option<String>) -> ChatResult<()> {
        let agent = self.factory.get_or_create(self.user_facing)?;
        agent.set_project_context(project_id);
        Ok(())
    }

    /// Reset the visible conversation and drop every cached agent.
    pub async fn reset(&self) -> ChatResult<()> {
        let agent = self.factory.get_or_create(self.user_facing)?;
        agent.reset().await;
        self.factory.clear_cache();
        info!("All conversations reset");
        Ok(())
    }

    /// Ask a specialist and buffer its whole reply.
    pub async fn ask_specialist(&self, role: Role, prompt: &str) -> ChatResult<SpecialistReport> {
        self.ask_in_project(role, prompt, None).await
    }

    /// Like [`Orchestrator::ask_specialist`], with the specialist's tools
    /// pointed at `project_id` first when one is given.
    pub async fn ask_in_project(
        &self,
        role: Role,
        prompt: &str,
        project_id: Option<String>,
    ) -> ChatResult<SpecialistReport> {
        let agent = self.factory.get_or_create(role)?;
        if project_id.is_some() {
            agent.set_project_context(project_id);
        }

        let mut chunks = agent.send_message(prompt)?;
        let mut full_text = String::new();
        while let Some(chunk) = chunks.next().await {
            full_text.push_str(&chunk?);
        }
        debug!(role = %role, chars = full_text.len(), "Specialist replied");

        Ok(SpecialistReport {
            full_text,
            role: role.as_str().to_string(),
            tools_used: agent.available_tools(),
        })
    }

    pub async fn analyze_technical_requirements(
        &self,
        project_id: &str,
        requirements: &str,
    ) -> ChatResult<SpecialistReport> {
        let prompt = format!(
            "Analyze these technical requirements for project {}: {}",
            project_id, requirements
        );
        self.ask_in_project(Role::TechnicalAnalyst, &prompt, Some(project_id.to_string()))
            .await
    }

    pub async fn collect_project_data(&self, project_id: &str) -> ChatResult<SpecialistReport> {
        let prompt = format!("Collect and organize data for project {}", project_id);
        self.ask_in_project(Role::DataCollector, &prompt, Some(project_id.to_string()))
            .await
    }

    pub async fn validate_requirements(&self, requirements: &str) -> ChatResult<SpecialistReport> {
        if requirements.trim().is_empty() {
            return Err(ChatError::validation("Requirements cannot be empty"));
        }
        let prompt = format!(
            "Validate these requirements for completeness and clarity: {}",
            requirements
        );
        self.ask_specialist(Role::RequirementsValidator, &prompt).await
    }

    /// `role -> description` for every configured role.
    pub fn list_roles(&self) -> BTreeMap<String, String> {
        self.factory
            .roles()
            .descriptions()
            .into_iter()
            .map(|(role, description)| (role.as_str().to_string(), description))
            .collect()
    }
}
