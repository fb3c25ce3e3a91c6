//! Application context shared by every request handler.

use std::sync::Arc;

use forge_chat::{BackendSettings, InstructionLoader, Orchestrator};
use forge_core::{InMemoryProjectStore, ProjectService, ProjectStore};

use crate::config::ServerConfig;
use crate::error::ServerResult;

/// Built once at startup and handed to the router.
#[derive(Clone)]
pub struct AppContext {
    orchestrator: Arc<Orchestrator>,
    projects: ProjectService,
    owner_id: Arc<str>,
}

impl AppContext {
    pub fn new(orchestrator: Orchestrator, projects: ProjectService, owner_id: &str) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            projects,
            owner_id: Arc::from(owner_id),
        }
    }

    /// In-memory store with the standard roles and tools over it.
    ///
    /// Fails if the role and tool wiring is inconsistent.
    pub fn from_config(
        config: &ServerConfig,
        settings: Option<BackendSettings>,
        instructions: InstructionLoader,
    ) -> ServerResult<Self> {
        let store: Arc<dyn ProjectStore> = Arc::new(InMemoryProjectStore::new());
        let orchestrator =
            Orchestrator::standard(store.clone(), &config.owner_id, settings, instructions)?;
        Ok(Self::new(
            orchestrator,
            ProjectService::new(store),
            &config.owner_id,
        ))
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}
