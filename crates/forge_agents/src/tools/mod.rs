//! Tools that agents can call mid-conversation.
//!
//! Every tool is an `Arc<dyn Tool>` held by the [`ToolRegistry`]. Agents never
//! share registry instances: they bind [`Tool::instantiate`] copies, so the
//! project context one agent sets is invisible to every other agent.

mod analysis_tools;
mod project_tools;
mod registry;
mod requirements_tools;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use forge_core::{parse_project_id, Project, ProjectStore};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AgentError, AgentResult};

pub use analysis_tools::{AnalyzeCodebaseTool, SuggestArchitectureTool};
pub use project_tools::{FetchProjectDataTool, GetProjectDataTool, PrdStage, SavePrdTool};
pub use registry::ToolRegistry;
pub use requirements_tools::{CheckCompletenessTool, GatherRequirementsTool, ValidateRequirementsTool};

/// Arguments passed to a tool, as decoded from the backend's JSON.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    data: HashMap<String, Value>,
}

impl ToolArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode arguments from a JSON object string. An empty string means no arguments.
    pub fn from_json(tool: &str, json_str: &str) -> AgentResult<Self> {
        if json_str.trim().is_empty() {
            return Ok(Self::default());
        }
        let data: HashMap<String, Value> = serde_json::from_str(json_str)
            .map_err(|e| AgentError::invalid_arguments(tool, e.to_string()))?;
        Ok(Self { data })
    }

    /// Builder-style insert, mostly for callers constructing arguments by hand.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn get_required<T>(&self, tool: &str, key: &str) -> AgentResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        self.get_optional(tool, key)?.ok_or_else(|| {
            AgentError::invalid_arguments(tool, format!("Required parameter '{}' missing", key))
        })
    }

    /// Get an optional parameter. JSON `null` counts as absent.
    pub fn get_optional<T>(&self, tool: &str, key: &str) -> AgentResult<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        match self.data.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                AgentError::invalid_arguments(
                    tool,
                    format!("Failed to parse parameter '{}': {}", key, e),
                )
            }),
        }
    }
}

/// Function-calling description of a tool, as advertised to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

/// A named callable capability an agent may invoke.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique registry key.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON schema for the arguments object.
    fn parameters(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    /// Run the tool.
    ///
    /// Lookup misses (no current project, unknown id) are reported in the
    /// returned payload. Errors are reserved for malformed arguments and
    /// store failures.
    async fn execute(&self, args: ToolArgs) -> AgentResult<Value>;

    /// The project-context capability, for tools that track a current project.
    fn context_aware(&self) -> Option<&dyn ContextAware> {
        None
    }

    /// A fresh instance for one agent. Shares the store, not the context.
    fn instantiate(&self) -> Arc<dyn Tool>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Capability of tools that operate on a "current project".
pub trait ContextAware: Send + Sync {
    fn set_project_context(&self, project_id: Option<String>);

    fn project_context(&self) -> Option<String>;
}

/// The current project id of one agent's tool, interior-mutable.
#[derive(Debug, Clone, Default)]
pub struct ProjectContext {
    current: Arc<RwLock<Option<String>>>,
}

impl ProjectContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, project_id: Option<String>) {
        *self.current.write() = project_id;
    }

    pub fn get(&self) -> Option<String> {
        self.current.read().clone()
    }
}

/// What every project-backed tool holds: the shared store, the owner whose
/// projects it may touch, and its own current-project slot.
#[derive(Clone)]
pub struct ToolEnv {
    store: Arc<dyn ProjectStore>,
    owner_id: String,
}

impl ToolEnv {
    pub fn new(store: Arc<dyn ProjectStore>, owner_id: impl Into<String>) -> Self {
        Self {
            store,
            owner_id: owner_id.into(),
        }
    }

    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }
}

/// Either the resolved project or a payload explaining why there is none.
pub(crate) type Resolved = Result<Project, Value>;

#[derive(Clone)]
pub(crate) struct ProjectScope {
    env: ToolEnv,
    context: ProjectContext,
}

impl ProjectScope {
    pub(crate) fn new(env: ToolEnv) -> Self {
        Self {
            env,
            context: ProjectContext::new(),
        }
    }

    /// Same environment, empty context.
    pub(crate) fn fresh(&self) -> Self {
        Self::new(self.env.clone())
    }

    pub(crate) fn env(&self) -> &ToolEnv {
        &self.env
    }

    /// Explicit `project_id` argument wins over the current context.
    pub(crate) fn target_id(&self, tool: &str, args: &ToolArgs) -> AgentResult<Option<String>> {
        Ok(args
            .get_optional::<String>(tool, "project_id")?
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.context.get()))
    }

    pub(crate) async fn resolve(&self, tool: &str, args: &ToolArgs) -> AgentResult<Resolved> {
        match self.target_id(tool, args)? {
            Some(raw) => self.load(&raw).await,
            None => Ok(Err(error_payload(
                "No project selected. Pass a project_id or set the project context.",
            ))),
        }
    }

    pub(crate) async fn load(&self, raw: &str) -> AgentResult<Resolved> {
        let id = match parse_project_id(raw) {
            Ok(id) => id,
            Err(_) => return Ok(Err(error_payload("Invalid project ID format"))),
        };
        match self.env.store.get(id, &self.env.owner_id).await? {
            Some(project) => Ok(Ok(project)),
            None => Ok(Err(error_payload(format!("Project {} not found", id)))),
        }
    }
}

impl ContextAware for ProjectScope {
    fn set_project_context(&self, project_id: Option<String>) {
        self.context.set(project_id);
    }

    fn project_context(&self) -> Option<String> {
        self.context.get()
    }
}

pub(crate) fn error_payload(message: impl Into<String>) -> Value {
    json!({ "status": "error", "error": message.into() })
}

pub(crate) fn project_id_schema() -> Value {
    json!({
        "type": "string",
        "description": "Project UUID. Defaults to the current project."
    })
}

/// Register the nine built-in tools.
pub fn register_builtin_tools(registry: &mut ToolRegistry, env: ToolEnv) -> AgentResult<()> {
    let tools: Vec<Arc<dyn Tool>> = vec![
        Arc::new(GetProjectDataTool::new(env.clone())),
        Arc::new(SavePrdTool::new(PrdStage::Draft, env.clone())),
        Arc::new(SavePrdTool::new(PrdStage::Completed, env.clone())),
        Arc::new(AnalyzeCodebaseTool::new(env.clone())),
        Arc::new(SuggestArchitectureTool::new(env.clone())),
        Arc::new(FetchProjectDataTool::new(env.clone())),
        Arc::new(GatherRequirementsTool::new(env.clone())),
        Arc::new(ValidateRequirementsTool::new(env.clone())),
        Arc::new(CheckCompletenessTool::new(env)),
    ];

    for tool in tools {
        registry.register(tool)?;
    }
    Ok(())
}
