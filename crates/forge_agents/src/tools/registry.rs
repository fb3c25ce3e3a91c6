//! Tool registry.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::Tool;
use crate::error::{AgentError, AgentResult};

/// Name-keyed collection of tools. Filled at startup, read-only afterwards.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its name. Registering a name twice is an error;
    /// use [`ToolRegistry::replace`] to overwrite on purpose.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> AgentResult<()> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(AgentError::DuplicateTool(name));
        }
        debug!(tool = %name, "Registered tool");
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Insert or overwrite a tool, returning the previous one.
    pub fn replace(&mut self, tool: Arc<dyn Tool>) -> Option<Arc<dyn Tool>> {
        let name = tool.name().to_string();
        debug!(tool = %name, "Replaced tool");
        self.tools.insert(name, tool)
    }

    pub fn resolve(&self, name: &str) -> AgentResult<Arc<dyn Tool>> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    /// Resolve several names, failing on the first missing one.
    pub fn resolve_many<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> AgentResult<HashMap<String, Arc<dyn Tool>>> {
        names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.resolve(name).map(|tool| (name.to_string(), tool))
            })
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
