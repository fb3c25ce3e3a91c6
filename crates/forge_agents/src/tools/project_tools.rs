//! Tools that read or write project records.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use super::{error_payload, project_id_schema, ContextAware, ProjectScope, Tool, ToolArgs, ToolEnv};
use crate::error::AgentResult;

/// Access one project or the owner's whole list.
pub struct GetProjectDataTool {
    scope: ProjectScope,
}

impl GetProjectDataTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for GetProjectDataTool {
    fn name(&self) -> &str {
        "get_project_data"
    }

    fn description(&self) -> &str {
        "Access project data from the repository"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "project_id": project_id_schema() }
        })
    }

    async fn execute(&self, args: ToolArgs) -> AgentResult<Value> {
        match self.scope.target_id(self.name(), &args)? {
            Some(raw) => Ok(match self.scope.load(&raw).await? {
                Ok(project) => json!({ "status": "success", "project": project }),
                Err(payload) => payload,
            }),
            None => {
                let env = self.scope.env();
                let projects = env.store().list(env.owner_id()).await?;
                Ok(json!({ "status": "success", "projects": projects }))
            }
        }
    }

    fn context_aware(&self) -> Option<&dyn ContextAware> {
        Some(&self.scope)
    }

    fn instantiate(&self) -> Arc<dyn Tool> {
        Arc::new(Self {
            scope: self.scope.fresh(),
        })
    }
}

/// Which stage of the PRD a save represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrdStage {
    Draft,
    Completed,
}

impl PrdStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrdStage::Draft => "draft",
            PrdStage::Completed => "completed",
        }
    }
}

/// Write PRD text into the current project.
pub struct SavePrdTool {
    stage: PrdStage,
    scope: ProjectScope,
}

impl SavePrdTool {
    pub fn new(stage: PrdStage, env: ToolEnv) -> Self {
        Self {
            stage,
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for SavePrdTool {
    fn name(&self) -> &str {
        match self.stage {
            PrdStage::Draft => "save_draft_prd",
            PrdStage::Completed => "save_completed_prd",
        }
    }

    fn description(&self) -> &str {
        match self.stage {
            PrdStage::Draft => "Save a draft PRD document to the current project",
            PrdStage::Completed => "Save the completed PRD document to the current project",
        }
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "content": { "type": "string", "description": "Full PRD text in Markdown" },
                "project_id": project_id_schema()
            },
            "required": ["content"]
        })
    }

    async fn execute(&self, args: ToolArgs) -> AgentResult<Value> {
        let content: String = args.get_required(self.name(), "content")?;
        if content.trim().is_empty() {
            return Ok(error_payload("PRD content is empty"));
        }

        let mut project = match self.scope.resolve(self.name(), &args).await? {
            Ok(project) => project,
            Err(payload) => return Ok(payload),
        };

        project.set_prd(content.as_str());
        let project = self.scope.env().store().update(project).await?;
        info!(project_id = %project.id, stage = self.stage.as_str(), "Saved PRD");

        let stage = match self.stage {
            PrdStage::Draft => "Draft",
            PrdStage::Completed => "Completed",
        };
        Ok(json!({
            "status": "success",
            "stage": self.stage.as_str(),
            "project_id": project.id,
            "message": format!("{} PRD saved for project {}", stage, project.name),
            "content_length": content.chars().count(),
        }))
    }

    fn context_aware(&self) -> Option<&dyn ContextAware> {
        Some(&self.scope)
    }

    fn instantiate(&self) -> Arc<dyn Tool> {
        Arc::new(Self {
            stage: self.stage,
            scope: self.scope.fresh(),
        })
    }
}

/// Summarize what is known about a project and where it came from.
pub struct FetchProjectDataTool {
    scope: ProjectScope,
}

impl FetchProjectDataTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for FetchProjectDataTool {
    fn name(&self) -> &str {
        "fetch_project_data"
    }

    fn description(&self) -> &str {
        "Fetch and summarize the stored data for a project"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": { "project_id": project_id_schema() }
        })
    }

    async fn execute(&self, args: ToolArgs) -> AgentResult<Value> {
        let project = match self.scope.resolve(self.name(), &args).await? {
            Ok(project) => project,
            Err(payload) => return Ok(payload),
        };

        let mut data_sources = vec!["Project record"];
        if !project.prd.trim().is_empty() {
            data_sources.push("PRD document");
        }
        let words = project.prd.split_whitespace().count();

        Ok(json!({
            "status": "success",
            "project_id": project.id,
            "name": project.name,
            "created_at": project.created_at,
            "last_modified": project.last_modified(),
            "prd_word_count": words,
            "data_sources": data_sources,
            "summary": format!(
                "Project '{}' with a {}-word PRD",
                project.name, words
            ),
        }))
    }

    fn context_aware(&self) -> Option<&dyn ContextAware> {
        Some(&self.scope)
    }

    fn instantiate(&self) -> Arc<dyn Tool> {
        Arc::new(Self {
            scope: self.scope.fresh(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{InMemoryProjectStore, Project, ProjectStore};

    async fn setup() -> (Arc<InMemoryProjectStore>, ToolEnv, Project) {
        let store = Arc::new(InMemoryProjectStore::new());
        let project = store
            .create(Project::new("owner", "Task App", "").unwrap())
            .await
            .unwrap();
        let env = ToolEnv::new(store.clone(), "owner");
        (store, env, project)
    }

    #[tokio::test]
    async fn test_get_project_data_lists_without_context() {
        let (_, env, project) = setup().await;
        let tool = GetProjectDataTool::new(env);

        let result = tool.execute(ToolArgs::new()).await.unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["projects"][0]["id"], project.id.to_string());
    }

    #[tokio::test]
    async fn test_get_project_data_uses_context() {
        let (_, env, project) = setup().await;
        let tool = GetProjectDataTool::new(env);
        tool.context_aware()
            .unwrap()
            .set_project_context(Some(project.id.to_string()));

        let result = tool.execute(ToolArgs::new()).await.unwrap();
        assert_eq!(result["project"]["name"], "Task App");
    }

    #[tokio::test]
    async fn test_get_project_data_invalid_id() {
        let (_, env, _) = setup().await;
        let tool = GetProjectDataTool::new(env);

        let result = tool
            .execute(ToolArgs::new().with("project_id", "nope"))
            .await
            .unwrap();
        assert_eq!(result["status"], "error");
        assert_eq!(result["error"], "Invalid project ID format");
    }

    #[tokio::test]
    async fn test_save_draft_writes_prd() {
        let (store, env, project) = setup().await;
        let tool = SavePrdTool::new(PrdStage::Draft, env);
        tool.context_aware()
            .unwrap()
            .set_project_context(Some(project.id.to_string()));

        let result = tool
            .execute(ToolArgs::new().with("content", "# Overview\nA task app"))
            .await
            .unwrap();
        assert_eq!(result["status"], "success");
        assert_eq!(result["stage"], "draft");

        let stored = store.get(project.id, "owner").await.unwrap().unwrap();
        assert_eq!(stored.prd, "# Overview\nA task app");
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_save_without_project_reports_error() {
        let (store, env, project) = setup().await;
        let tool = SavePrdTool::new(PrdStage::Completed, env);

        let result = tool
            .execute(ToolArgs::new().with("content", "text"))
            .await
            .unwrap();
        assert_eq!(result["status"], "error");
        assert_eq!(store.get(project.id, "owner").await.unwrap().unwrap().prd, "");
    }

    #[tokio::test]
    async fn test_save_requires_content() {
        let (_, env, _) = setup().await;
        let tool = SavePrdTool::new(PrdStage::Draft, env);
        assert!(tool.execute(ToolArgs::new()).await.is_err());
    }

    #[tokio::test]
    async fn test_other_owner_is_not_found() {
        let (store, _, project) = setup().await;
        let tool = FetchProjectDataTool::new(ToolEnv::new(store, "someone-else"));

        let result = tool
            .execute(ToolArgs::new().with("project_id", project.id.to_string()))
            .await
            .unwrap();
        assert_eq!(result["status"], "error");
    }
}
