//! Technical analyst tools.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{project_id_schema, ContextAware, ProjectScope, Tool, ToolArgs, ToolEnv};
use crate::error::AgentResult;

/// Inspect the structure of the project's PRD and point out gaps.
pub struct AnalyzeCodebaseTool {
    scope: ProjectScope,
}

impl AnalyzeCodebaseTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for AnalyzeCodebaseTool {
    fn name(&self) -> &str {
        "analyze_codebase"
    }

    fn description(&self) -> &str {
        "Analyze codebase structure and provide recommendations"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_id": project_id_schema(),
                "analysis_type": {
                    "type": "string",
                    "description": "Kind of analysis, e.g. structure, dependencies, quality",
                    "default": "structure"
                }
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> AgentResult<Value> {
        let analysis_type = args
            .get_optional::<String>(self.name(), "analysis_type")?
            .unwrap_or_else(|| "structure".to_string());

        let project = match self.scope.resolve(self.name(), &args).await? {
            Ok(project) => project,
            Err(payload) => return Ok(payload),
        };

        let sections: Vec<&str> = project
            .prd
            .lines()
            .map(str::trim)
            .filter(|line| line.starts_with('#'))
            .map(|line| line.trim_start_matches('#').trim())
            .collect();

        let mut recommendations = vec![
            "Use dependency injection",
            "Add more tests",
            "Implement proper error handling",
        ];
        if sections.is_empty() {
            recommendations.insert(0, "Structure the PRD into headed sections");
        }

        Ok(json!({
            "status": "success",
            "analysis_type": analysis_type,
            "project_id": project.id,
            "sections": sections,
            "findings": format!(
                "{} analysis for project '{}': {} PRD section(s) found",
                analysis_type,
                project.name,
                sections.len()
            ),
            "recommendations": recommendations,
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

// (keywords, architecture, extra patterns, technologies)
const ARCHITECTURE_RULES: &[(&[&str], &str, &[&str], &[&str])] = &[
    (
        &["real-time", "realtime", "chat", "notification", "live"],
        "Event-driven services behind a WebSocket gateway",
        &["Publish/Subscribe", "Event Sourcing"],
        &["Redis", "WebSockets"],
    ),
    (
        &["mobile", "ios", "android"],
        "Mobile client with a backend-for-frontend API",
        &["Backend for Frontend"],
        &["React Native"],
    ),
    (
        &["scale", "millions", "high traffic", "microservice"],
        "Microservices with API Gateway",
        &["CQRS", "Circuit Breaker"],
        &["Kubernetes", "Message queue"],
    ),
];

const DEFAULT_ARCHITECTURE: &str = "Modular monolith with a REST API";

/// Suggest an architecture from keywords in the requirements and PRD.
pub struct SuggestArchitectureTool {
    scope: ProjectScope,
}

impl SuggestArchitectureTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for SuggestArchitectureTool {
    fn name(&self) -> &str {
        "suggest_architecture"
    }

    fn description(&self) -> &str {
        "Suggest architectural patterns and technologies"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "project_id": project_id_schema(),
                "requirements": {
                    "type": "string",
                    "description": "Additional requirements to take into account"
                }
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> AgentResult<Value> {
        let requirements = args
            .get_optional::<String>(self.name(), "requirements")?
            .unwrap_or_default();

        // The project is optional here: free-text requirements are enough.
        let project = match self.scope.target_id(self.name(), &args)? {
            Some(raw) => match self.scope.load(&raw).await? {
                Ok(project) => Some(project),
                Err(payload) => return Ok(payload),
            },
            None => None,
        };

        let mut text = requirements.to_lowercase();
        if let Some(project) = &project {
            text.push('\n');
            text.push_str(&project.prd.to_lowercase());
        }

        Ok(suggest(&text, project.map(|p| p.id.to_string())))
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

fn suggest(text: &str, project_id: Option<String>) -> Value {
    let mut architecture = DEFAULT_ARCHITECTURE;
    let mut patterns = vec!["Repository Pattern", "Dependency Injection"];
    let mut technologies = vec!["PostgreSQL"];

    for (keywords, arch, extra_patterns, extra_tech) in ARCHITECTURE_RULES {
        if keywords.iter().any(|k| text.contains(k)) {
            if architecture == DEFAULT_ARCHITECTURE {
                architecture = *arch;
            }
            patterns.extend_from_slice(extra_patterns);
            technologies.extend_from_slice(extra_tech);
        }
    }

    json!({
        "status": "success",
        "project_id": project_id,
        "suggested_architecture": architecture,
        "patterns": patterns,
        "technologies": technologies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use forge_core::{InMemoryProjectStore, Project, ProjectStore};

    #[test]
    fn test_suggest_default() {
        let result = suggest("a simple todo list", None);
        assert_eq!(result["suggested_architecture"], DEFAULT_ARCHITECTURE);
        assert!(result["project_id"].is_null());
    }

    #[test]
    fn test_suggest_first_matching_rule_wins() {
        let result = suggest("a mobile app with real-time chat", None);
        assert_eq!(
            result["suggested_architecture"],
            "Event-driven services behind a WebSocket gateway"
        );
        let tech = result["technologies"].as_array().unwrap();
        assert!(tech.iter().any(|t| t == "React Native"));
    }

    #[tokio::test]
    async fn test_analyze_counts_sections() {
        let store = Arc::new(InMemoryProjectStore::new());
        let project = store
            .create(Project::new("owner", "Docs", "# Overview\ntext\n## Goals\n- ship").unwrap())
            .await
            .unwrap();
        let tool = AnalyzeCodebaseTool::new(ToolEnv::new(store, "owner"));

        let result = tool
            .execute(ToolArgs::new().with("project_id", project.id.to_string()))
            .await
            .unwrap();
        assert_eq!(result["analysis_type"], "structure");
        assert_eq!(result["sections"], json!(["Overview", "Goals"]));
    }
}
