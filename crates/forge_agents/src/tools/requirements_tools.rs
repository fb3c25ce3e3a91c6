//! Requirements gathering and validation tools.

use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde_json::{json, Value};

use super::{error_payload, project_id_schema, ContextAware, ProjectScope, Tool, ToolArgs, ToolEnv};
use crate::error::AgentResult;

/// Requirement areas a PRD is expected to address, with detection keywords.
const REQUIREMENT_AREAS: &[(&str, &[&str])] = &[
    ("Functional requirements", &["must", "shall", "feature", "user can", "users can"]),
    ("Performance requirements", &["performance", "latency", "throughput", "response time"]),
    ("Security considerations", &["security", "authentication", "authorization", "encrypt"]),
    ("Usability", &["usability", "accessib", "user experience", "ux"]),
    ("Reliability", &["availability", "uptime", "reliab", "backup"]),
    ("Compliance", &["compliance", "gdpr", "hipaa", "regulat"]),
];

/// Sections a complete PRD carries, with accepted heading synonyms.
const PRD_SECTIONS: &[(&str, &[&str])] = &[
    ("Overview", &["overview", "summary", "introduction"]),
    ("Goals", &["goal", "objective"]),
    ("Target users", &["user", "persona", "audience", "customer"]),
    ("Features", &["feature", "requirement", "scope"]),
    ("Success metrics", &["metric", "kpi", "success"]),
    ("Non-goals", &["non-goal", "out of scope", "non goal"]),
    ("Timeline", &["timeline", "milestone", "roadmap"]),
];

struct Coverage {
    covered: Vec<&'static str>,
    missing: Vec<&'static str>,
}

impl Coverage {
    fn of(haystack: &[String], areas: &[(&'static str, &[&str])]) -> Self {
        let (covered, missing): (Vec<_>, Vec<_>) = areas.iter().partition(|(_, keywords)| {
            haystack
                .iter()
                .any(|text| keywords.iter().any(|k| text.contains(k)))
        });
        Self {
            covered: covered.into_iter().map(|(name, _)| name).collect(),
            missing: missing.into_iter().map(|(name, _)| name).collect(),
        }
    }

    /// Covered fraction, rounded to two decimals.
    fn score(&self) -> f64 {
        let total = self.covered.len() + self.missing.len();
        if total == 0 {
            return 0.0;
        }
        (self.covered.len() as f64 / total as f64 * 100.0).round() / 100.0
    }
}

const REQUIREMENT_PATTERN: &str =
    r"(?i)^\s*(?:[-*+]|\d+[.)])\s+(.+)$|^\s*(.*\b(?:must|shall|should)\b.*)$";

/// Pull requirement-looking lines (bullets, numbered items, modal statements).
pub(crate) fn extract_requirements(text: &str) -> Vec<String> {
    let Ok(re) = Regex::new(REQUIREMENT_PATTERN) else {
        return Vec::new();
    };
    text.lines()
        .filter_map(|line| {
            re.captures(line).and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().trim().to_string())
            })
        })
        .filter(|req| !req.is_empty())
        .collect()
}

/// Collect the requirements already written into the project's PRD.
pub struct GatherRequirementsTool {
    scope: ProjectScope,
}

impl GatherRequirementsTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for GatherRequirementsTool {
    fn name(&self) -> &str {
        "gather_requirements"
    }

    fn description(&self) -> &str {
        "Gather the requirements already captured in the project's PRD"
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

        let requirements = extract_requirements(&project.prd);
        Ok(json!({
            "status": "success",
            "project_id": project.id,
            "requirements_found": requirements.len(),
            "requirements": requirements,
            "sources": ["PRD document"],
            "summary": format!(
                "Gathered {} requirement(s) for project '{}'",
                requirements.len(),
                project.name
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

/// Score requirement text against the expected requirement areas.
pub struct ValidateRequirementsTool {
    scope: ProjectScope,
}

impl ValidateRequirementsTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for ValidateRequirementsTool {
    fn name(&self) -> &str {
        "validate_requirements"
    }

    fn description(&self) -> &str {
        "Validate requirements for completeness and clarity"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "requirements": {
                    "type": "string",
                    "description": "Requirements text. Defaults to the current project's PRD."
                },
                "project_id": project_id_schema()
            }
        })
    }

    async fn execute(&self, args: ToolArgs) -> AgentResult<Value> {
        let supplied = args
            .get_optional::<String>(self.name(), "requirements")?
            .filter(|text| !text.trim().is_empty());

        let text = match supplied {
            Some(text) => text,
            None => match self.scope.resolve(self.name(), &args).await? {
                Ok(project) => project.prd,
                Err(payload) => return Ok(payload),
            },
        };
        if text.trim().is_empty() {
            return Ok(error_payload("No requirements to validate"));
        }

        Ok(validate(&text))
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

fn validate(text: &str) -> Value {
    let lowered = vec![text.to_lowercase()];
    let coverage = Coverage::of(&lowered, REQUIREMENT_AREAS);
    let recommendations: Vec<String> = coverage
        .missing
        .iter()
        .map(|area| format!("Define {}", area.to_lowercase()))
        .collect();

    json!({
        "status": "success",
        "validation_score": coverage.score(),
        "covered_areas": coverage.covered,
        "missing_areas": coverage.missing,
        "requirements_found": extract_requirements(text).len(),
        "recommendations": recommendations,
    })
}

/// Check the current PRD for the sections a complete document carries.
pub struct CheckCompletenessTool {
    scope: ProjectScope,
}

impl CheckCompletenessTool {
    pub fn new(env: ToolEnv) -> Self {
        Self {
            scope: ProjectScope::new(env),
        }
    }
}

#[async_trait]
impl Tool for CheckCompletenessTool {
    fn name(&self) -> &str {
        "check_completeness"
    }

    fn description(&self) -> &str {
        "Check the project's PRD for missing sections"
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
        Ok(completeness(&project.prd, project.id.to_string()))
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

fn completeness(prd: &str, project_id: String) -> Value {
    let headings: Vec<String> = prd
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#'))
        .map(|line| line.trim_start_matches('#').trim().to_lowercase())
        .collect();
    let coverage = Coverage::of(&headings, PRD_SECTIONS);
    let score = coverage.score();

    json!({
        "status": "success",
        "project_id": project_id,
        "completeness_score": score,
        "is_complete": coverage.missing.is_empty(),
        "present_sections": coverage.covered,
        "missing_categories": coverage.missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_requirements() {
        let prd = "# Features\n- Create tasks\n2. Share lists\nThe app must sync offline.\nPlain prose.";
        assert_eq!(
            extract_requirements(prd),
            vec!["Create tasks", "Share lists", "The app must sync offline."]
        );
    }

    #[test]
    fn test_validate_scores_coverage() {
        let result = validate("Users can create tasks. Response time under 200ms.");
        assert_eq!(result["validation_score"], 0.33);
        let missing = result["missing_areas"].as_array().unwrap();
        assert!(missing.iter().any(|a| a == "Security considerations"));
        assert!(!missing.iter().any(|a| a == "Performance requirements"));
    }

    #[test]
    fn test_completeness_uses_headings_only() {
        let prd = "# Overview\nGoals are mentioned in prose only\n## Features\n";
        let result = completeness(prd, "id".into());
        let present = result["present_sections"].as_array().unwrap();
        assert_eq!(present.len(), 2);
        assert_eq!(result["is_complete"], false);
    }

    #[test]
    fn test_completeness_full_prd() {
        let prd = "# Overview\n# Goals\n# Target Users\n# Features\n# Success Metrics\n# Non-Goals\n# Timeline";
        let result = completeness(prd, "id".into());
        assert_eq!(result["completeness_score"], 1.0);
        assert_eq!(result["is_complete"], true);
    }
}
