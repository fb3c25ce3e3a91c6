//! Agent role definitions and registry.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, AgentResult};
use crate::tools::ToolRegistry;

/// Agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    PrdFacilitator,
    TechnicalAnalyst,
    DataCollector,
    RequirementsValidator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::PrdFacilitator => "prd_facilitator",
            Role::TechnicalAnalyst => "technical_analyst",
            Role::DataCollector => "data_collector",
            Role::RequirementsValidator => "requirements_validator",
        }
    }

    pub fn all() -> Vec<Self> {
        vec![
            Role::PrdFacilitator,
            Role::TechnicalAnalyst,
            Role::DataCollector,
            Role::RequirementsValidator,
        ]
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Role::all()
            .into_iter()
            .find(|role| role.as_str() == normalized)
            .ok_or_else(|| AgentError::RoleNotFound(s.to_string()))
    }
}

/// Static configuration of one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleConfig {
    pub role: Role,
    pub display_name: String,
    /// Name of the instructions resource, e.g. `prd.system.md`.
    pub instructions_source: String,
    /// Ordered, unique tool names.
    pub tool_names: Vec<String>,
    pub description: String,
    pub is_user_facing: bool,
}

impl RoleConfig {
    pub fn new(
        role: Role,
        display_name: impl Into<String>,
        instructions_source: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            role,
            display_name: display_name.into(),
            instructions_source: instructions_source.into(),
            tool_names: Vec::new(),
            description: description.into(),
            is_user_facing: false,
        }
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tool_names = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn user_facing(mut self) -> Self {
        self.is_user_facing = true;
        self
    }
}

/// Read-only registry of role configurations, in declaration order.
#[derive(Debug, Clone)]
pub struct RoleRegistry {
    configs: HashMap<Role, RoleConfig>,
    order: Vec<Role>,
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl RoleRegistry {
    /// The four built-in roles.
    pub fn standard() -> Self {
        let configs = vec![
            RoleConfig::new(
                Role::PrdFacilitator,
                "PRD Facilitator",
                "prd.system.md",
                "Interactive agent for conversational PRD creation",
            )
            .with_tools(&["save_draft_prd", "save_completed_prd", "get_project_data"])
            .user_facing(),
            RoleConfig::new(
                Role::TechnicalAnalyst,
                "Technical Analyst",
                "technical_analyst.system.md",
                "Analyzes technical requirements and suggests solutions",
            )
            .with_tools(&["analyze_codebase", "suggest_architecture", "get_project_data"]),
            RoleConfig::new(
                Role::DataCollector,
                "Data Collector",
                "data_collector.system.md",
                "Collects and organizes project data from repositories",
            )
            .with_tools(&["fetch_project_data", "gather_requirements", "get_project_data"]),
            RoleConfig::new(
                Role::RequirementsValidator,
                "Requirements Validator",
                "requirements_validator.system.md",
                "Validates and ensures completeness of requirements",
            )
            .with_tools(&["validate_requirements", "check_completeness", "get_project_data"]),
        ];

        let mut registry = Self {
            configs: HashMap::new(),
            order: Vec::new(),
        };
        for config in configs {
            registry.order.push(config.role);
            registry.configs.insert(config.role, config);
        }
        registry
    }

    /// Build a registry from explicit configs.
    ///
    /// Rejects a role configured twice and a role listing a tool twice.
    pub fn from_configs(configs: Vec<RoleConfig>) -> AgentResult<Self> {
        let mut configs_by_role = HashMap::new();
        let mut order = Vec::new();

        for config in configs {
            let mut seen = HashSet::new();
            if let Some(dup) = config.tool_names.iter().find(|name| !seen.insert(*name)) {
                return Err(AgentError::configuration(format!(
                    "role {} lists tool '{}' more than once",
                    config.role, dup
                )));
            }
            if configs_by_role.contains_key(&config.role) {
                return Err(AgentError::configuration(format!(
                    "role {} is configured more than once",
                    config.role
                )));
            }
            order.push(config.role);
            configs_by_role.insert(config.role, config);
        }

        Ok(Self {
            configs: configs_by_role,
            order,
        })
    }

    pub fn get(&self, role: Role) -> AgentResult<&RoleConfig> {
        self.configs
            .get(&role)
            .ok_or_else(|| AgentError::configuration(format!("role {} is not configured", role)))
    }

    /// All configs, in declaration order.
    pub fn configs(&self) -> impl Iterator<Item = &RoleConfig> {
        self.order.iter().filter_map(|role| self.configs.get(role))
    }

    pub fn list_user_facing(&self) -> Vec<Role> {
        self.configs()
            .filter(|c| c.is_user_facing)
            .map(|c| c.role)
            .collect()
    }

    pub fn list_background(&self) -> Vec<Role> {
        self.configs()
            .filter(|c| !c.is_user_facing)
            .map(|c| c.role)
            .collect()
    }

    /// The single user-facing role. Zero or several is a configuration error.
    pub fn user_facing_role(&self) -> AgentResult<Role> {
        match self.list_user_facing().as_slice() {
            [role] => Ok(*role),
            [] => Err(AgentError::configuration("no user-facing role configured")),
            many => Err(AgentError::configuration(format!(
                "exactly one user-facing role expected, found {}: {}",
                many.len(),
                many.iter()
                    .map(|r| r.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// Check every role's tools resolve in `tools`.
    pub fn validate_tools(&self, tools: &ToolRegistry) -> AgentResult<()> {
        for config in self.configs() {
            tools.resolve_many(&config.tool_names)?;
            debug!(role = %config.role, tools = config.tool_names.len(), "Role tools resolved");
        }
        Ok(())
    }

    /// `role -> description`, in declaration order.
    pub fn descriptions(&self) -> Vec<(Role, String)> {
        self.configs()
            .map(|c| (c.role, c.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in Role::all() {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert_eq!("Technical-Analyst".parse::<Role>().unwrap(), Role::TechnicalAnalyst);
        assert!(matches!(
            "janitor".parse::<Role>(),
            Err(AgentError::RoleNotFound(_))
        ));
    }

    #[test]
    fn test_standard_registry() {
        let registry = RoleRegistry::standard();
        assert_eq!(registry.list_user_facing(), vec![Role::PrdFacilitator]);
        assert_eq!(registry.list_background().len(), 3);
        assert_eq!(registry.user_facing_role().unwrap(), Role::PrdFacilitator);

        let analyst = registry.get(Role::TechnicalAnalyst).unwrap();
        assert_eq!(analyst.display_name, "Technical Analyst");
        assert_eq!(analyst.tool_names[0], "analyze_codebase");
    }

    #[test]
    fn test_user_facing_must_be_unique() {
        let none = RoleRegistry::from_configs(vec![RoleConfig::new(
            Role::DataCollector,
            "Data Collector",
            "data_collector.system.md",
            "collects",
        )])
        .unwrap();
        assert!(matches!(
            none.user_facing_role(),
            Err(AgentError::Configuration(_))
        ));

        let two = RoleRegistry::from_configs(vec![
            RoleConfig::new(Role::PrdFacilitator, "A", "a.md", "a").user_facing(),
            RoleConfig::new(Role::DataCollector, "B", "b.md", "b").user_facing(),
        ])
        .unwrap();
        assert!(two.user_facing_role().is_err());
    }

    #[test]
    fn test_from_configs_rejects_duplicates() {
        let dup_tool = RoleConfig::new(Role::DataCollector, "B", "b.md", "b")
            .with_tools(&["get_project_data", "get_project_data"]);
        assert!(RoleRegistry::from_configs(vec![dup_tool]).is_err());

        let dup_role = vec![
            RoleConfig::new(Role::DataCollector, "B", "b.md", "b"),
            RoleConfig::new(Role::DataCollector, "C", "c.md", "c"),
        ];
        assert!(RoleRegistry::from_configs(dup_role).is_err());
    }

    #[test]
    fn test_get_unconfigured_role() {
        let registry = RoleRegistry::from_configs(Vec::new()).unwrap();
        assert!(matches!(
            registry.get(Role::PrdFacilitator),
            Err(AgentError::Configuration(_))
        ));
    }
}
