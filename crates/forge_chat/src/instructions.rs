//! Role instructions (system prompts).

use std::path::PathBuf;

use forge_agents::RoleConfig;
use tracing::{debug, warn};

/// Directory checked for prompt overrides before the embedded prompts.
pub const ENV_PROMPTS_DIR: &str = "FORGE_PROMPTS_DIR";

const EMBEDDED_PROMPTS: &[(&str, &str)] = &[
    ("prd.system.md", include_str!("../prompts/prd.system.md")),
    (
        "technical_analyst.system.md",
        include_str!("../prompts/technical_analyst.system.md"),
    ),
    (
        "data_collector.system.md",
        include_str!("../prompts/data_collector.system.md"),
    ),
    (
        "requirements_validator.system.md",
        include_str!("../prompts/requirements_validator.system.md"),
    ),
];

/// Resolves a role's `instructions_source` to prompt text.
///
/// Lookup order: override directory, embedded prompt, then a one-line
/// fallback built from the role's name and description.
#[derive(Debug, Clone, Default)]
pub struct InstructionLoader {
    override_dir: Option<PathBuf>,
}

impl InstructionLoader {
    pub fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var(ENV_PROMPTS_DIR)
                .ok()
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
        )
    }

    pub fn load(&self, config: &RoleConfig) -> String {
        let source = config.instructions_source.as_str();

        if let Some(dir) = &self.override_dir {
            let path = dir.join(source);
            match std::fs::read_to_string(&path) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(role = %config.role, path = %path.display(), "Loaded prompt override");
                    return text;
                }
                Ok(_) => warn!(path = %path.display(), "Prompt override is empty, ignoring"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to read prompt override"),
            }
        }

        if let Some((_, text)) = EMBEDDED_PROMPTS.iter().find(|(name, _)| *name == source) {
            return text.to_string();
        }

        warn!(role = %config.role, source, "No instructions found, using fallback");
        format!("You are a {}. {}", config.display_name, config.description)
    }
}
