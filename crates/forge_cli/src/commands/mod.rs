//! CLI command definitions.
//!
//! Every command builds the same in-memory application context the HTTP
//! server uses, so chat behaves identically in the terminal and the browser.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use forge_chat::{BackendSettings, InstructionLoader};
use forge_server::{AppContext, ServerConfig};

pub mod ask;
pub mod chat;
pub mod roles;
pub mod serve;

/// Forgebase - conversational PRD assistant
#[derive(Parser)]
#[command(name = "forge")]
#[command(version, about = "Forgebase - conversational PRD assistant")]
#[command(long_about = r#"
Forgebase turns a conversation into a Product Requirements Document.

COMMANDS:
  chat   → Talk to the PRD facilitator in the terminal
  serve  → Run the HTTP API (SSE chat, projects, specialists)
  roles  → List the configured agent roles
  ask    → Put a one-shot question to a specialist agent

BACKEND:
  Set AZURE_OPENAI_ENDPOINT, AZURE_OPENAI_API_KEY and
  AZURE_OPENAI_DEPLOYMENT_NAME (in the environment or a .env file) to use
  the real chat backend. Without them, agents run as offline stubs.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Configuration error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Server config file (TOML)
    #[arg(long, global = true, env = "FORGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory with `<role>.system.md` instruction overrides
    #[arg(long, global = true, env = "FORGE_PROMPTS_DIR")]
    pub prompts_dir: Option<PathBuf>,
}

impl GlobalArgs {
    /// File, then environment.
    pub fn server_config(&self) -> Result<ServerConfig> {
        let config = match &self.config {
            Some(path) => ServerConfig::from_file(path)?,
            None => ServerConfig::default(),
        };
        Ok(config.with_env()?)
    }

    pub fn app_context(&self, config: &ServerConfig) -> Result<AppContext> {
        let settings = BackendSettings::from_env();
        let instructions = InstructionLoader::new(self.prompts_dir.clone());
        AppContext::from_config(config, settings, instructions)
            .context("Failed to wire agents")
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive PRD conversation
    Chat(chat::ChatArgs),

    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// List agent roles
    Roles(roles::RolesArgs),

    /// Ask a specialist agent a single question
    Ask(ask::AskArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_joins_prompt() {
        let cli = Cli::try_parse_from(["forge", "ask", "technical_analyst", "which", "database?"])
            .unwrap();
        match cli.command {
            Commands::Ask(args) => assert_eq!(args.prompt_text(), "which database?"),
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["forge", "--debug", "serve", "--port", "9001"]).unwrap();
        assert!(cli.debug);
        assert!(matches!(cli.command, Commands::Serve(_)));
    }
}
