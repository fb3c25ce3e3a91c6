//! Ask command - One-shot question to a specialist.

use anyhow::{Context, Result};
use clap::Args;
use forge_agents::Role;
use forge_chat::ChatError;

use super::GlobalArgs;

#[derive(Args)]
pub struct AskArgs {
    /// Role to ask, e.g. technical_analyst
    role: String,

    /// The question
    #[arg(required = true, trailing_var_arg = true)]
    prompt: Vec<String>,
}

impl AskArgs {
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ")
    }
}

pub async fn execute(global: &GlobalArgs, args: AskArgs) -> Result<()> {
    let role: Role = args.role.parse().map_err(ChatError::from)?;
    let config = global.server_config()?;
    let ctx = global.app_context(&config)?;
    let prompt = args.prompt_text();

    let report = ctx
        .orchestrator()
        .ask_specialist(role, &prompt)
        .await
        .with_context(|| format!("{} did not answer", role))?;

    println!("{}", report.full_text);
    Ok(())
}
