//! Chat command - Interactive conversation with the user-facing agent.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use super::GlobalArgs;

#[derive(Args)]
pub struct ChatArgs {
    /// Create a project with this name and chat in its context.
    /// Its PRD is printed when the session ends.
    #[arg(long)]
    project: Option<String>,
}

pub async fn execute(global: &GlobalArgs, args: ChatArgs) -> Result<()> {
    let config = global.server_config()?;
    let ctx = global.app_context(&config)?;
    let orchestrator = ctx.orchestrator();

    let project_id = match args.project {
        Some(name) => {
            let project = ctx.projects().create(ctx.owner_id(), &name, None).await?;
            println!("Created project '{}' ({})", project.name, project.id);
            orchestrator.set_project_context(Some(project.id.to_string()))?;
            Some(project.id)
        }
        None => None,
    };

    let mode = if orchestrator.factory().is_stub() { "offline stub" } else { "backend" };
    println!("Forgebase PRD assistant ({} mode)", mode);
    println!("Type /reset to start over, /exit to quit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("you> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();

        match line {
            "" => continue,
            "/exit" | "/quit" => break,
            "/reset" => {
                orchestrator.reset().await?;
                if let Some(id) = project_id {
                    orchestrator.set_project_context(Some(id.to_string()))?;
                }
                println!("Conversation reset.\n");
                continue;
            }
            _ => {}
        }

        let mut chunks = orchestrator.send_message(line)?;
        print!("assistant> ");
        while let Some(chunk) = chunks.next().await {
            match chunk {
                Ok(text) => {
                    print!("{}", text);
                    std::io::stdout().flush()?;
                }
                Err(e) => {
                    println!();
                    eprintln!("Reply failed: {}", e);
                    break;
                }
            }
        }
        println!("\n");
    }

    if let Some(id) = project_id {
        let project = ctx.projects().get(id, ctx.owner_id()).await?;
        if project.prd.is_empty() {
            println!("No PRD was saved for '{}'.", project.name);
        } else {
            println!("--- PRD: {} ---\n{}", project.name, project.prd);
        }
    }

    info!("Chat session ended");
    Ok(())
}
