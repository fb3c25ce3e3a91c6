//! Forgebase CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Configuration error

use std::process::ExitCode;

use clap::Parser;
use forge_chat::ChatError;
use forge_server::ServerError;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const CONFIG_ERROR: u8 = 2;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // A missing .env is fine; real env vars always win.
    let dotenv = dotenvy::dotenv();

    let default_level = if cli.debug { "forge=debug,info" } else { "forge=info,warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .try_init();

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "Loaded .env");
    }

    let result = match cli.command {
        Commands::Chat(args) => commands::chat::execute(&cli.global, args).await,
        Commands::Serve(args) => commands::serve::execute(&cli.global, args).await,
        Commands::Roles(args) => commands::roles::execute(args).await,
        Commands::Ask(args) => commands::ask::execute(&cli.global, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

fn categorize_error(e: &anyhow::Error) -> u8 {
    let is_config = e.chain().any(|cause| {
        matches!(cause.downcast_ref::<ServerError>(), Some(ServerError::Config(_) | ServerError::ConfigParse(_)))
            || cause
                .downcast_ref::<ChatError>()
                .is_some_and(ChatError::is_configuration)
    });

    if is_config {
        ExitCodes::CONFIG_ERROR
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
