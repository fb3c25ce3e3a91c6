//! Serve command - Run the HTTP API until Ctrl-C.

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, warn};

use super::GlobalArgs;

#[derive(Args)]
pub struct ServeArgs {
    /// Bind host (overrides config and FORGE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Bind port (overrides config and FORGE_PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

pub async fn execute(global: &GlobalArgs, args: ServeArgs) -> Result<()> {
    let mut config = global.server_config()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    let ctx = global.app_context(&config)?;
    info!(
        addr = %config.bind_addr(),
        origins = ?config.cors_origins,
        stub = ctx.orchestrator().factory().is_stub(),
        "Starting server"
    );

    forge_server::serve(&config, ctx, shutdown_signal())
        .await
        .with_context(|| format!("Server on {} failed", config.bind_addr()))
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => warn!(error = %e, "Cannot listen for Ctrl-C"),
    }
}
