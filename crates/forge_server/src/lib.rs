//! # forge_server
//!
//! HTTP surface for Forgebase: chat streaming over SSE, project CRUD and
//! specialist agent calls, all served from one [`AppContext`].

pub mod api;
pub mod config;
pub mod error;
pub mod state;

use std::future::Future;

use tokio::net::TcpListener;
use tracing::info;

pub use api::router;
pub use config::ServerConfig;
pub use error::{ApiError, ErrorResponse, ServerError, ServerResult};
pub use state::AppContext;

/// Bind and serve until `shutdown` resolves.
pub async fn serve<F>(config: &ServerConfig, ctx: AppContext, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(ctx, &config.cors_origins);
    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "Forgebase API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Server stopped");
    Ok(())
}
