//! REST API routes.

pub mod agents;
pub mod chat;
pub mod projects;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppContext;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: &str) -> Json<Self> {
        Json(Self {
            status: status.to_string(),
        })
    }
}

/// Build the full router over `ctx`.
pub fn router(ctx: AppContext, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .nest("/api/chat", chat::router())
        .nest("/api/projects", projects::router())
        .nest("/api/agents", agents::router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(ctx)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

/// GET /api/health
async fn health() -> Json<StatusResponse> {
    StatusResponse::new("healthy")
}
