//! Role discovery and one-shot specialist calls.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use forge_agents::Role;
use forge_chat::{ChatError, SpecialistReport};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppContext;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/", get(list_agents))
        .route("/:role/ask", post(ask_agent))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub prompt: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
}

/// GET /api/agents
async fn list_agents(State(ctx): State<AppContext>) -> Json<BTreeMap<String, String>> {
    Json(ctx.orchestrator().list_roles())
}

/// POST /api/agents/:role/ask
#[instrument(skip(ctx, request), fields(role = %role))]
async fn ask_agent(
    State(ctx): State<AppContext>,
    Path(role): Path<String>,
    Json(request): Json<AskRequest>,
) -> Result<Json<SpecialistReport>, ApiError> {
    let role: Role = role.parse().map_err(ChatError::from)?;
    let report = ctx
        .orchestrator()
        .ask_in_project(role, &request.prompt, request.project_id.map(|id| id.to_string()))
        .await?;
    Ok(Json(report))
}
