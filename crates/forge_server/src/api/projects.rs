//! Project CRUD endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use forge_core::{Project, ProjectUpdate};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use super::StatusResponse;
use crate::error::ApiError;
use crate::state::AppContext;

pub fn router() -> Router<AppContext> {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route(
            "/:project_id",
            get(get_project)
                .patch(update_project)
                .put(update_project)
                .delete(delete_project),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub prd: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub prd: Option<String>,
}

/// Project as seen by the frontend. The owner is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: Uuid,
    pub name: String,
    pub prd: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            name: project.name,
            prd: project.prd,
            created_at: project.created_at,
            updated_at: project.updated_at,
        }
    }
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::unprocessable(format!("Invalid project ID: {}", raw)))
}

/// POST /api/projects
#[instrument(skip(ctx, request), fields(name = %request.name))]
async fn create_project(
    State(ctx): State<AppContext>,
    Json(request): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>), ApiError> {
    let project = ctx
        .projects()
        .create(ctx.owner_id(), &request.name, request.prd)
        .await?;
    Ok((StatusCode::CREATED, Json(project.into())))
}

/// GET /api/projects
async fn list_projects(
    State(ctx): State<AppContext>,
) -> Result<Json<Vec<ProjectResponse>>, ApiError> {
    let projects = ctx.projects().list(ctx.owner_id()).await?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

/// GET /api/projects/:project_id
async fn get_project(
    State(ctx): State<AppContext>,
    Path(project_id): Path<String>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let id = parse_id(&project_id)?;
    let project = ctx.projects().get(id, ctx.owner_id()).await?;
    Ok(Json(project.into()))
}

/// PATCH or PUT /api/projects/:project_id
#[instrument(skip(ctx, request), fields(project_id = %project_id))]
async fn update_project(
    State(ctx): State<AppContext>,
    Path(project_id): Path<String>,
    Json(request): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>, ApiError> {
    let id = parse_id(&project_id)?;
    let update = ProjectUpdate {
        name: request.name,
        prd: request.prd,
    };
    let project = ctx.projects().update(id, ctx.owner_id(), update).await?;
    Ok(Json(project.into()))
}

/// DELETE /api/projects/:project_id
#[instrument(skip(ctx), fields(project_id = %project_id))]
async fn delete_project(
    State(ctx): State<AppContext>,
    Path(project_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let id = parse_id(&project_id)?;
    if !ctx.projects().delete(id, ctx.owner_id()).await? {
        return Err(ApiError::not_found(format!("Project not found: {}", id)));
    }
    Ok(StatusResponse::new("deleted"))
}
