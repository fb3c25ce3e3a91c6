//! Project service: validation and update rules over a [`ProjectStore`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::project::{validate_project_name, Project};
use crate::store::ProjectStore;

/// Partial update for a project. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub prd: Option<String>,
}

impl ProjectUpdate {
    /// Update only the name.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            prd: None,
        }
    }

    /// Update only the PRD text.
    pub fn prd(prd: impl Into<String>) -> Self {
        Self {
            name: None,
            prd: Some(prd.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.prd.is_none()
    }
}

/// Orchestrates project CRUD, rejecting invalid input before it reaches the store.
#[derive(Clone)]
pub struct ProjectService {
    store: Arc<dyn ProjectStore>,
}

impl ProjectService {
    pub fn new(store: Arc<dyn ProjectStore>) -> Self {
        Self { store }
    }

    /// The underlying store, shared with tools.
    pub fn store(&self) -> Arc<dyn ProjectStore> {
        self.store.clone()
    }

    /// Create a project for `owner_id`. The PRD defaults to empty.
    pub async fn create(
        &self,
        owner_id: &str,
        name: &str,
        prd: Option<String>,
    ) -> CoreResult<Project> {
        let project = Project::new(owner_id, name, prd.unwrap_or_default())?;
        let project = self.store.create(project).await?;
        info!(project_id = %project.id, owner_id, "Created project");
        Ok(project)
    }

    /// Get a project, failing with `NotFound` if absent.
    pub async fn get(&self, id: Uuid, owner_id: &str) -> CoreResult<Project> {
        self.store
            .get(id, owner_id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Get a project, returning `None` if absent.
    pub async fn find(&self, id: Uuid, owner_id: &str) -> CoreResult<Option<Project>> {
        self.store.get(id, owner_id).await
    }

    /// List the owner's projects, newest first.
    pub async fn list(&self, owner_id: &str) -> CoreResult<Vec<Project>> {
        self.store.list(owner_id).await
    }

    /// Apply a partial update.
    ///
    /// A supplied name is validated before the store is consulted.
    /// Every supplied field stamps `updated_at`, even if its value is unchanged.
    pub async fn update(
        &self,
        id: Uuid,
        owner_id: &str,
        update: ProjectUpdate,
    ) -> CoreResult<Project> {
        if let Some(name) = &update.name {
            validate_project_name(name)?;
        }

        let mut project = self.get(id, owner_id).await?;

        if let Some(name) = update.name {
            project.rename(name)?;
        }
        if let Some(prd) = update.prd {
            project.set_prd(prd);
        }

        let project = self.store.update(project).await?;
        debug!(project_id = %project.id, "Updated project");
        Ok(project)
    }

    /// Delete a project. Returns `false` if nothing was there.
    pub async fn delete(&self, id: Uuid, owner_id: &str) -> CoreResult<bool> {
        let deleted = self.store.delete(id, owner_id).await?;
        info!(project_id = %id, owner_id, deleted, "Delete project");
        Ok(deleted)
    }
}
