//! Project persistence port and the in-memory implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::project::Project;

/// Persistence for projects.
///
/// Every lookup is scoped by owner: a project owned by someone else is
/// indistinguishable from a missing one. Each call is a point operation;
/// nothing is transactional across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Store a new project. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, project: Project) -> CoreResult<Project>;

    /// Fetch a project by id for the given owner.
    async fn get(&self, id: Uuid, owner_id: &str) -> CoreResult<Option<Project>>;

    /// List the owner's projects, newest-created first.
    async fn list(&self, owner_id: &str) -> CoreResult<Vec<Project>>;

    /// Replace a stored project. Fails with `NotFound` if the id is absent
    /// for `project.owner_id`.
    async fn update(&self, project: Project) -> CoreResult<Project>;

    /// Remove a project. Returns whether anything was removed.
    async fn delete(&self, id: Uuid, owner_id: &str) -> CoreResult<bool>;
}

#[derive(Default)]
struct StoreInner {
    projects: HashMap<Uuid, StoredProject>,
    next_seq: u64,
}

struct StoredProject {
    // Insertion order breaks ties between equal creation timestamps.
    seq: u64,
    project: Project,
}

/// Process-local project store backed by a synchronized map.
///
/// Data is lost when the process exits.
#[derive(Default)]
pub struct InMemoryProjectStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryProjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored projects across all owners.
    pub fn len(&self) -> usize {
        self.inner.read().projects.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().projects.is_empty()
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn create(&self, project: Project) -> CoreResult<Project> {
        let mut inner = self.inner.write();
        if inner.projects.contains_key(&project.id) {
            return Err(CoreError::AlreadyExists(project.id.to_string()));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        debug!(project_id = %project.id, owner_id = %project.owner_id, "Storing project");
        inner.projects.insert(
            project.id,
            StoredProject {
                seq,
                project: project.clone(),
            },
        );
        Ok(project)
    }

    async fn get(&self, id: Uuid, owner_id: &str) -> CoreResult<Option<Project>> {
        let inner = self.inner.read();
        Ok(inner
            .projects
            .get(&id)
            .filter(|stored| stored.project.owner_id == owner_id)
            .map(|stored| stored.project.clone()))
    }

    async fn list(&self, owner_id: &str) -> CoreResult<Vec<Project>> {
        let inner = self.inner.read();
        let mut owned: Vec<&StoredProject> = inner
            .projects
            .values()
            .filter(|stored| stored.project.owner_id == owner_id)
            .collect();

        owned.sort_by(|a, b| {
            b.project
                .created_at
                .cmp(&a.project.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(owned.into_iter().map(|stored| stored.project.clone()).collect())
    }

    async fn update(&self, project: Project) -> CoreResult<Project> {
        let mut inner = self.inner.write();
        match inner.projects.get_mut(&project.id) {
            Some(stored) if stored.project.owner_id == project.owner_id => {
                debug!(project_id = %project.id, "Updating project");
                stored.project = project.clone();
                Ok(project)
            }
            _ => Err(CoreError::NotFound(project.id.to_string())),
        }
    }

    async fn delete(&self, id: Uuid, owner_id: &str) -> CoreResult<bool> {
        let mut inner = self.inner.write();
        let owned = inner
            .projects
            .get(&id)
            .is_some_and(|stored| stored.project.owner_id == owner_id);

        if owned {
            debug!(project_id = %id, "Deleting project");
            inner.projects.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = InMemoryProjectStore::new();
        let project = Project::new("alice", "Alpha", "").unwrap();

        store.create(project.clone()).await.unwrap();

        let fetched = store.get(project.id, "alice").await.unwrap();
        assert_eq!(fetched, Some(project));
    }

    #[tokio::test]
    async fn test_create_duplicate_id() {
        let store = InMemoryProjectStore::new();
        let project = Project::new("alice", "Alpha", "").unwrap();

        store.create(project.clone()).await.unwrap();
        let err = store.create(project.clone()).await.unwrap_err();

        assert_eq!(err, CoreError::AlreadyExists(project.id.to_string()));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_owner_scoping() {
        let store = InMemoryProjectStore::new();
        let project = Project::new("alice", "Alpha", "").unwrap();
        store.create(project.clone()).await.unwrap();

        assert!(store.get(project.id, "bob").await.unwrap().is_none());
        assert!(store.list("bob").await.unwrap().is_empty());
        assert!(!store.delete(project.id, "bob").await.unwrap());

        let mut stolen = project.clone();
        stolen.owner_id = "bob".to_string();
        assert!(store.update(stolen).await.unwrap_err().is_not_found());

        assert!(store.get(project.id, "alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = InMemoryProjectStore::new();
        let p1 = store.create(Project::new("alice", "P1", "").unwrap()).await.unwrap();
        let p2 = store.create(Project::new("alice", "P2", "").unwrap()).await.unwrap();
        let p3 = store.create(Project::new("alice", "P3", "").unwrap()).await.unwrap();

        let ids: Vec<Uuid> = store
            .list("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![p3.id, p2.id, p1.id]);
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = InMemoryProjectStore::new();
        let project = Project::new("alice", "Ghost", "").unwrap();

        let err = store.update(project).await.unwrap_err();
        assert!(err.is_not_found());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let store = InMemoryProjectStore::new();
        let project = store
            .create(Project::new("alice", "Doomed", "").unwrap())
            .await
            .unwrap();

        assert!(store.delete(project.id, "alice").await.unwrap());
        assert!(store.get(project.id, "alice").await.unwrap().is_none());
        assert!(!store.delete(project.id, "alice").await.unwrap());
        assert!(!store.delete(Uuid::new_v4(), "alice").await.unwrap());
    }
}
