//! Integration tests for project lifecycle rules.

use std::sync::Arc;

use forge_core::{
    CoreError, InMemoryProjectStore, ProjectService, ProjectStore, ProjectUpdate,
    PROJECT_NAME_MAX_LEN,
};
use uuid::Uuid;

const OWNER: &str = "test-user-123";

fn setup() -> (Arc<InMemoryProjectStore>, ProjectService) {
    let store = Arc::new(InMemoryProjectStore::new());
    let service = ProjectService::new(store.clone());
    (store, service)
}

/// Valid names survive a create/get round trip unchanged.
#[tokio::test]
async fn test_create_then_get_preserves_name() {
    let (_, service) = setup();
    let names = [
        "a".to_string(),
        "Task App".to_string(),
        "x".repeat(PROJECT_NAME_MAX_LEN),
        "Ünïcödé ✓".to_string(),
    ];

    for name in names {
        let created = service.create(OWNER, &name, None).await.unwrap();
        let fetched = service.get(created.id, OWNER).await.unwrap();
        assert_eq!(fetched.name, name);
        assert!(!fetched.id.is_nil());
    }
}

/// Invalid names are rejected and nothing is persisted or changed.
#[tokio::test]
async fn test_invalid_names_rejected() {
    let (store, service) = setup();
    let invalid = [
        String::new(),
        " ".to_string(),
        "\t\n  ".to_string(),
        "x".repeat(PROJECT_NAME_MAX_LEN + 1),
    ];

    for name in &invalid {
        let err = service.create(OWNER, name, None).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)), "{:?}", name);
    }
    assert!(store.is_empty());

    let project = service.create(OWNER, "Keeper", None).await.unwrap();
    for name in &invalid {
        let err = service
            .update(project.id, OWNER, ProjectUpdate::name(name.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
    assert_eq!(service.get(project.id, OWNER).await.unwrap(), project);
}

#[tokio::test]
async fn test_list_reverse_creation_order() {
    let (_, service) = setup();
    let p1 = service.create(OWNER, "P1", None).await.unwrap();
    let p2 = service.create(OWNER, "P2", None).await.unwrap();
    let p3 = service.create(OWNER, "P3", None).await.unwrap();

    let listed: Vec<Uuid> = service
        .list(OWNER)
        .await
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();

    assert_eq!(listed, vec![p3.id, p2.id, p1.id]);
}

/// Each rename moves `updated_at` strictly forward.
#[tokio::test]
async fn test_rename_round_trip() {
    let (_, service) = setup();
    let project = service.create(OWNER, "Original", None).await.unwrap();

    let first = service
        .update(project.id, OWNER, ProjectUpdate::name("First"))
        .await
        .unwrap();
    assert_eq!(service.get(project.id, OWNER).await.unwrap().name, "First");
    assert!(first.updated_at.unwrap() > project.created_at);

    let second = service
        .update(project.id, OWNER, ProjectUpdate::name("Second"))
        .await
        .unwrap();
    assert_eq!(service.get(project.id, OWNER).await.unwrap().name, "Second");
    assert!(second.updated_at.unwrap() > first.updated_at.unwrap());
}

#[tokio::test]
async fn test_delete_is_not_an_error_when_absent() {
    let (_, service) = setup();
    let project = service.create(OWNER, "Short-lived", None).await.unwrap();

    assert!(service.delete(project.id, OWNER).await.unwrap());
    assert!(service.find(project.id, OWNER).await.unwrap().is_none());
    assert!(service.get(project.id, OWNER).await.unwrap_err().is_not_found());

    assert!(!service.delete(project.id, OWNER).await.unwrap());
    assert!(!service.delete(Uuid::new_v4(), OWNER).await.unwrap());
}

#[tokio::test]
async fn test_service_shares_store() {
    let (store, service) = setup();
    let project = service.create(OWNER, "Shared", None).await.unwrap();

    let via_store = store.get(project.id, OWNER).await.unwrap();
    assert_eq!(via_store, Some(project));
}
