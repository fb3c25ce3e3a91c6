//! Registry and context-isolation tests over the built-in tools.

use std::sync::Arc;

use forge_agents::{
    register_builtin_tools, AgentError, RoleRegistry, ToolArgs, ToolEnv, ToolRegistry,
};
use forge_core::{InMemoryProjectStore, Project, ProjectStore};

const OWNER: &str = "test-user-123";

fn builtin_registry(store: Arc<InMemoryProjectStore>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    register_builtin_tools(&mut registry, ToolEnv::new(store, OWNER)).unwrap();
    registry
}

#[test]
fn test_builtin_tools_cover_standard_roles() {
    let registry = builtin_registry(Arc::new(InMemoryProjectStore::new()));
    assert_eq!(registry.len(), 9);
    RoleRegistry::standard().validate_tools(&registry).unwrap();
}

#[test]
fn test_duplicate_registration_is_rejected() {
    let store = Arc::new(InMemoryProjectStore::new());
    let mut registry = builtin_registry(store.clone());
    let again = registry.resolve("get_project_data").unwrap().instantiate();

    let err = registry.register(again.clone()).unwrap_err();
    assert!(matches!(err, AgentError::DuplicateTool(name) if name == "get_project_data"));

    let previous = registry.replace(again.clone());
    assert!(previous.is_some());
    assert!(Arc::ptr_eq(&registry.resolve("get_project_data").unwrap(), &again));
}

#[test]
fn test_resolve_many_fails_fast() {
    let registry = builtin_registry(Arc::new(InMemoryProjectStore::new()));

    let resolved = registry
        .resolve_many(&["save_draft_prd", "check_completeness"])
        .unwrap();
    assert_eq!(resolved.len(), 2);
    assert_eq!(resolved["save_draft_prd"].name(), "save_draft_prd");

    let err = registry
        .resolve_many(&["save_draft_prd", "summon_dragon", "also_missing"])
        .err()
        .unwrap();
    assert!(matches!(err, AgentError::ToolNotFound(name) if name == "summon_dragon"));
}

#[test]
fn test_list_names_sorted() {
    let registry = builtin_registry(Arc::new(InMemoryProjectStore::new()));
    let names = registry.list_names();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"validate_requirements".to_string()));
}

/// Setting the context on one agent's instance leaves other instances alone.
#[tokio::test]
async fn test_instances_have_isolated_context() {
    let store = Arc::new(InMemoryProjectStore::new());
    let alpha = store
        .create(Project::new(OWNER, "Alpha", "").unwrap())
        .await
        .unwrap();
    let registry = builtin_registry(store.clone());

    let prototype = registry.resolve("save_draft_prd").unwrap();
    let first = prototype.instantiate();
    let second = prototype.instantiate();

    first
        .context_aware()
        .unwrap()
        .set_project_context(Some(alpha.id.to_string()));

    assert_eq!(
        first.context_aware().unwrap().project_context(),
        Some(alpha.id.to_string())
    );
    assert_eq!(second.context_aware().unwrap().project_context(), None);
    assert_eq!(prototype.context_aware().unwrap().project_context(), None);

    let result = second
        .execute(ToolArgs::new().with("content", "should not land"))
        .await
        .unwrap();
    assert_eq!(result["status"], "error");

    first
        .execute(ToolArgs::new().with("content", "# Overview\nv1"))
        .await
        .unwrap();
    let stored = store.get(alpha.id, OWNER).await.unwrap().unwrap();
    assert_eq!(stored.prd, "# Overview\nv1");
}

#[tokio::test]
async fn test_specs_advertise_schemas() {
    let registry = builtin_registry(Arc::new(InMemoryProjectStore::new()));
    for name in registry.list_names() {
        let spec = registry.resolve(&name).unwrap().spec();
        assert_eq!(spec.name, name);
        assert!(!spec.description.is_empty());
        assert_eq!(spec.parameters["type"], "object");
    }
}
