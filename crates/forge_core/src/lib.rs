//! # forge_core
//!
//! Project domain model for Forgebase.
//!
//! A project is a named container for a Product Requirements Document (PRD)
//! that grows through conversation with the PRD assistant.
//!
//! # Architecture
//!
//! - **Project**: the entity, with name validation and timestamp stamping
//! - **ProjectStore**: async persistence port, always scoped by owner
//! - **InMemoryProjectStore**: synchronized map implementation of the port
//! - **ProjectService**: validation and update rules on top of a store
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use forge_core::{InMemoryProjectStore, ProjectService, ProjectUpdate};
//!
//! let service = ProjectService::new(Arc::new(InMemoryProjectStore::new()));
//! let project = service.create("owner-1", "Task App", None).await?;
//! let project = service
//!     .update(project.id, "owner-1", ProjectUpdate::prd("v1"))
//!     .await?;
//! ```

pub mod error;
pub mod project;
pub mod service;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use project::{parse_project_id, validate_project_name, Project, PROJECT_NAME_MAX_LEN};
pub use service::{ProjectService, ProjectUpdate};
pub use store::{InMemoryProjectStore, ProjectStore};
