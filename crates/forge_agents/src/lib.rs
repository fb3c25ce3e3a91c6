//! Forgebase agent building blocks.
//!
//! - [`RoleRegistry`]: the closed set of roles, their instructions and tool lists
//! - [`ToolRegistry`]: name-keyed tools the roles bind to
//! - the built-in project tools, all operating on a shared [`forge_core::ProjectStore`]

pub mod error;
pub mod roles;
pub mod tools;

pub use error::{AgentError, AgentResult};
pub use roles::{Role, RoleConfig, RoleRegistry};
pub use tools::{
    register_builtin_tools, ContextAware, ProjectContext, Tool, ToolArgs, ToolEnv, ToolRegistry,
    ToolSpec,
};
