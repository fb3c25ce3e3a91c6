//! The project entity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};

/// Maximum project name length, in characters.
pub const PROJECT_NAME_MAX_LEN: usize = 255;

/// A project owned by a single user, holding the PRD text built up in chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub prd: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a new project with a fresh id and creation timestamp.
    ///
    /// `updated_at` stays empty until the first mutation.
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        prd: impl Into<String>,
    ) -> CoreResult<Self> {
        let name = name.into();
        validate_project_name(&name)?;

        Ok(Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name,
            prd: prd.into(),
            created_at: Utc::now(),
            updated_at: None,
        })
    }

    /// Rename the project and stamp `updated_at`.
    pub fn rename(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let name = name.into();
        validate_project_name(&name)?;
        self.name = name;
        self.touch();
        Ok(())
    }

    /// Replace the PRD text and stamp `updated_at`.
    pub fn set_prd(&mut self, prd: impl Into<String>) {
        self.prd = prd.into();
        self.touch();
    }

    /// Last time anything about this project changed.
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    // Timestamps must strictly increase even when the clock has not ticked.
    fn touch(&mut self) {
        let floor = self.last_modified();
        let now = Utc::now();
        self.updated_at = Some(if now > floor {
            now
        } else {
            floor + Duration::microseconds(1)
        });
    }
}

/// Check that a project name is non-blank and at most [`PROJECT_NAME_MAX_LEN`] characters.
pub fn validate_project_name(name: &str) -> CoreResult<()> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("Project name cannot be empty"));
    }
    if name.chars().count() > PROJECT_NAME_MAX_LEN {
        return Err(CoreError::validation(format!(
            "Project name too long (maximum {} characters)",
            PROJECT_NAME_MAX_LEN
        )));
    }
    Ok(())
}

/// Parse a textual project id. A malformed id can never match a project,
/// so it is reported as not found.
pub fn parse_project_id(raw: &str) -> CoreResult<Uuid> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| CoreError::NotFound(format!("{} (invalid project ID format)", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new("owner", "Task App", "").unwrap();
        assert_eq!(project.name, "Task App");
        assert_eq!(project.prd, "");
        assert!(project.updated_at.is_none());
        assert_eq!(project.last_modified(), project.created_at);
    }

    #[test]
    fn test_name_validation() {
        assert!(validate_project_name("a").is_ok());
        assert!(validate_project_name(&"x".repeat(255)).is_ok());

        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("   \t\n").is_err());
        assert!(validate_project_name(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_name_length_counts_characters() {
        // 255 multi-byte characters is still a valid name
        let name = "é".repeat(255);
        assert!(name.len() > 255);
        assert!(validate_project_name(&name).is_ok());
    }

    #[test]
    fn test_mutations_stamp_strictly_increasing() {
        let mut project = Project::new("owner", "Original", "").unwrap();

        project.set_prd("v1");
        let first = project.updated_at.unwrap();
        assert!(first > project.created_at);

        project.rename("Renamed").unwrap();
        let second = project.updated_at.unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_invalid_rename_leaves_project_unchanged() {
        let mut project = Project::new("owner", "Original", "").unwrap();
        let before = project.clone();

        assert!(project.rename("  ").is_err());
        assert_eq!(project, before);
    }

    #[test]
    fn test_parse_project_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_project_id(&id.to_string()).unwrap(), id);

        let err = parse_project_id("not-a-uuid").unwrap_err();
        assert!(err.is_not_found());
    }
}
