//! Project domain model.
//!
//! # Responsibility
//! - Define the project record that edits, tags and analyses point at.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another project.
//! - `deleted` is the source of truth for tombstone state.
//! - `name` is non-empty after trimming and at most `PROJECT_NAME_MAX_CHARS`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Upper bound for project display names, in characters.
pub const PROJECT_NAME_MAX_CHARS: usize = 100;

/// Project record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub name: String,
    pub description: Option<String>,
    /// When set, only project managers may edit project metadata such as tags.
    pub managers_only: bool,
    /// Soft delete tombstone. Undoing the project's create edit sets it.
    pub deleted: bool,
}

impl Project {
    /// Creates a new active project with a generated id.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_id(Uuid::new_v4(), name)
    }

    /// Creates a new active project with a caller-provided id.
    pub fn with_id(id: ProjectId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            managers_only: false,
            deleted: false,
        }
    }

    /// Marks this project as softly deleted.
    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.deleted = false;
    }

    /// Returns whether this project is visible.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Validates write-time invariants.
    pub fn validate(&self) -> Result<(), ProjectValidationError> {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        let chars = trimmed.chars().count();
        if chars > PROJECT_NAME_MAX_CHARS {
            return Err(ProjectValidationError::NameTooLong { chars });
        }
        Ok(())
    }
}

/// Project write validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectValidationError {
    EmptyName,
    NameTooLong { chars: usize },
}

impl Display for ProjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "project name cannot be empty"),
            Self::NameTooLong { chars } => write!(
                f,
                "project name has {chars} characters; at most {PROJECT_NAME_MAX_CHARS} allowed"
            ),
        }
    }
}

impl Error for ProjectValidationError {}
