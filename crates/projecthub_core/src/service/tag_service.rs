//! Project tag use-case service.
//!
//! # Responsibility
//! - Authorize tag edits (signed-in actor, manager-only projects).
//! - Normalize tag names and enforce the per-project tag limit.
//! - Provide tag list, related-project and remaining-capacity views.
//!
//! # Invariants
//! - Authorization is checked before the tag name is even parsed.
//! - An actor id with no matching account counts as not signed in.
//! - Adding a tag the project already has succeeds and changes nothing.
//! - Rejected calls leave the project's tag list untouched.

use crate::config::CoreConfig;
use crate::model::account::AccountId;
use crate::model::project::ProjectId;
use crate::model::tag::{
    format_tag_list, normalize_tag_name, TagValidationError, MAX_TAGS_PER_PROJECT,
};
use crate::repo::tag_repo::{RelatedProject, TagAddOutcome, TagRepository};
use crate::repo::RepoError;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RELATED_PROJECTS_LIMIT: u32 = 10;

/// Why an actor may not edit a project's tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedReason {
    NotSignedIn,
    NotManager,
}

/// Service error for tag use-cases.
#[derive(Debug)]
pub enum TagServiceError {
    Unauthorized(UnauthorizedReason),
    InvalidTag(TagValidationError),
    TagLimitReached { max: usize },
    ProjectNotFound(ProjectId),
    Repo(RepoError),
}

impl Display for TagServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized(UnauthorizedReason::NotSignedIn) => {
                write!(f, "sign in to edit project tags")
            }
            Self::Unauthorized(UnauthorizedReason::NotManager) => {
                write!(f, "only project managers may edit this project's tags")
            }
            Self::InvalidTag(err) => write!(f, "{err}"),
            Self::TagLimitReached { max } => write!(f, "a project may carry at most {max} tags"),
            Self::ProjectNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TagServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTag(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TagServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ProjectNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<TagValidationError> for TagServiceError {
    fn from(value: TagValidationError) -> Self {
        Self::InvalidTag(value)
    }
}

/// Remaining tag capacity of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagStatus {
    pub remaining: usize,
    /// Human-readable summary, e.g. `19 tags remaining`.
    pub message: String,
}

/// Tags of a project plus projects related through shared tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagOverview {
    pub tags: Vec<String>,
    pub related: Vec<RelatedProject>,
}

/// Tag facade over a tag repository.
pub struct TagService<R: TagRepository> {
    repo: R,
    max_tags: usize,
}

impl<R: TagRepository> TagService<R> {
    /// Creates a service enforcing `MAX_TAGS_PER_PROJECT`.
    pub fn new(repo: R) -> Self {
        Self::with_max_tags(repo, MAX_TAGS_PER_PROJECT)
    }

    /// Creates a service enforcing `config.max_tags_per_project`.
    pub fn from_config(repo: R, config: &CoreConfig) -> Self {
        Self::with_max_tags(repo, config.max_tags_per_project)
    }

    pub fn with_max_tags(repo: R, max_tags: usize) -> Self {
        Self { repo, max_tags }
    }

    /// Adds one tag and returns the resulting tag list.
    pub fn add_tag(
        &mut self,
        project_id: ProjectId,
        actor: Option<AccountId>,
        raw_name: &str,
    ) -> Result<String, TagServiceError> {
        self.authorize(project_id, actor)?;
        let name = normalize_tag_name(raw_name)?;

        match self.repo.add_project_tag(project_id, &name, self.max_tags)? {
            TagAddOutcome::Added => {
                info!("event=tag_add module=tag status=ok project_id={project_id} tag={name}");
            }
            TagAddOutcome::AlreadyPresent => {
                debug!("event=tag_add module=tag status=noop project_id={project_id} tag={name}");
            }
            TagAddOutcome::LimitReached => {
                return Err(TagServiceError::TagLimitReached {
                    max: self.max_tags,
                });
            }
        }
        self.tag_list(project_id)
    }

    /// Removes one tag and returns the resulting tag list.
    ///
    /// Removing a tag the project does not carry is a no-op.
    pub fn remove_tag(
        &mut self,
        project_id: ProjectId,
        actor: Option<AccountId>,
        raw_name: &str,
    ) -> Result<String, TagServiceError> {
        self.authorize(project_id, actor)?;
        let name = normalize_tag_name(raw_name)?;

        if self.repo.remove_project_tag(project_id, &name)? {
            info!("event=tag_remove module=tag status=ok project_id={project_id} tag={name}");
        }
        self.tag_list(project_id)
    }

    /// Returns the project's tags as a sorted, space-separated list.
    pub fn tag_list(&self, project_id: ProjectId) -> Result<String, TagServiceError> {
        let tags = self.tags(project_id)?;
        Ok(format_tag_list(tags.as_slice()))
    }

    /// Lists visible projects sharing tags with `project_id`.
    pub fn related_projects(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<RelatedProject>, TagServiceError> {
        self.ensure_visible(project_id)?;
        Ok(self
            .repo
            .related_projects(project_id, RELATED_PROJECTS_LIMIT)?)
    }

    pub fn overview(&self, project_id: ProjectId) -> Result<TagOverview, TagServiceError> {
        let tags = self.tags(project_id)?;
        let related = self
            .repo
            .related_projects(project_id, RELATED_PROJECTS_LIMIT)?;
        Ok(TagOverview { tags, related })
    }

    /// Reports how many more tags the project can carry.
    pub fn status(&self, project_id: ProjectId) -> Result<TagStatus, TagServiceError> {
        let used = self.tags(project_id)?.len();
        let remaining = self.max_tags.saturating_sub(used);
        Ok(TagStatus {
            remaining,
            message: remaining_message(remaining),
        })
    }

    fn tags(&self, project_id: ProjectId) -> Result<Vec<String>, TagServiceError> {
        self.ensure_visible(project_id)?;
        Ok(self.repo.project_tags(project_id)?)
    }

    fn ensure_visible(&self, project_id: ProjectId) -> Result<(), TagServiceError> {
        match self.repo.project_access(project_id, None)? {
            Some(_) => Ok(()),
            None => Err(TagServiceError::ProjectNotFound(project_id)),
        }
    }

    fn authorize(
        &self,
        project_id: ProjectId,
        actor: Option<AccountId>,
    ) -> Result<(), TagServiceError> {
        let Some(actor_id) = actor else {
            return Err(TagServiceError::Unauthorized(
                UnauthorizedReason::NotSignedIn,
            ));
        };
        if !self.repo.actor_exists(actor_id)? {
            return Err(TagServiceError::Unauthorized(
                UnauthorizedReason::NotSignedIn,
            ));
        }
        let access = self
            .repo
            .project_access(project_id, Some(actor_id))?
            .ok_or(TagServiceError::ProjectNotFound(project_id))?;
        if access.managers_only && !access.actor_is_manager {
            return Err(TagServiceError::Unauthorized(
                UnauthorizedReason::NotManager,
            ));
        }
        Ok(())
    }
}

fn remaining_message(remaining: usize) -> String {
    let word = if remaining == 1 { "tag" } else { "tags" };
    format!("{remaining} {word} remaining")
}

#[cfg(test)]
mod tests {
    use super::remaining_message;

    #[test]
    fn remaining_message_pluralizes() {
        assert_eq!(remaining_message(0), "0 tags remaining");
        assert_eq!(remaining_message(1), "1 tag remaining");
        assert_eq!(remaining_message(19), "19 tags remaining");
    }
}
