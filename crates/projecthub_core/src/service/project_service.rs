//! Project use-case service.
//!
//! # Responsibility
//! - Create projects together with their create edit.
//! - Expose reload/list and manager-permission entry points.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.

use crate::clock::now_epoch_ms;
use crate::model::account::AccountId;
use crate::model::edit::Edit;
use crate::model::project::{Project, ProjectId};
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoResult;
use log::info;

/// A newly created project and the edit that records its creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProject {
    pub project: Project,
    pub edit: Edit,
}

/// Use-case service wrapper for project operations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an active project and records a create edit for `creator`.
    pub fn create_project(
        &mut self,
        name: impl Into<String>,
        creator: Option<AccountId>,
    ) -> RepoResult<CreatedProject> {
        let name: String = name.into();
        let project = Project::new(name.trim());
        let edit = Edit::for_creation(project.id, creator, now_epoch_ms());
        self.repo.create_project(&project, &edit)?;
        info!(
            "event=project_create module=project status=ok project_id={} edit_id={}",
            project.id, edit.id
        );
        Ok(CreatedProject { project, edit })
    }

    /// Reloads one project from storage.
    pub fn get_project(
        &self,
        id: ProjectId,
        include_deleted: bool,
    ) -> RepoResult<Option<Project>> {
        self.repo.get_project(id, include_deleted)
    }

    pub fn list_projects(&self, include_deleted: bool) -> RepoResult<Vec<Project>> {
        self.repo.list_projects(include_deleted)
    }

    /// Limits tag and metadata editing to project managers.
    pub fn restrict_to_managers(&self, id: ProjectId, managers_only: bool) -> RepoResult<()> {
        self.repo.set_managers_only(id, managers_only)
    }

    pub fn add_manager(&self, project_id: ProjectId, account_id: AccountId) -> RepoResult<()> {
        self.repo.add_manager(project_id, account_id)
    }

    pub fn is_manager(&self, project_id: ProjectId, account_id: AccountId) -> RepoResult<bool> {
        self.repo.is_manager(project_id, account_id)
    }
}
