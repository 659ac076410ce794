//! Undo/redo use-case service.
//!
//! # Responsibility
//! - Load an edit with its target, apply undo/redo and persist the result.
//! - Surface the missing-editor guard as a distinct error.
//!
//! # Invariants
//! - The editor identity is a per-call argument; nothing is cached.
//! - Failed calls write nothing: the transition is applied in memory first
//!   and persisted only when it succeeds.

use crate::model::account::AccountId;
use crate::model::edit::{Edit, EditError, EditId, EditableRecord};
use crate::model::project::ProjectId;
use crate::repo::edit_repo::EditRepository;
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error for undo/redo use-cases.
#[derive(Debug)]
pub enum EditServiceError {
    /// Protocol rejection, including `EditError::NoEditorAccount`.
    Edit(EditError),
    EditNotFound(EditId),
    /// The supplied editor does not reference a known account.
    EditorNotFound(AccountId),
    Repo(RepoError),
}

impl EditServiceError {
    /// Returns whether the call failed because no editor was supplied.
    pub fn is_no_editor_account(&self) -> bool {
        matches!(self, Self::Edit(EditError::NoEditorAccount))
    }
}

impl Display for EditServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit(err) => write!(f, "{err}"),
            Self::EditNotFound(id) => write!(f, "edit not found: {id}"),
            Self::EditorNotFound(id) => write!(f, "editor account not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EditServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Edit(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::EditNotFound(_) | Self::EditorNotFound(_) => None,
        }
    }
}

impl From<EditError> for EditServiceError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

impl From<RepoError> for EditServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Undo,
    Redo,
}

impl Direction {
    fn event(self) -> &'static str {
        match self {
            Self::Undo => "edit_undo",
            Self::Redo => "edit_redo",
        }
    }
}

/// Undo/redo facade over an edit repository.
pub struct EditService<R: EditRepository> {
    repo: R,
}

impl<R: EditRepository> EditService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Undoes `edit_id` on behalf of `editor`; the target becomes deleted.
    ///
    /// # Errors
    /// - `Edit(NoEditorAccount)` when `editor` is `None`.
    /// - `EditorNotFound` when `editor` is not a known account.
    /// - `Edit(AlreadyUndone)` when the edit is already undone.
    pub fn do_undo(
        &mut self,
        edit_id: EditId,
        editor: Option<AccountId>,
    ) -> Result<EditableRecord, EditServiceError> {
        self.apply(edit_id, editor, Direction::Undo)
    }

    /// Redoes `edit_id` on behalf of `editor`; the target is restored.
    ///
    /// Same error contract as [`EditService::do_undo`], with `NotUndone`
    /// replacing `AlreadyUndone`.
    pub fn do_redo(
        &mut self,
        edit_id: EditId,
        editor: Option<AccountId>,
    ) -> Result<EditableRecord, EditServiceError> {
        self.apply(edit_id, editor, Direction::Redo)
    }

    pub fn get_edit(&self, edit_id: EditId) -> RepoResult<Option<Edit>> {
        self.repo.get_edit(edit_id)
    }

    /// Lists the edit history of one project, oldest first.
    pub fn list_project_edits(&self, project_id: ProjectId) -> RepoResult<Vec<Edit>> {
        self.repo.list_project_edits(project_id)
    }

    fn apply(
        &mut self,
        edit_id: EditId,
        editor: Option<AccountId>,
        direction: Direction,
    ) -> Result<EditableRecord, EditServiceError> {
        let event = direction.event();
        let result = self.try_apply(edit_id, editor, direction);
        match &result {
            Ok(record) => info!(
                "event={event} module=edit status=ok edit_id={edit_id} project_id={}",
                record.target().id
            ),
            Err(err) => warn!(
                "event={event} module=edit status=rejected edit_id={edit_id} error={err}"
            ),
        }
        result
    }

    fn try_apply(
        &mut self,
        edit_id: EditId,
        editor: Option<AccountId>,
        direction: Direction,
    ) -> Result<EditableRecord, EditServiceError> {
        let editor_id = editor.ok_or(EditError::NoEditorAccount)?;
        let mut record = self
            .repo
            .load_editable(edit_id)?
            .ok_or(EditServiceError::EditNotFound(edit_id))?;
        if !self.repo.account_exists(editor_id)? {
            return Err(EditServiceError::EditorNotFound(editor_id));
        }

        match direction {
            Direction::Undo => record.do_undo(editor)?,
            Direction::Redo => record.do_redo(editor)?,
        }
        self.repo.save_editable(&record)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::{EditService, EditServiceError};
    use crate::model::account::AccountId;
    use crate::model::edit::{Edit, EditId, EditableRecord};
    use crate::model::project::{Project, ProjectId};
    use crate::repo::edit_repo::EditRepository;
    use crate::repo::{RepoError, RepoResult};
    use uuid::Uuid;

    /// Holds one record in memory; saving reports the target project missing.
    struct VanishingTargetRepo {
        record: EditableRecord,
    }

    impl EditRepository for VanishingTargetRepo {
        fn get_edit(&self, id: EditId) -> RepoResult<Option<Edit>> {
            Ok(Some(self.record.edit().clone()).filter(|edit| edit.id == id))
        }

        fn list_project_edits(&self, _project_id: ProjectId) -> RepoResult<Vec<Edit>> {
            Ok(vec![self.record.edit().clone()])
        }

        fn load_editable(&self, id: EditId) -> RepoResult<Option<EditableRecord>> {
            Ok(Some(self.record.clone()).filter(|record| record.edit().id == id))
        }

        fn save_editable(&mut self, record: &EditableRecord) -> RepoResult<()> {
            Err(RepoError::NotFound(record.target().id))
        }

        fn account_exists(&self, _id: AccountId) -> RepoResult<bool> {
            Ok(true)
        }
    }

    #[test]
    fn missing_target_on_save_is_not_reported_as_missing_edit() {
        let project = Project::new("Red");
        let project_id = project.id;
        let edit = Edit::for_creation(project.id, None, 0);
        let edit_id = edit.id;
        let record = EditableRecord::new(edit, project).unwrap();
        let mut service = EditService::new(VanishingTargetRepo { record });

        let err = service.do_undo(edit_id, Some(Uuid::new_v4())).unwrap_err();
        assert!(matches!(
            err,
            EditServiceError::Repo(RepoError::NotFound(id)) if id == project_id
        ));

        let err = service
            .do_undo(Uuid::new_v4(), Some(Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, EditServiceError::EditNotFound(_)));
    }
}
