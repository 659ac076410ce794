//! Edit history model and the undo/redo protocol.
//!
//! # Responsibility
//! - Describe one recorded change (`Edit`) applied to a project.
//! - Pair an edit with its target (`EditableRecord`) and apply reversible
//!   undo/redo transitions to both.
//!
//! # Invariants
//! - Undo and redo require an editor identity passed with that very call.
//! - A rejected call leaves both the edit and the target untouched.
//! - Target state is `Active` or `Undone`; undo moves Active -> Undone and
//!   redo moves Undone -> Active. No other transitions exist.
//! - Only the target's `deleted` flag is reversed; edits never carry diffs.

use crate::model::account::AccountId;
use crate::model::project::{Project, ProjectId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an edit history entry.
pub type EditId = Uuid;

/// Observable state of an edit and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    Active,
    Undone,
}

/// One historical change: the creation of a project.
///
/// Undoing it tombstones the project; redoing it brings the project back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub id: EditId,
    pub project_id: ProjectId,
    /// Account that made the original change, when known.
    pub account_id: Option<AccountId>,
    pub undone: bool,
    /// Account that performed the most recent undo.
    pub undone_by: Option<AccountId>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Edit {
    /// Records the creation of `project_id`.
    pub fn for_creation(
        project_id: ProjectId,
        account_id: Option<AccountId>,
        created_at: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            account_id,
            undone: false,
            undone_by: None,
            created_at,
        }
    }

    pub fn state(&self) -> EditState {
        if self.undone {
            EditState::Undone
        } else {
            EditState::Active
        }
    }
}

/// Undo/redo failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// No editor identity was supplied for this call.
    NoEditorAccount,
    /// Undo requested on an edit that is already undone.
    AlreadyUndone(EditId),
    /// Redo requested on an edit that is not undone.
    NotUndone(EditId),
    /// The edit does not refer to the supplied project.
    TargetMismatch { edit_id: EditId, project_id: ProjectId },
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEditorAccount => write!(f, "an editor account is required to undo or redo"),
            Self::AlreadyUndone(id) => write!(f, "edit {id} is already undone"),
            Self::NotUndone(id) => write!(f, "edit {id} is not undone"),
            Self::TargetMismatch {
                edit_id,
                project_id,
            } => write!(f, "edit {edit_id} does not target project {project_id}"),
        }
    }
}

impl Error for EditError {}

/// An edit together with the project it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableRecord {
    edit: Edit,
    target: Project,
}

impl EditableRecord {
    /// Pairs an edit with its target project.
    pub fn new(edit: Edit, target: Project) -> Result<Self, EditError> {
        if edit.project_id != target.id {
            return Err(EditError::TargetMismatch {
                edit_id: edit.id,
                project_id: target.id,
            });
        }
        Ok(Self { edit, target })
    }

    pub fn edit(&self) -> &Edit {
        &self.edit
    }

    pub fn target(&self) -> &Project {
        &self.target
    }

    pub fn state(&self) -> EditState {
        self.edit.state()
    }

    pub fn into_parts(self) -> (Edit, Project) {
        (self.edit, self.target)
    }

    /// Reverses the recorded change: the target becomes deleted.
    ///
    /// # Errors
    /// - `NoEditorAccount` when `editor` is `None`.
    /// - `AlreadyUndone` when the edit is already undone.
    pub fn do_undo(&mut self, editor: Option<AccountId>) -> Result<(), EditError> {
        let editor = editor.ok_or(EditError::NoEditorAccount)?;
        if self.edit.undone {
            return Err(EditError::AlreadyUndone(self.edit.id));
        }

        self.target.mark_deleted();
        self.edit.undone = true;
        self.edit.undone_by = Some(editor);
        Ok(())
    }

    /// Reapplies the recorded change: the target is no longer deleted.
    ///
    /// # Errors
    /// - `NoEditorAccount` when `editor` is `None`.
    /// - `NotUndone` when the edit has not been undone.
    pub fn do_redo(&mut self, editor: Option<AccountId>) -> Result<(), EditError> {
        editor.ok_or(EditError::NoEditorAccount)?;
        if !self.edit.undone {
            return Err(EditError::NotUndone(self.edit.id));
        }

        self.target.restore();
        self.edit.undone = false;
        self.edit.undone_by = None;
        Ok(())
    }
}
