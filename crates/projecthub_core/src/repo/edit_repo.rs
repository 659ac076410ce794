//! Edit history repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Read edit history and load edits together with their target project.
//! - Persist the outcome of an undo/redo (edit row + project flag) atomically.
//!
//! # Invariants
//! - `save_editable` writes both rows in one immediate transaction or neither.
//! - Edit rows are never deleted here.

use crate::model::account::AccountId;
use crate::model::edit::{Edit, EditId, EditableRecord};
use crate::model::project::ProjectId;
use crate::repo::account_repo::account_exists;
use crate::repo::project_repo::{load_project, write_project_deleted};
use crate::repo::{
    bool_to_int, ensure_tables, parse_flag, parse_optional_uuid, parse_uuid, RepoError, RepoResult,
};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const EDIT_SELECT_SQL: &str = "SELECT
    id,
    project_id,
    account_id,
    undone,
    undone_by,
    created_at
FROM edits";

/// Repository interface for edit history and undo/redo persistence.
pub trait EditRepository {
    fn get_edit(&self, id: EditId) -> RepoResult<Option<Edit>>;
    /// Lists edits of one project, oldest first.
    fn list_project_edits(&self, project_id: ProjectId) -> RepoResult<Vec<Edit>>;
    /// Loads an edit and its target, including tombstoned targets.
    fn load_editable(&self, id: EditId) -> RepoResult<Option<EditableRecord>>;
    /// Persists edit state and target `deleted` flag in one transaction.
    fn save_editable(&mut self, record: &EditableRecord) -> RepoResult<()>;
    fn account_exists(&self, id: AccountId) -> RepoResult<bool>;
}

/// SQLite-backed edit repository.
pub struct SqliteEditRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteEditRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["edits", "projects", "accounts"])?;
        Ok(Self { conn })
    }
}

impl EditRepository for SqliteEditRepository<'_> {
    fn get_edit(&self, id: EditId) -> RepoResult<Option<Edit>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EDIT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_edit_row(row)?));
        }
        Ok(None)
    }

    fn list_project_edits(&self, project_id: ProjectId) -> RepoResult<Vec<Edit>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EDIT_SELECT_SQL}
             WHERE project_id = ?1
             ORDER BY created_at ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([project_id.to_string()])?;
        let mut edits = Vec::new();
        while let Some(row) = rows.next()? {
            edits.push(parse_edit_row(row)?);
        }
        Ok(edits)
    }

    fn load_editable(&self, id: EditId) -> RepoResult<Option<EditableRecord>> {
        let Some(edit) = self.get_edit(id)? else {
            return Ok(None);
        };
        let project = load_project(self.conn, edit.project_id, true)?.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "edit {} refers to missing project {}",
                edit.id, edit.project_id
            ))
        })?;
        let record = EditableRecord::new(edit, project)
            .map_err(|err| RepoError::InvalidData(err.to_string()))?;
        Ok(Some(record))
    }

    fn save_editable(&mut self, record: &EditableRecord) -> RepoResult<()> {
        let edit = record.edit();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let changed = tx.execute(
            "UPDATE edits
             SET
                undone = ?2,
                undone_by = ?3
             WHERE id = ?1;",
            params![
                edit.id.to_string(),
                bool_to_int(edit.undone),
                edit.undone_by.map(|id| id.to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(edit.id));
        }
        write_project_deleted(&tx, record.target())?;

        tx.commit()?;
        Ok(())
    }

    fn account_exists(&self, id: AccountId) -> RepoResult<bool> {
        account_exists(self.conn, id)
    }
}

pub(crate) fn insert_edit(conn: &Connection, edit: &Edit) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO edits (id, project_id, account_id, undone, undone_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            edit.id.to_string(),
            edit.project_id.to_string(),
            edit.account_id.map(|id| id.to_string()),
            bool_to_int(edit.undone),
            edit.undone_by.map(|id| id.to_string()),
            edit.created_at,
        ],
    )?;
    Ok(())
}

fn parse_edit_row(row: &Row<'_>) -> RepoResult<Edit> {
    let id_text: String = row.get("id")?;
    let project_text: String = row.get("project_id")?;
    Ok(Edit {
        id: parse_uuid(&id_text, "edits.id")?,
        project_id: parse_uuid(&project_text, "edits.project_id")?,
        account_id: parse_optional_uuid(row.get("account_id")?, "edits.account_id")?,
        undone: parse_flag(row.get("undone")?, "edits.undone")?,
        undone_by: parse_optional_uuid(row.get("undone_by")?, "edits.undone_by")?,
        created_at: row.get("created_at")?,
    })
}
