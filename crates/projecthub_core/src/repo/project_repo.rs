//! Project repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist projects together with the edit that created them.
//! - Own project permission data (`managers_only`, project managers).
//!
//! # Invariants
//! - A project row and its create edit are written in one transaction.
//! - Reads with `include_deleted = false` never return tombstoned projects.

use crate::model::account::AccountId;
use crate::model::edit::Edit;
use crate::model::project::{Project, ProjectId};
use crate::repo::edit_repo::insert_edit;
use crate::repo::{bool_to_int, ensure_tables, parse_flag, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const PROJECT_SELECT_SQL: &str = "SELECT
    id,
    name,
    description,
    managers_only,
    deleted
FROM projects";

/// Repository interface for project persistence and permissions.
pub trait ProjectRepository {
    /// Inserts `project` and its create `edit` atomically.
    fn create_project(&mut self, project: &Project, edit: &Edit) -> RepoResult<()>;
    /// Loads one project; tombstoned rows only when `include_deleted`.
    fn get_project(&self, id: ProjectId, include_deleted: bool) -> RepoResult<Option<Project>>;
    /// Lists projects ordered by name.
    fn list_projects(&self, include_deleted: bool) -> RepoResult<Vec<Project>>;
    /// Restricts (or opens) metadata editing to project managers.
    fn set_managers_only(&self, id: ProjectId, managers_only: bool) -> RepoResult<()>;
    /// Grants manager rights; granting twice is a no-op.
    fn add_manager(&self, project_id: ProjectId, account_id: AccountId) -> RepoResult<()>;
    fn is_manager(&self, project_id: ProjectId, account_id: AccountId) -> RepoResult<bool>;
}

/// SQLite-backed project repository.
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["projects", "edits", "project_managers"])?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&mut self, project: &Project, edit: &Edit) -> RepoResult<()> {
        project.validate()?;
        if edit.project_id != project.id {
            return Err(RepoError::InvalidData(format!(
                "create edit {} does not target project {}",
                edit.id, project.id
            )));
        }

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO projects (id, name, description, managers_only, deleted)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                project.id.to_string(),
                project.name.trim(),
                project.description.as_deref(),
                bool_to_int(project.managers_only),
                bool_to_int(project.deleted),
            ],
        )?;
        insert_edit(&tx, edit)?;
        tx.commit()?;
        Ok(())
    }

    fn get_project(&self, id: ProjectId, include_deleted: bool) -> RepoResult<Option<Project>> {
        load_project(self.conn, id, include_deleted)
    }

    fn list_projects(&self, include_deleted: bool) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL}
             WHERE (?1 = 1 OR deleted = 0)
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([bool_to_int(include_deleted)])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }

    fn set_managers_only(&self, id: ProjectId, managers_only: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                managers_only = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?1;",
            params![id.to_string(), bool_to_int(managers_only)],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn add_manager(&self, project_id: ProjectId, account_id: AccountId) -> RepoResult<()> {
        if load_project(self.conn, project_id, true)?.is_none() {
            return Err(RepoError::NotFound(project_id));
        }
        self.conn.execute(
            "INSERT OR IGNORE INTO project_managers (project_id, account_id)
             VALUES (?1, ?2);",
            params![project_id.to_string(), account_id.to_string()],
        )?;
        Ok(())
    }

    fn is_manager(&self, project_id: ProjectId, account_id: AccountId) -> RepoResult<bool> {
        is_project_manager(self.conn, project_id, account_id)
    }
}

pub(crate) fn load_project(
    conn: &Connection,
    id: ProjectId,
    include_deleted: bool,
) -> RepoResult<Option<Project>> {
    let mut stmt = conn.prepare(&format!(
        "{PROJECT_SELECT_SQL}
         WHERE id = ?1
           AND (?2 = 1 OR deleted = 0);"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), bool_to_int(include_deleted)])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_project_row(row)?));
    }
    Ok(None)
}

/// Writes the soft-delete flag of `project`.
pub(crate) fn write_project_deleted(conn: &Connection, project: &Project) -> RepoResult<()> {
    let changed = conn.execute(
        "UPDATE projects
         SET
            deleted = ?2,
            updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        params![project.id.to_string(), bool_to_int(project.deleted)],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(project.id));
    }
    Ok(())
}

pub(crate) fn is_project_manager(
    conn: &Connection,
    project_id: ProjectId,
    account_id: AccountId,
) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM project_managers
            WHERE project_id = ?1 AND account_id = ?2
        );",
        params![project_id.to_string(), account_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let id_text: String = row.get("id")?;
    let project = Project {
        id: parse_uuid(&id_text, "projects.id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        managers_only: parse_flag(row.get("managers_only")?, "projects.managers_only")?,
        deleted: parse_flag(row.get("deleted")?, "projects.deleted")?,
    };
    project.validate()?;
    Ok(project)
}
