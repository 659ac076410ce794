//! Project tag repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Maintain `taggings` between projects and normalized `tags`.
//! - Answer access checks and related-project queries for tag use-cases.
//!
//! # Invariants
//! - Tag names reaching this layer are already normalized.
//! - The per-project limit is checked and the tag inserted in one transaction.
//! - Related-project queries never return the source project or tombstones.

use crate::model::account::AccountId;
use crate::model::project::ProjectId;
use crate::repo::account_repo::account_exists;
use crate::repo::project_repo::{is_project_manager, load_project};
use crate::repo::{ensure_tables, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

/// Editing-relevant view of a project for one (optional) actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectAccess {
    pub managers_only: bool,
    pub actor_is_manager: bool,
}

/// Outcome of adding one tag to a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagAddOutcome {
    Added,
    AlreadyPresent,
    LimitReached,
}

/// Project sharing at least one tag with another project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedProject {
    pub project_id: ProjectId,
    pub name: String,
    pub shared_tags: u32,
}

/// Repository interface for project tag operations.
pub trait TagRepository {
    /// Returns `None` for unknown or tombstoned projects.
    fn project_access(
        &self,
        project_id: ProjectId,
        actor: Option<AccountId>,
    ) -> RepoResult<Option<ProjectAccess>>;
    /// Whether `actor` is a registered account.
    fn actor_exists(&self, actor: AccountId) -> RepoResult<bool>;
    /// Tag names of one project, sorted.
    fn project_tags(&self, project_id: ProjectId) -> RepoResult<Vec<String>>;
    fn add_project_tag(
        &mut self,
        project_id: ProjectId,
        name: &str,
        max_tags: usize,
    ) -> RepoResult<TagAddOutcome>;
    /// Returns whether a tagging was removed.
    fn remove_project_tag(&mut self, project_id: ProjectId, name: &str) -> RepoResult<bool>;
    fn related_projects(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> RepoResult<Vec<RelatedProject>>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTagRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(
            conn,
            &["tags", "taggings", "projects", "project_managers", "accounts"],
        )?;
        Ok(Self { conn })
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn project_access(
        &self,
        project_id: ProjectId,
        actor: Option<AccountId>,
    ) -> RepoResult<Option<ProjectAccess>> {
        let Some(project) = load_project(self.conn, project_id, false)? else {
            return Ok(None);
        };
        let actor_is_manager = match actor {
            Some(account_id) => is_project_manager(self.conn, project_id, account_id)?,
            None => false,
        };
        Ok(Some(ProjectAccess {
            managers_only: project.managers_only,
            actor_is_manager,
        }))
    }

    fn actor_exists(&self, actor: AccountId) -> RepoResult<bool> {
        account_exists(self.conn, actor)
    }

    fn project_tags(&self, project_id: ProjectId) -> RepoResult<Vec<String>> {
        load_tag_names(self.conn, &project_id.to_string())
    }

    fn add_project_tag(
        &mut self,
        project_id: ProjectId,
        name: &str,
        max_tags: usize,
    ) -> RepoResult<TagAddOutcome> {
        let project_text = project_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_project_in_tx(&tx, project_id)?;

        let existing = load_tag_names(&tx, &project_text)?;
        if existing.iter().any(|tag| tag == name) {
            return Ok(TagAddOutcome::AlreadyPresent);
        }
        if existing.len() >= max_tags {
            return Ok(TagAddOutcome::LimitReached);
        }

        tx.execute("INSERT OR IGNORE INTO tags (name) VALUES (?1);", [name])?;
        tx.execute(
            "INSERT INTO taggings (project_id, tag_id)
             SELECT ?1, id
             FROM tags
             WHERE name = ?2 COLLATE NOCASE;",
            params![project_text.as_str(), name],
        )?;
        touch_project(&tx, &project_text)?;

        tx.commit()?;
        Ok(TagAddOutcome::Added)
    }

    fn remove_project_tag(&mut self, project_id: ProjectId, name: &str) -> RepoResult<bool> {
        let project_text = project_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        ensure_project_in_tx(&tx, project_id)?;

        let removed = tx.execute(
            "DELETE FROM taggings
             WHERE project_id = ?1
               AND tag_id IN (SELECT id FROM tags WHERE name = ?2 COLLATE NOCASE);",
            params![project_text.as_str(), name],
        )?;
        if removed > 0 {
            touch_project(&tx, &project_text)?;
        }

        tx.commit()?;
        Ok(removed > 0)
    }

    fn related_projects(
        &self,
        project_id: ProjectId,
        limit: u32,
    ) -> RepoResult<Vec<RelatedProject>> {
        let mut stmt = self.conn.prepare(
            "SELECT p.id, p.name, COUNT(*) AS shared_tags
             FROM taggings mine
             INNER JOIN taggings other
                ON other.tag_id = mine.tag_id
               AND other.project_id <> mine.project_id
             INNER JOIN projects p ON p.id = other.project_id
             WHERE mine.project_id = ?1
               AND p.deleted = 0
             GROUP BY p.id, p.name
             ORDER BY shared_tags DESC, p.name COLLATE NOCASE ASC, p.id ASC
             LIMIT ?2;",
        )?;
        let mut rows = stmt.query(params![project_id.to_string(), i64::from(limit)])?;
        let mut related = Vec::new();
        while let Some(row) = rows.next()? {
            let id_text: String = row.get("id")?;
            related.push(RelatedProject {
                project_id: parse_uuid(&id_text, "projects.id")?,
                name: row.get("name")?,
                shared_tags: row.get("shared_tags")?,
            });
        }
        Ok(related)
    }
}

fn load_tag_names(conn: &Connection, project_id: &str) -> RepoResult<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT t.name
         FROM taggings tg
         INNER JOIN tags t ON t.id = tg.tag_id
         WHERE tg.project_id = ?1
         ORDER BY t.name COLLATE NOCASE ASC;",
    )?;
    let mut rows = stmt.query([project_id])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(value.to_lowercase());
    }
    Ok(tags)
}

fn ensure_project_in_tx(tx: &Transaction<'_>, project_id: ProjectId) -> RepoResult<()> {
    match load_project(tx, project_id, false)? {
        Some(_) => Ok(()),
        None => Err(RepoError::NotFound(project_id)),
    }
}

fn touch_project(tx: &Transaction<'_>, project_id: &str) -> RepoResult<()> {
    tx.execute(
        "UPDATE projects
         SET updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;",
        [project_id],
    )?;
    Ok(())
}
