//! Analysis repository contracts and SQLite implementation.

use crate::clock::DAY_MS;
use crate::model::analysis::Analysis;
use crate::repo::{ensure_tables, RepoResult};
use rusqlite::{params, Connection};

/// Repository interface for analysis snapshots.
pub trait AnalysisRepository {
    fn create_analysis(&self, analysis: &Analysis) -> RepoResult<()>;
    /// Counts analyses per UTC day in `[from_ms, until_ms)`.
    ///
    /// Returns `(day_start_ms, count)` pairs for days with at least one row,
    /// oldest first.
    fn count_by_day(&self, from_ms: i64, until_ms: i64) -> RepoResult<Vec<(i64, u32)>>;
}

/// SQLite-backed analysis repository.
pub struct SqliteAnalysisRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAnalysisRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["analyses"])?;
        Ok(Self { conn })
    }
}

impl AnalysisRepository for SqliteAnalysisRepository<'_> {
    fn create_analysis(&self, analysis: &Analysis) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO analyses (id, project_id, updated_at) VALUES (?1, ?2, ?3);",
            params![
                analysis.id.to_string(),
                analysis.project_id.to_string(),
                analysis.updated_at,
            ],
        )?;
        Ok(())
    }

    fn count_by_day(&self, from_ms: i64, until_ms: i64) -> RepoResult<Vec<(i64, u32)>> {
        // SQLite `%` truncates toward zero; floor to the UTC day like `utc_day_start`.
        let mut stmt = self.conn.prepare(
            "SELECT updated_at - (((updated_at % ?3) + ?3) % ?3) AS day_start, COUNT(*) AS total
             FROM analyses
             WHERE updated_at >= ?1 AND updated_at < ?2
             GROUP BY day_start
             ORDER BY day_start ASC;",
        )?;
        let mut rows = stmt.query(params![from_ms, until_ms, DAY_MS])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            counts.push((row.get("day_start")?, row.get("total")?));
        }
        Ok(counts)
    }
}
