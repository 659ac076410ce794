//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist accounts and look them up by id or e-mail.
//! - Own the account's password-reset token set.
//!
//! # Invariants
//! - Login and e-mail are unique, compared case-insensitively.
//! - `replace_reset_tokens` swaps the whole token set in one transaction.

use crate::model::account::{Account, AccountId};
use crate::repo::{ensure_tables, map_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row, TransactionBehavior};

const ACCOUNT_SELECT_SQL: &str = "SELECT id, login, email FROM accounts";

/// One issued password-reset token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetTokenRecord {
    pub token: String,
    /// Unix epoch milliseconds after which the token is rejected.
    pub expires_at: i64,
}

/// Repository interface for accounts and their reset tokens.
pub trait AccountRepository {
    fn create_account(&self, account: &Account) -> RepoResult<AccountId>;
    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>>;
    fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>>;
    /// Replaces every reset token of `account_id` with `tokens`.
    fn replace_reset_tokens(
        &mut self,
        account_id: AccountId,
        tokens: &[ResetTokenRecord],
    ) -> RepoResult<()>;
    fn list_reset_tokens(&self, account_id: AccountId) -> RepoResult<Vec<ResetTokenRecord>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["accounts", "reset_password_tokens"])?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, account: &Account) -> RepoResult<AccountId> {
        account.validate()?;
        self.conn
            .execute(
                "INSERT INTO accounts (id, login, email) VALUES (?1, ?2, ?3);",
                params![
                    account.id.to_string(),
                    account.login.trim(),
                    account.email.trim(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "account"))?;
        Ok(account.id)
    }

    fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }
        Ok(None)
    }

    fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ACCOUNT_SELECT_SQL} WHERE email = ?1 COLLATE NOCASE;"))?;
        let mut rows = stmt.query([email.trim()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_account_row(row)?));
        }
        Ok(None)
    }

    fn replace_reset_tokens(
        &mut self,
        account_id: AccountId,
        tokens: &[ResetTokenRecord],
    ) -> RepoResult<()> {
        let account_text = account_id.to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if !account_exists(&tx, account_id)? {
            return Err(RepoError::NotFound(account_id));
        }

        tx.execute(
            "DELETE FROM reset_password_tokens WHERE account_id = ?1;",
            [account_text.as_str()],
        )?;
        for token in tokens {
            tx.execute(
                "INSERT INTO reset_password_tokens (account_id, token, expires_at)
                 VALUES (?1, ?2, ?3);",
                params![account_text.as_str(), token.token.as_str(), token.expires_at],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn list_reset_tokens(&self, account_id: AccountId) -> RepoResult<Vec<ResetTokenRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT token, expires_at
             FROM reset_password_tokens
             WHERE account_id = ?1
             ORDER BY expires_at DESC, token ASC;",
        )?;
        let mut rows = stmt.query([account_id.to_string()])?;
        let mut tokens = Vec::new();
        while let Some(row) = rows.next()? {
            tokens.push(ResetTokenRecord {
                token: row.get("token")?,
                expires_at: row.get("expires_at")?,
            });
        }
        Ok(tokens)
    }
}

/// Returns whether an account row with `id` exists.
pub(crate) fn account_exists(conn: &Connection, id: AccountId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn parse_account_row(row: &Row<'_>) -> RepoResult<Account> {
    let id_text: String = row.get("id")?;
    Ok(Account {
        id: parse_uuid(&id_text, "accounts.id")?,
        login: row.get("login")?,
        email: row.get("email")?,
    })
}
