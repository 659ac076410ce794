//! Password-reset token issuance and verification.
//!
//! # Responsibility
//! - Issue a fresh reset token for the account owning an e-mail address.
//! - Build the reset e-mail payload; delivery happens outside core.
//! - Verify presented tokens against their expiry.
//!
//! # Invariants
//! - Issuing a token replaces every previous token of the account.
//! - A token expires exactly `ttl_ms` after issuance (4 hours by default).
//! - E-mail addresses and token values are never logged.
//! - Presented tokens are compared in constant time.

use crate::clock::HOUR_MS;
use crate::config::CoreConfig;
use crate::model::account::{is_valid_email, AccountId};
use crate::repo::account_repo::{AccountRepository, ResetTokenRecord};
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Default lifetime of a reset token.
pub const RESET_TOKEN_TTL_MS: i64 = 4 * HOUR_MS;
/// Default base URL for reset links.
pub const DEFAULT_RESET_LINK_BASE: &str = "http://localhost:3000/password_resets";

/// Non-persisted reset request, as submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordReset {
    email: String,
}

impl PasswordReset {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Reset e-mail payload handed to the mail delivery layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetEmail {
    pub account_id: AccountId,
    pub recipient: String,
    pub token: String,
    /// Unix epoch milliseconds.
    pub expires_at: i64,
    pub link: String,
}

/// Service error for password-reset use-cases.
#[derive(Debug)]
pub enum PasswordResetError {
    InvalidEmail,
    AccountNotFound,
    InvalidToken,
    ExpiredToken,
    Repo(RepoError),
}

impl Display for PasswordResetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email address is not valid"),
            Self::AccountNotFound => write!(f, "no account uses this email address"),
            Self::InvalidToken => write!(f, "reset token is not valid"),
            Self::ExpiredToken => write!(f, "reset token has expired"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for PasswordResetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PasswordResetError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::AccountNotFound,
            other => Self::Repo(other),
        }
    }
}

/// Password-reset facade over an account repository.
pub struct PasswordResetService<R: AccountRepository> {
    repo: R,
    ttl_ms: i64,
    link_base: String,
}

impl<R: AccountRepository> PasswordResetService<R> {
    /// Creates a service with the default 4 hour TTL and link base.
    pub fn new(repo: R) -> Self {
        Self::with_settings(repo, RESET_TOKEN_TTL_MS, DEFAULT_RESET_LINK_BASE)
    }

    /// Creates a service using the reset TTL and link base from `config`.
    pub fn from_config(repo: R, config: &CoreConfig) -> Self {
        Self::with_settings(
            repo,
            config.reset_token_ttl_ms,
            config.reset_link_base.as_str(),
        )
    }

    pub fn with_settings(repo: R, ttl_ms: i64, link_base: impl Into<String>) -> Self {
        Self {
            repo,
            ttl_ms,
            link_base: link_base.into(),
        }
    }

    /// Issues a fresh token for the account behind `reset` and returns the
    /// e-mail payload carrying the reset link.
    pub fn refresh_token_and_email_link(
        &mut self,
        reset: &PasswordReset,
        now_ms: i64,
    ) -> Result<ResetEmail, PasswordResetError> {
        if !is_valid_email(reset.email()) {
            return Err(PasswordResetError::InvalidEmail);
        }
        let account = self
            .repo
            .find_account_by_email(reset.email())?
            .ok_or(PasswordResetError::AccountNotFound)?;

        let token = generate_token();
        let expires_at = now_ms.saturating_add(self.ttl_ms);
        self.repo.replace_reset_tokens(
            account.id,
            &[ResetTokenRecord {
                token: token.clone(),
                expires_at,
            }],
        )?;
        info!(
            "event=password_reset_issue module=password_reset status=ok account_id={} expires_at={expires_at}",
            account.id
        );

        let link = format!("{}/{token}", self.link_base.trim_end_matches('/'));
        Ok(ResetEmail {
            account_id: account.id,
            recipient: account.email,
            token,
            expires_at,
            link,
        })
    }

    /// Returns the account owning `token` when it is known and unexpired.
    pub fn verify_token(
        &self,
        email: &str,
        token: &str,
        now_ms: i64,
    ) -> Result<AccountId, PasswordResetError> {
        let account = self
            .repo
            .find_account_by_email(email)?
            .ok_or(PasswordResetError::InvalidToken)?;
        let record = self
            .repo
            .list_reset_tokens(account.id)?
            .into_iter()
            .find(|record| tokens_match(&record.token, token))
            .ok_or(PasswordResetError::InvalidToken)?;

        if now_ms >= record.expires_at {
            return Err(PasswordResetError::ExpiredToken);
        }
        Ok(account.id)
    }
}

fn tokens_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}
