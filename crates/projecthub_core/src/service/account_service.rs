//! Account use-case service.

use crate::model::account::{Account, AccountId};
use crate::repo::account_repo::AccountRepository;
use crate::repo::RepoResult;

/// Use-case service wrapper for account operations.
pub struct AccountService<R: AccountRepository> {
    repo: R,
}

impl<R: AccountRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers an account and returns it.
    ///
    /// Duplicate login or e-mail yields `RepoError::AlreadyExists`.
    pub fn create_account(
        &self,
        login: impl Into<String>,
        email: impl Into<String>,
    ) -> RepoResult<Account> {
        let login: String = login.into();
        let email: String = email.into();
        let account = Account::new(login.trim(), email.trim());
        self.repo.create_account(&account)?;
        Ok(account)
    }

    pub fn get_account(&self, id: AccountId) -> RepoResult<Option<Account>> {
        self.repo.get_account(id)
    }

    pub fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        self.repo.find_account_by_email(email)
    }
}
