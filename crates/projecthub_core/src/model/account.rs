//! Account domain model.
//!
//! # Invariants
//! - `login` is non-empty after trimming.
//! - `email` has a `local@domain.tld` shape; lookups compare case-insensitively.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for an account. Also the "editor account" identity.
pub type AccountId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Registered user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub login: String,
    pub email: String,
}

impl Account {
    /// Creates an account with a generated id.
    pub fn new(login: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            login: login.into(),
            email: email.into(),
        }
    }

    /// Validates write-time invariants.
    pub fn validate(&self) -> Result<(), AccountValidationError> {
        if self.login.trim().is_empty() {
            return Err(AccountValidationError::EmptyLogin);
        }
        if !is_valid_email(&self.email) {
            return Err(AccountValidationError::InvalidEmail);
        }
        Ok(())
    }
}

/// Returns whether `value` looks like a deliverable e-mail address.
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value.trim())
}

/// Account write validation failure.
///
/// Variants carry no user input so they are safe to log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountValidationError {
    EmptyLogin,
    InvalidEmail,
}

impl Display for AccountValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLogin => write!(f, "account login cannot be empty"),
            Self::InvalidEmail => write!(f, "account email is not a valid address"),
        }
    }
}

impl Error for AccountValidationError {}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, Account, AccountValidationError};

    #[test]
    fn email_shape_is_checked() {
        assert!(is_valid_email("admin@example.com"));
        assert!(is_valid_email("  user.name+tag@sub.example.org "));
        assert!(!is_valid_email("admin"));
        assert!(!is_valid_email("admin@localhost"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[test]
    fn validate_rejects_blank_login() {
        let account = Account::new(" ", "admin@example.com");
        assert_eq!(account.validate(), Err(AccountValidationError::EmptyLogin));
    }
}
