//! Core domain logic for projecthub.
//! This crate is the single source of truth for project, edit-history, tag
//! and password-reset invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::account::{Account, AccountId, AccountValidationError};
pub use model::analysis::{Analysis, AnalysisId};
pub use model::edit::{Edit, EditError, EditId, EditState, EditableRecord};
pub use model::project::{Project, ProjectId, ProjectValidationError};
pub use model::tag::{TagValidationError, MAX_TAGS_PER_PROJECT};
pub use repo::account_repo::{AccountRepository, ResetTokenRecord, SqliteAccountRepository};
pub use repo::analysis_repo::{AnalysisRepository, SqliteAnalysisRepository};
pub use repo::edit_repo::{EditRepository, SqliteEditRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::tag_repo::{RelatedProject, SqliteTagRepository, TagRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::AccountService;
pub use service::edit_service::{EditService, EditServiceError};
pub use service::password_reset::{
    PasswordReset, PasswordResetError, PasswordResetService, ResetEmail, RESET_TOKEN_TTL_MS,
};
pub use service::project_service::{CreatedProject, ProjectService};
pub use service::spark_data::{SparkPoint, SPARK_DAYS};
pub use service::tag_service::{
    TagOverview, TagService, TagServiceError, TagStatus, UnauthorizedReason,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
