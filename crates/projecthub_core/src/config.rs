//! Runtime configuration for core callers.
//!
//! # Responsibility
//! - Describe storage, logging, reset-token and tag-limit settings.
//! - Load settings from serialized documents or `PROJECTHUB_*` variables.
//!
//! # Invariants
//! - Every field has a default; partial documents are accepted.
//! - Malformed values are reported, never silently replaced by defaults.

use crate::logging::default_log_level;
use crate::model::tag::MAX_TAGS_PER_PROJECT;
use crate::service::password_reset::{DEFAULT_RESET_LINK_BASE, RESET_TOKEN_TTL_MS};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

const ENV_DB_PATH: &str = "PROJECTHUB_DB_PATH";
const ENV_LOG_LEVEL: &str = "PROJECTHUB_LOG_LEVEL";
const ENV_LOG_DIR: &str = "PROJECTHUB_LOG_DIR";
const ENV_RESET_TOKEN_TTL_MS: &str = "PROJECTHUB_RESET_TOKEN_TTL_MS";
const ENV_RESET_LINK_BASE: &str = "PROJECTHUB_RESET_LINK_BASE";
const ENV_MAX_TAGS: &str = "PROJECTHUB_MAX_TAGS_PER_PROJECT";

/// Core settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file; `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling log files; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    pub reset_token_ttl_ms: i64,
    pub reset_link_base: String,
    pub max_tags_per_project: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            reset_token_ttl_ms: RESET_TOKEN_TTL_MS,
            reset_link_base: DEFAULT_RESET_LINK_BASE.to_string(),
            max_tags_per_project: MAX_TAGS_PER_PROJECT,
        }
    }
}

impl CoreConfig {
    /// Builds a config from defaults overlaid with process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from defaults overlaid with values from `lookup`.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(value) = read(ENV_DB_PATH) {
            config.db_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read(ENV_LOG_LEVEL) {
            config.log_level = value;
        }
        if let Some(value) = read(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read(ENV_RESET_TOKEN_TTL_MS) {
            config.reset_token_ttl_ms = parse_positive(ENV_RESET_TOKEN_TTL_MS, &value)?;
        }
        if let Some(value) = read(ENV_RESET_LINK_BASE) {
            config.reset_link_base = value;
        }
        if let Some(value) = read(ENV_MAX_TAGS) {
            config.max_tags_per_project = parse_positive(ENV_MAX_TAGS, &value)?;
        }
        Ok(config)
    }
}

fn parse_positive<T>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        }),
    }
}

/// Configuration loading failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}; expected a positive integer")
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::model::tag::MAX_TAGS_PER_PROJECT;
    use crate::service::password_reset::RESET_TOKEN_TTL_MS;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.reset_token_ttl_ms, RESET_TOKEN_TTL_MS);
        assert_eq!(config.max_tags_per_project, MAX_TAGS_PER_PROJECT);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = CoreConfig::from_lookup(lookup_from(&[
            ("PROJECTHUB_DB_PATH", "/tmp/projecthub.db"),
            ("PROJECTHUB_MAX_TAGS_PER_PROJECT", "5"),
            ("PROJECTHUB_LOG_LEVEL", "  "),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/projecthub.db")));
        assert_eq!(config.max_tags_per_project, 5);
        assert_eq!(config.log_level, CoreConfig::default().log_level);
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = CoreConfig::from_lookup(lookup_from(&[("PROJECTHUB_RESET_TOKEN_TTL_MS", "-1")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "PROJECTHUB_RESET_TOKEN_TTL_MS",
                ..
            }
        ));
    }

    #[test]
    fn partial_json_document_keeps_defaults() {
        let config: CoreConfig =
            serde_json::from_str(r#"{"max_tags_per_project": 3, "log_level": "warn"}"#).unwrap();
        assert_eq!(config.max_tags_per_project, 3);
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.reset_token_ttl_ms, RESET_TOKEN_TTL_MS);
    }
}
