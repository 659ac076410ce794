//! Project tag naming policy.
//!
//! # Invariants
//! - Persisted tag names are trimmed and lowercased.
//! - Names are 1..=`TAG_NAME_MAX_CHARS` characters of `[a-z0-9_+.#-]` and
//!   start with a letter or digit.
//! - A project carries at most `MAX_TAGS_PER_PROJECT` tags.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum number of tags one project may carry.
pub const MAX_TAGS_PER_PROJECT: usize = 20;
/// Maximum tag name length, in characters.
pub const TAG_NAME_MAX_CHARS: usize = 50;

static TAG_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9_+.#-]*$").expect("valid tag name regex"));

/// Tag name rejected by the naming policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    Empty,
    TooLong { chars: usize },
    InvalidCharacters(String),
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "tag name cannot be empty"),
            Self::TooLong { chars } => write!(
                f,
                "tag name has {chars} characters; at most {TAG_NAME_MAX_CHARS} allowed"
            ),
            Self::InvalidCharacters(value) => {
                write!(f, "tag name `{value}` contains unsupported characters")
            }
        }
    }
}

impl Error for TagValidationError {}

/// Normalizes one raw tag name, or explains why it is rejected.
pub fn normalize_tag_name(raw: &str) -> Result<String, TagValidationError> {
    let normalized = raw.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(TagValidationError::Empty);
    }

    let chars = normalized.chars().count();
    if chars > TAG_NAME_MAX_CHARS {
        return Err(TagValidationError::TooLong { chars });
    }

    if !TAG_NAME_RE.is_match(&normalized) {
        return Err(TagValidationError::InvalidCharacters(normalized));
    }

    Ok(normalized)
}

/// Formats tag names as a sorted, deduplicated, space-separated list.
pub fn format_tag_list<S: AsRef<str>>(tags: &[S]) -> String {
    tags.iter()
        .map(|tag| tag.as_ref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{format_tag_list, normalize_tag_name, TagValidationError};

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_tag_name("  Tasty ").unwrap(), "tasty");
        assert_eq!(normalize_tag_name("c++").unwrap(), "c++");
        assert_eq!(normalize_tag_name("C#").unwrap(), "c#");
        assert_eq!(normalize_tag_name("ruby-on-rails").unwrap(), "ruby-on-rails");
    }

    #[test]
    fn normalize_rejects_garbage() {
        assert!(matches!(
            normalize_tag_name("$π@µµé®"),
            Err(TagValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            normalize_tag_name("two words"),
            Err(TagValidationError::InvalidCharacters(_))
        ));
        assert!(matches!(
            normalize_tag_name("-leading"),
            Err(TagValidationError::InvalidCharacters(_))
        ));
        assert_eq!(normalize_tag_name("   "), Err(TagValidationError::Empty));
        assert_eq!(
            normalize_tag_name(&"a".repeat(51)),
            Err(TagValidationError::TooLong { chars: 51 })
        );
    }

    #[test]
    fn format_tag_list_sorts_and_deduplicates() {
        assert_eq!(format_tag_list(&["zesty", "apple", "zesty"]), "apple zesty");
        assert_eq!(format_tag_list::<&str>(&[]), "");
    }
}
