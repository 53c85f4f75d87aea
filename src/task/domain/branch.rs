//! Branch-name value objects for the separate-branch workflow.

use super::{IssueKey, TaskDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for a validated branch name.
const MAX_BRANCH_NAME_LENGTH: usize = 200;

/// Number of title characters that contribute to a derived branch name.
const TITLE_CHARS_IN_BRANCH: usize = 25;

/// Characters `git check-ref-format` rejects anywhere in a ref name.
const FORBIDDEN_CHARS: [char; 8] = [':', '~', '^', '?', '*', '[', '\\', ' '];

/// Validated Git branch name.
///
/// # Examples
///
///     use hourglass::task::domain::BranchName;
///
///     let name = BranchName::new("feature/my-branch").expect("valid");
///     assert_eq!(name.as_str(), "feature/my-branch");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchName(String);

impl BranchName {
    /// Creates a validated branch name.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidBranchName`] when the value is empty,
    /// starts with `-`, contains `..` or a character git forbids, or exceeds
    /// the length limit.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if Self::is_invalid_branch_name(normalized) {
            return Err(TaskDomainError::InvalidBranchName(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Derives the branch name for a task from its issue key and title.
    ///
    /// The result is a slug of the issue key followed by the first 25
    /// characters of the title, e.g. `ruc-123-first-three-four-words`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidBranchName`] when neither the key
    /// nor the title contributes any ASCII alphanumeric characters.
    pub fn for_task(issue_key: Option<&IssueKey>, title: &str) -> Result<Self, TaskDomainError> {
        let title_prefix: String = title.chars().take(TITLE_CHARS_IN_BRANCH).collect();
        let source = match issue_key {
            Some(key) => format!("{key} {title_prefix}"),
            None => title_prefix,
        };
        Self::new(slugify(&source))
    }

    fn is_invalid_branch_name(name: &str) -> bool {
        let is_empty = name.is_empty();
        let starts_with_dash = name.starts_with('-');
        let contains_forbidden = name.contains("..") || name.contains(FORBIDDEN_CHARS);
        let exceeds_length_limit = name.len() > MAX_BRANCH_NAME_LENGTH;

        is_empty || starts_with_dash || contains_forbidden || exceeds_length_limit
    }

    /// Returns the branch name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lower-cases ASCII alphanumerics and joins the runs between them with `-`.
fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;
    for character in value.chars() {
        if character.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(character.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }
    slug
}
