//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The story identifier is not a run of at least six digits.
    #[error("invalid story id '{0}', expected at least 6 digits (e.g. 12345678 or #12345678)")]
    InvalidStoryId(String),

    /// The issue key is empty or contains whitespace.
    #[error("invalid issue key '{0}'")]
    InvalidIssueKey(String),

    /// The repository name does not follow `owner/repo` format.
    #[error("invalid repository name '{0}', expected owner/repo")]
    InvalidRepository(String),

    /// The branch name is empty or contains characters git rejects.
    #[error("invalid branch name '{0}'")]
    InvalidBranchName(String),
}

/// Error returned while parsing lifecycle or sync states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);

/// Error returned while parsing a task kind from user input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task kind: {0}")]
pub struct ParseTaskKindError(pub String);
