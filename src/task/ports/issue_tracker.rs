//! Issue tracker port.

use crate::task::domain::{IssueKey, IssueLink, RemoteResult};
use async_trait::async_trait;

/// Payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    /// Tracker project identifier.
    pub project_id: String,
    /// Issue-type identifier for the task kind.
    pub issue_type_id: Option<String>,
    /// Issue summary (the task title).
    pub summary: String,
    /// Plain-text description.
    pub description: Option<String>,
    /// Username the issue is assigned to.
    pub assignee: Option<String>,
}

/// Work-log entry appended to an issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkLogEntry {
    /// Free-text comment.
    pub comment: String,
    /// Start of the logged work, formatted for the tracker.
    pub started: String,
    /// Logged duration, e.g. `1h 30m`.
    pub time_spent: String,
}

/// Issue tracker contract.
///
/// Implementations report every HTTP status through the returned
/// [`RemoteResult`]; only transport failures produce `Err`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueTracker: Send + Sync {
    /// Creates an issue and returns its identity.
    async fn create_issue(&self, issue: &NewIssue) -> RemoteResult<IssueLink>;

    /// Applies a workflow transition to an issue.
    async fn transition_issue(&self, key: &IssueKey, transition_id: &str) -> RemoteResult<()>;

    /// Appends a work-log entry to an issue.
    async fn log_work(&self, key: &IssueKey, entry: &WorkLogEntry) -> RemoteResult<()>;
}
