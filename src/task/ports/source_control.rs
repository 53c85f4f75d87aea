//! Source-control port: local git operations and hosted pull requests.

use crate::task::domain::{BranchName, RemoteResult, RepositoryFullName};
use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;
use thiserror::Error;

/// Result type for local source-control operations.
pub type SourceControlResult<T> = Result<T, SourceControlError>;

/// Pull request to open on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDraft {
    /// Pull request title.
    pub title: String,
    /// Pull request body.
    pub body: String,
    /// Branch with the changes.
    pub head: BranchName,
    /// Branch to merge into.
    pub base: BranchName,
}

/// Pull request created on the hosting service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestCreated {
    /// Pull request number.
    pub number: u64,
    /// Browser URL of the pull request.
    pub url: String,
}

/// Source-control contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Returns the checked-out branch.
    async fn current_branch(&self, workdir: &Utf8Path) -> SourceControlResult<BranchName>;

    /// Returns the subject of the most recent commit, if any.
    async fn last_commit_subject(&self, workdir: &Utf8Path) -> SourceControlResult<Option<String>>;

    /// Fetches and rebases the current branch onto its upstream, stashing
    /// and restoring uncommitted changes around the rebase.
    async fn rebase_onto_upstream(&self, workdir: &Utf8Path) -> SourceControlResult<()>;

    /// Creates and checks out a new branch.
    async fn create_branch(&self, workdir: &Utf8Path, branch: &BranchName)
    -> SourceControlResult<()>;

    /// Checks out an existing branch.
    async fn checkout(&self, workdir: &Utf8Path, branch: &BranchName) -> SourceControlResult<()>;

    /// Stages everything and commits, allowing empty commits.
    async fn commit_all(&self, workdir: &Utf8Path, message: &str) -> SourceControlResult<()>;

    /// Runs a formatter command in the working directory.
    async fn run_formatter(&self, workdir: &Utf8Path, command: &str) -> SourceControlResult<()>;

    /// Pushes the current branch, setting its upstream.
    async fn push(&self, workdir: &Utf8Path) -> SourceControlResult<()>;

    /// Opens a pull request on the hosting service.
    async fn open_pull_request(
        &self,
        repository: &RepositoryFullName,
        draft: &PullRequestDraft,
    ) -> RemoteResult<PullRequestCreated>;
}

/// Errors returned by source-control adapters.
#[derive(Debug, Clone, Error)]
pub enum SourceControlError {
    /// The remote could not be reached.
    #[error("remote unreachable: {0}")]
    Unreachable(String),

    /// A git command exited unsuccessfully.
    #[error("`{command}` failed: {stderr}")]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// Captured standard error.
        stderr: String,
    },

    /// The command could not be run at all.
    #[error("source control I/O error: {0}")]
    Io(Arc<std::io::Error>),
}

impl SourceControlError {
    /// Wraps an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
