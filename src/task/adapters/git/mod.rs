//! Source-control adapter: the local `git` executable plus GitHub pull
//! requests.

pub mod cli;
pub mod github;

use async_trait::async_trait;
use camino::Utf8Path;

use crate::task::{
    domain::{BranchName, ConnectionFailed, RemoteResult, RepositoryFullName},
    ports::{
        PullRequestCreated, PullRequestDraft, SourceControl, SourceControlError,
        SourceControlResult,
    },
};

pub use cli::GitCli;
pub use github::{DEFAULT_GITHUB_API_URL, GitHubPullRequests};

/// [`SourceControl`] implementation over git and, when an account is
/// configured, GitHub.
#[derive(Debug, Clone, Default)]
pub struct GitSourceControl {
    git: GitCli,
    pull_requests: Option<GitHubPullRequests>,
}

impl GitSourceControl {
    /// Creates an adapter that cannot open pull requests.
    #[must_use]
    pub const fn local_only() -> Self {
        Self {
            git: GitCli::new(),
            pull_requests: None,
        }
    }

    /// Creates an adapter that opens pull requests through `pull_requests`.
    #[must_use]
    pub const fn with_pull_requests(pull_requests: GitHubPullRequests) -> Self {
        Self {
            git: GitCli::new(),
            pull_requests: Some(pull_requests),
        }
    }
}

#[async_trait]
impl SourceControl for GitSourceControl {
    async fn current_branch(&self, workdir: &Utf8Path) -> SourceControlResult<BranchName> {
        self.git.current_branch(workdir).await
    }

    async fn last_commit_subject(&self, workdir: &Utf8Path) -> SourceControlResult<Option<String>> {
        match self.git.run(workdir, &["log", "-1", "--pretty=format:%s"]).await {
            Ok(subject) if subject.is_empty() => Ok(None),
            Ok(subject) => Ok(Some(subject)),
            // A repository without commits has no subject to report.
            Err(SourceControlError::CommandFailed { .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn rebase_onto_upstream(&self, workdir: &Utf8Path) -> SourceControlResult<()> {
        let stashed = self.git.has_changes(workdir).await?;
        if stashed {
            self.git.run(workdir, &["add", "-A"]).await?;
            self.git.run(workdir, &["stash"]).await?;
        }
        let rebased = self.git.fetch_and_rebase(workdir).await;
        // A conflicting pop leaves the entry in the stash.
        let restored = if stashed {
            self.git.run(workdir, &["stash", "pop"]).await.map(drop)
        } else {
            Ok(())
        };
        match rebased {
            Ok(()) => restored,
            Err(err) => {
                if let Err(restore_err) = restored {
                    tracing::warn!(
                        error = %restore_err,
                        "could not restore stashed changes; they remain in the stash"
                    );
                }
                Err(err)
            }
        }
    }

    async fn create_branch(
        &self,
        workdir: &Utf8Path,
        branch: &BranchName,
    ) -> SourceControlResult<()> {
        self.git
            .run(workdir, &["checkout", "-b", branch.as_str()])
            .await
            .map(drop)
    }

    async fn checkout(&self, workdir: &Utf8Path, branch: &BranchName) -> SourceControlResult<()> {
        self.git
            .run(workdir, &["checkout", branch.as_str()])
            .await
            .map(drop)
    }

    async fn commit_all(&self, workdir: &Utf8Path, message: &str) -> SourceControlResult<()> {
        self.git.run(workdir, &["add", "-A"]).await?;
        self.git
            .run(workdir, &["commit", "--allow-empty", "-m", message])
            .await
            .map(drop)
    }

    async fn run_formatter(&self, workdir: &Utf8Path, command: &str) -> SourceControlResult<()> {
        tracing::info!(command, "running formatter");
        let output = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(workdir.as_std_path())
            .output()
            .await
            .map_err(SourceControlError::io)?;
        if output.status.success() {
            return Ok(());
        }
        Err(SourceControlError::CommandFailed {
            command: command.to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }

    async fn push(&self, workdir: &Utf8Path) -> SourceControlResult<()> {
        let branch = self.git.current_branch(workdir).await?;
        self.git
            .run(workdir, &["push", "--set-upstream", "origin", branch.as_str()])
            .await
            .map(drop)
    }

    async fn open_pull_request(
        &self,
        repository: &RepositoryFullName,
        draft: &PullRequestDraft,
    ) -> RemoteResult<PullRequestCreated> {
        match &self.pull_requests {
            Some(client) => client.open(repository, draft).await,
            None => Err(ConnectionFailed(
                "no source-control account is configured".to_owned(),
            )),
        }
    }
}
