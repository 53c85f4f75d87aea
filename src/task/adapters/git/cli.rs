//! Local git operations through the `git` executable.

use camino::Utf8Path;
use tokio::process::Command;

use crate::task::{
    domain::BranchName,
    ports::{SourceControlError, SourceControlResult},
};

/// `stderr` fragments git prints when the remote cannot be reached.
const UNREACHABLE_MARKERS: [&str; 6] = [
    "could not resolve host",
    "unable to access",
    "could not read from remote repository",
    "connection timed out",
    "connection refused",
    "network is unreachable",
];

/// Runs git subcommands in a working directory.
#[derive(Debug, Clone, Default)]
pub struct GitCli;

impl GitCli {
    /// Creates a runner using the `git` found on `PATH`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Runs `git <args>` and returns trimmed standard output.
    ///
    /// # Errors
    ///
    /// Returns [`SourceControlError::Unreachable`] when git reports a
    /// connectivity failure, [`SourceControlError::CommandFailed`] for any
    /// other non-zero exit and [`SourceControlError::Io`] when git cannot be
    /// spawned.
    pub async fn run(&self, workdir: &Utf8Path, args: &[&str]) -> SourceControlResult<String> {
        tracing::debug!(workdir = %workdir, ?args, "running git");
        let output = Command::new("git")
            .arg("-C")
            .arg(workdir.as_str())
            .args(args)
            .output()
            .await
            .map_err(SourceControlError::io)?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_owned());
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
        Err(classify_failure(format!("git {}", args.join(" ")), stderr))
    }

    /// Returns whether the working tree has staged, unstaged or untracked
    /// changes.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Self::run`].
    pub async fn has_changes(&self, workdir: &Utf8Path) -> SourceControlResult<bool> {
        Ok(!self.run(workdir, &["status", "--porcelain"]).await?.is_empty())
    }

    /// Fetches and rebases onto the upstream of the current branch.
    ///
    /// A rebase that fails is aborted before its error is returned.
    ///
    /// # Errors
    ///
    /// Propagates failures from [`Self::run`].
    pub async fn fetch_and_rebase(&self, workdir: &Utf8Path) -> SourceControlResult<()> {
        self.run(workdir, &["fetch"]).await?;
        let upstream = self
            .run(
                workdir,
                &["rev-parse", "--abbrev-ref", "--symbolic-full-name", "@{u}"],
            )
            .await?;
        if let Err(err) = self.run(workdir, &["rebase", &upstream]).await {
            if let Err(abort_err) = self.run(workdir, &["rebase", "--abort"]).await {
                tracing::warn!(error = %abort_err, "could not abort failed rebase");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Returns the checked-out branch.
    ///
    /// # Errors
    ///
    /// Returns [`SourceControlError::CommandFailed`] when HEAD is not a
    /// valid branch name.
    pub async fn current_branch(&self, workdir: &Utf8Path) -> SourceControlResult<BranchName> {
        let name = self.run(workdir, &["rev-parse", "--abbrev-ref", "HEAD"]).await?;
        BranchName::new(name).map_err(|err| SourceControlError::CommandFailed {
            command: "git rev-parse --abbrev-ref HEAD".to_owned(),
            stderr: err.to_string(),
        })
    }
}

fn classify_failure(command: String, stderr: String) -> SourceControlError {
    let lowered = stderr.to_ascii_lowercase();
    if UNREACHABLE_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
    {
        SourceControlError::Unreachable(stderr)
    } else {
        SourceControlError::CommandFailed { command, stderr }
    }
}
