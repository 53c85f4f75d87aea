//! Source-control workflow layered on commit and separate-branch kinds.
//!
//! Local git failures are logged and skipped. Remote-facing steps (rebase,
//! push, pull request) are announced once per task through the ledger.

use serde_json::Value;
use std::sync::Arc;

use super::{
    Invocation,
    announce::{AnnouncementContext, Announcements, Observed, task_context},
};
use crate::task::{
    domain::{BranchName, ExternalSystem, OutcomeCategory, SyncEvent, Task},
    ports::{PullRequestDraft, SourceControl, SourceControlError, SourceControlResult},
};

/// Runs git and pull request steps for a task.
#[derive(Clone)]
pub struct SourceControlWorkflow {
    source_control: Arc<dyn SourceControl>,
    announcements: Announcements,
}

impl SourceControlWorkflow {
    /// Creates the workflow driver.
    #[must_use]
    pub fn new(source_control: Arc<dyn SourceControl>, announcements: Announcements) -> Self {
        Self {
            source_control,
            announcements,
        }
    }

    /// Returns the checked-out branch, or `None` when it cannot be read.
    pub async fn current_branch(&self, invocation: &Invocation) -> Option<BranchName> {
        if !invocation.settings.enable_git {
            return None;
        }
        let workdir = &invocation.project.folder_path;
        skip_on_error(
            "read current branch",
            self.source_control.current_branch(workdir).await,
        )
    }

    /// Returns the subject of the latest commit, when there is one.
    pub async fn last_commit_subject(&self, invocation: &Invocation) -> Option<String> {
        if !invocation.settings.enable_git {
            return None;
        }
        let workdir = &invocation.project.folder_path;
        skip_on_error(
            "read last commit",
            self.source_control.last_commit_subject(workdir).await,
        )
        .flatten()
    }

    /// Rebases the working tree onto its upstream.
    pub async fn rebase(&self, task: &mut Task, invocation: &Invocation) {
        if !invocation.settings.enable_git {
            return;
        }
        tracing::info!(task_id = %task.id(), "rebasing onto upstream");
        let result = self
            .source_control
            .rebase_onto_upstream(&invocation.project.folder_path)
            .await;
        self.announce_local(task, invocation, SyncEvent::GitRebase, result);
    }

    /// Creates and checks out the task branch.
    pub async fn create_branch(&self, task: &mut Task, invocation: &Invocation) {
        if !invocation.settings.enable_git {
            return;
        }
        let branch = match BranchName::for_task(task.issue().map(|issue| &issue.key), task.title()) {
            Ok(branch) => branch,
            Err(err) => {
                tracing::warn!(task_id = %task.id(), error = %err, "cannot derive branch name");
                return;
            }
        };
        tracing::info!(task_id = %task.id(), %branch, "creating branch");
        let created = self
            .source_control
            .create_branch(&invocation.project.folder_path, &branch)
            .await;
        if skip_on_error("create branch", created).is_some() {
            task.set_branch(branch);
        }
    }

    /// Commits pending work, optionally commits a formatter pass, then
    /// pushes.
    pub async fn commit_and_push(&self, task: &mut Task, invocation: &Invocation) {
        if !invocation.settings.enable_git {
            return;
        }
        let workdir = &invocation.project.folder_path;
        tracing::info!(task_id = %task.id(), "committing work");
        let committed = self
            .source_control
            .commit_all(workdir, &task.commit_message())
            .await;
        skip_on_error("commit work", committed);

        if let Some(formatter) = &invocation.project.source_control.formatter {
            let formatted = self.source_control.run_formatter(workdir, formatter).await;
            if skip_on_error("run formatter", formatted).is_some() {
                let committed = self
                    .source_control
                    .commit_all(workdir, &task.formatting_commit_message())
                    .await;
                skip_on_error("commit formatting", committed);
            }
        }

        tracing::info!(task_id = %task.id(), "pushing");
        let pushed = self.source_control.push(workdir).await;
        self.announce_local(task, invocation, SyncEvent::GitPush, pushed);
    }

    /// Opens a pull request from the task branch into its parent.
    ///
    /// Requires a source-control account, a repository and both branches.
    pub async fn open_pull_request(&self, task: &mut Task, invocation: &Invocation) {
        let project = &invocation.project;
        if !invocation.settings.enable_git
            || !invocation.accounts.is_configured(ExternalSystem::SourceControl)
        {
            return;
        }
        let (Some(repository), Some(head), Some(base)) = (
            project.source_control.repository.as_ref(),
            task.branch().cloned(),
            task.parent_branch().cloned(),
        ) else {
            tracing::debug!(task_id = %task.id(), "pull request prerequisites missing");
            return;
        };

        let draft = PullRequestDraft {
            title: task.title().to_owned(),
            body: pull_request_body(task, invocation),
            head,
            base,
        };
        let observed =
            Observed::from_result(self.source_control.open_pull_request(repository, &draft).await);
        let mut context = task_context(task, project);
        observed.annotate(&mut context);
        if let Some(created) = &observed.payload {
            context.insert("url".to_owned(), Value::from(created.url.as_str()));
            task.set_pull_request_url(created.url.clone());
        }
        self.announcements
            .announce_once(task, SyncEvent::PullRequest, observed.outcome, &context);
    }

    /// Checks the parent branch back out.
    pub async fn checkout_parent(&self, task: &Task, invocation: &Invocation) {
        if !invocation.settings.enable_git {
            return;
        }
        let Some(parent) = task.parent_branch() else {
            return;
        };
        tracing::info!(task_id = %task.id(), branch = %parent, "checking out parent branch");
        let checked_out = self
            .source_control
            .checkout(&invocation.project.folder_path, parent)
            .await;
        skip_on_error("checkout parent branch", checked_out);
    }

    fn announce_local(
        &self,
        task: &mut Task,
        invocation: &Invocation,
        event: SyncEvent,
        result: SourceControlResult<()>,
    ) {
        let mut context: AnnouncementContext = task_context(task, &invocation.project);
        let outcome = match result {
            Ok(()) => OutcomeCategory::Success,
            Err(SourceControlError::Unreachable(reason)) => {
                context.insert("reason".to_owned(), Value::from(reason));
                OutcomeCategory::ConnectionFailed
            }
            Err(err) => {
                tracing::warn!(task_id = %task.id(), %event, error = %err, "git step failed");
                context.insert("reason".to_owned(), Value::from(err.to_string()));
                OutcomeCategory::Unknown
            }
        };
        self.announcements
            .announce_once(task, event, outcome, &context);
    }
}

/// Story URL when the task has a story, else the description.
fn pull_request_body(task: &Task, invocation: &Invocation) -> String {
    task.story_id().map_or_else(
        || task.description().unwrap_or_default().to_owned(),
        |story_id| {
            invocation
                .project
                .story_tracker
                .story_url(story_id.as_str())
        },
    )
}

fn skip_on_error<T>(step: &str, result: SourceControlResult<T>) -> Option<T> {
    result
        .map_err(|err| tracing::warn!(step, error = %err, "skipping git step"))
        .ok()
}
