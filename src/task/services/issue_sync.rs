//! Issue tracker synchronisation.
//!
//! Each operation checks its guard, consults the task's
//! [`IssueSyncState`](crate::task::domain::IssueSyncState) and calls the
//! tracker at most once. Remote failures are announced and swallowed; the
//! machine only advances on success.

use serde_json::Value;
use std::sync::Arc;

use super::{
    Invocation,
    announce::{Announcements, Observed, task_context},
};
use crate::task::{
    domain::{ExternalSystem, IssueKey, IssueSyncOperation, SyncEvent, Task},
    ports::{IssueTracker, NewIssue, WorkLogEntry},
};

/// Default work-log comment.
pub const DEFAULT_WORK_LOG_COMMENT: &str = "Done";

/// Timestamp format expected by the tracker's work log.
pub const WORK_LOG_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:00.000+0000";

/// Drives the issue sync machine of a task.
#[derive(Clone)]
pub struct IssueSync {
    tracker: Arc<dyn IssueTracker>,
    announcements: Announcements,
}

impl IssueSync {
    /// Creates the sync driver.
    #[must_use]
    pub fn new(tracker: Arc<dyn IssueTracker>, announcements: Announcements) -> Self {
        Self {
            tracker,
            announcements,
        }
    }

    /// Creates the issue for `task`.
    ///
    /// Returns `true` when the machine advanced to `created`.
    pub async fn create(&self, task: &mut Task, invocation: &Invocation) -> bool {
        if !invocation.accounts.is_configured(ExternalSystem::IssueTracker)
            || task.issue_sync().next(IssueSyncOperation::Create).is_none()
        {
            return false;
        }

        let project = &invocation.project;
        let issue = NewIssue {
            project_id: project.issue_tracker.project_id.clone(),
            issue_type_id: task
                .kind()
                .policy()
                .issue_type_id(project)
                .map(str::to_owned),
            summary: task.title().to_owned(),
            description: task.description().map(str::to_owned),
            assignee: invocation
                .accounts
                .issue_tracker
                .as_ref()
                .and_then(|credentials| credentials.username.clone()),
        };
        tracing::info!(task_id = %task.id(), "creating issue");
        let observed = Observed::from_result(self.tracker.create_issue(&issue).await);

        let advanced = match observed.payload.clone() {
            Some(link) => {
                task.link_issue(link);
                task.advance_issue_sync(IssueSyncOperation::Create)
            }
            None => false,
        };
        let mut context = task_context(task, project);
        observed.annotate(&mut context);
        self.announcements
            .announce_once(task, SyncEvent::IssueCreate, observed.outcome, &context);
        advanced
    }

    /// Moves the issue to in-progress.
    ///
    /// Returns `true` when the machine advanced to `started`.
    pub async fn start(&self, task: &mut Task, invocation: &Invocation) -> bool {
        let transition = invocation.project.issue_tracker.transitions.in_progress.clone();
        self.transition(
            task,
            invocation,
            IssueSyncOperation::Start,
            SyncEvent::IssueStart,
            transition,
        )
        .await
    }

    /// Moves the issue to done.
    ///
    /// Returns `true` when the machine advanced to `closed`.
    pub async fn close(&self, task: &mut Task, invocation: &Invocation) -> bool {
        let transition = invocation.project.issue_tracker.transitions.done.clone();
        self.transition(
            task,
            invocation,
            IssueSyncOperation::Close,
            SyncEvent::IssueClose,
            transition,
        )
        .await
    }

    async fn transition(
        &self,
        task: &mut Task,
        invocation: &Invocation,
        operation: IssueSyncOperation,
        event: SyncEvent,
        transition_id: Option<String>,
    ) -> bool {
        let Some(key) = guarded_key(task, invocation) else {
            return false;
        };
        if task.issue_sync().next(operation).is_none() {
            return false;
        }
        let Some(transition_id) = transition_id else {
            tracing::warn!(task_id = %task.id(), ?operation, "no transition id configured");
            return false;
        };

        tracing::info!(task_id = %task.id(), issue = %key, ?operation, "transitioning issue");
        let observed =
            Observed::from_result(self.tracker.transition_issue(&key, &transition_id).await);
        let advanced = observed.outcome.is_success() && task.advance_issue_sync(operation);
        let mut context = task_context(task, &invocation.project);
        observed.annotate(&mut context);
        self.announcements
            .announce_once(task, event, observed.outcome, &context);
        advanced
    }

    /// Logs the time spent on `task` to its issue.
    ///
    /// Skipped when no time was spent. Returns `true` when the tracker
    /// accepted the entry.
    pub async fn log_work(&self, task: &mut Task, invocation: &Invocation) -> bool {
        let Some(key) = guarded_key(task, invocation) else {
            return false;
        };
        let (Some(started_at), Some(time_spent)) = (task.started_at(), task.time_spent()) else {
            return false;
        };
        if time_spent.is_zero() {
            return false;
        }

        let entry = WorkLogEntry {
            comment: task
                .comment()
                .unwrap_or(DEFAULT_WORK_LOG_COMMENT)
                .to_owned(),
            started: started_at.format(WORK_LOG_TIME_FORMAT).to_string(),
            time_spent: time_spent.to_string(),
        };
        tracing::info!(task_id = %task.id(), issue = %key, time_spent = %entry.time_spent, "logging work");
        let observed = Observed::from_result(self.tracker.log_work(&key, &entry).await);
        let mut context = task_context(task, &invocation.project);
        observed.annotate(&mut context);
        context.insert("time_spent".to_owned(), Value::from(entry.time_spent));
        self.announcements
            .announce_once(task, SyncEvent::WorkLog, observed.outcome, &context);
        observed.outcome.is_success()
    }
}

fn guarded_key(task: &Task, invocation: &Invocation) -> Option<IssueKey> {
    if !invocation.accounts.is_configured(ExternalSystem::IssueTracker) {
        return None;
    }
    task.issue().map(|issue| issue.key.clone())
}
