//! Snapshot of in-progress work for display.

use camino::Utf8PathBuf;
use chrono::{DateTime, Utc};

use super::Invocation;
use crate::task::domain::{Task, TaskKind, TimeSpent};

/// Line printed when no task is started.
pub const IDLE_MESSAGE: &str = "You are not working on anything now.";

/// Display snapshot of one started task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatus {
    /// Task title.
    pub title: String,
    /// Task kind.
    pub kind: TaskKind,
    /// Issue key and browse URL.
    pub issue: Option<(String, String)>,
    /// Story id and story URL.
    pub story: Option<(String, String)>,
    /// Time spent so far.
    pub time_spent: TimeSpent,
    /// Branch holding the work.
    pub branch: Option<String>,
    /// Branch the pull request will target.
    pub parent_branch: Option<String>,
    /// Local project folder.
    pub folder_path: Utf8PathBuf,
}

impl TaskStatus {
    /// Builds the snapshot of `task` as of `now`.
    #[must_use]
    pub fn of(task: &Task, invocation: &Invocation, now: DateTime<Utc>) -> Self {
        let project = &invocation.project;
        Self {
            title: task.title().to_owned(),
            kind: task.kind(),
            issue: task.issue().map(|issue| {
                (
                    issue.key.to_string(),
                    project.issue_tracker.browse_url(issue.key.as_str()),
                )
            }),
            story: task.story_id().map(|story_id| {
                (
                    story_id.to_string(),
                    project.story_tracker.story_url(story_id.as_str()),
                )
            }),
            time_spent: task.time_spent_so_far(now),
            branch: task.branch().map(ToString::to_string),
            parent_branch: task.parent_branch().map(ToString::to_string),
            folder_path: project.folder_path.clone(),
        }
    }

    /// Renders the snapshot as display lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            "You are working on:".to_owned(),
            format!("Title: {}", self.title),
            format!("Type: {}", self.kind),
        ];
        if let Some((key, url)) = &self.issue {
            lines.push(format!("Issue: {key} ({url})"));
        }
        if let Some((id, url)) = &self.story {
            lines.push(format!("Story: #{id} ({url})"));
        }
        lines.push(format!("Time spent at the moment: {}", self.time_spent));
        if let Some(branch) = &self.branch {
            lines.push(format!("Branch with the task: {branch}"));
        }
        if let Some(parent) = &self.parent_branch {
            lines.push(format!("Pull request will be sent to this branch: {parent}"));
        }
        lines.push(format!("Project location: {}", self.folder_path));
        lines
    }
}
