//! At-most-once user announcements for remote outcomes.

use minijinja::Environment;
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::task::{
    domain::{OutcomeCategory, Project, RemoteResult, StoryId, SyncEvent, Task},
    ports::Announcer,
};

/// Template context passed to announcement templates.
pub type AnnouncementContext = Map<String, Value>;

/// Renders announcements and records them in each task's ledger.
#[derive(Clone)]
pub struct Announcements {
    announcer: Arc<dyn Announcer>,
}

impl Announcements {
    /// Creates an announcement service writing to `announcer`.
    #[must_use]
    pub fn new(announcer: Arc<dyn Announcer>) -> Self {
        Self { announcer }
    }

    /// Emits a line unconditionally.
    pub fn say(&self, message: &str) {
        self.announcer.announce(message);
    }

    /// Announces the outcome of `event` for `task` unless any outcome was
    /// already announced for it.
    ///
    /// Returns `true` when a line was emitted.
    pub fn announce_once(
        &self,
        task: &mut Task,
        event: SyncEvent,
        outcome: OutcomeCategory,
        context: &AnnouncementContext,
    ) -> bool {
        if !task.announcements_mut().announce_once(event, outcome) {
            tracing::debug!(task_id = %task.id(), %event, ?outcome, "already announced");
            return false;
        }
        self.announce(event, outcome, context);
        true
    }

    /// Announces an outcome that is not tied to a stored task.
    pub fn announce(&self, event: SyncEvent, outcome: OutcomeCategory, context: &AnnouncementContext) {
        match render(event, outcome, context) {
            Ok(message) => self.announcer.announce(&message),
            Err(err) => tracing::warn!(%event, ?outcome, error = %err, "could not render announcement"),
        }
    }
}

/// Builds the context shared by every announcement about `task`.
#[must_use]
pub fn task_context(task: &Task, project: &Project) -> AnnouncementContext {
    let mut context = Map::new();
    context.insert("title".to_owned(), Value::from(task.title()));
    context.insert(
        "project_id".to_owned(),
        Value::from(project.issue_tracker.project_id.as_str()),
    );
    if let Some(story_project) = &project.story_tracker.project_id {
        context.insert("story_project_id".to_owned(), Value::from(story_project.as_str()));
    }
    if let Some(issue) = task.issue() {
        context.insert("key".to_owned(), Value::from(issue.key.as_str()));
    }
    if let Some(story_id) = task.story_id() {
        context.insert("story_id".to_owned(), Value::from(story_id.as_str()));
    }
    if let Some(branch) = task.branch() {
        context.insert("branch".to_owned(), Value::from(branch.as_str()));
    }
    if let Some(repository) = &project.source_control.repository {
        context.insert("repository".to_owned(), Value::from(repository.as_str()));
    }
    context
}

/// Context for announcements made before a task exists.
#[must_use]
pub fn story_context(story_id: &StoryId) -> AnnouncementContext {
    let mut context = Map::new();
    context.insert("story_id".to_owned(), Value::from(story_id.as_str()));
    context
}

/// A remote result reduced to its outcome category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed<T> {
    /// Outcome category.
    pub outcome: OutcomeCategory,
    /// Parsed payload; only present for [`OutcomeCategory::Success`].
    pub payload: Option<T>,
    status: Option<u16>,
    reason: String,
}

impl<T> Observed<T> {
    /// Classifies `result`.
    ///
    /// A success status without a parsed payload is reported as
    /// [`OutcomeCategory::Unknown`].
    #[must_use]
    pub fn from_result(result: RemoteResult<T>) -> Self {
        match result {
            Ok(response) => {
                let classified = response.outcome();
                let (outcome, payload) = match (classified, response.payload) {
                    (OutcomeCategory::Success, Some(payload)) => {
                        (OutcomeCategory::Success, Some(payload))
                    }
                    (OutcomeCategory::Success, None) => (OutcomeCategory::Unknown, None),
                    (other, _) => (other, None),
                };
                Self {
                    outcome,
                    payload,
                    status: Some(response.status),
                    reason: response.reason,
                }
            }
            Err(failure) => Self {
                outcome: OutcomeCategory::ConnectionFailed,
                payload: None,
                status: None,
                reason: failure.0,
            },
        }
    }

    /// Adds the status and reason to `context`.
    pub fn annotate(&self, context: &mut AnnouncementContext) {
        if let Some(status) = self.status {
            context.insert("status".to_owned(), Value::from(status));
        }
        context.insert("reason".to_owned(), Value::from(self.reason.as_str()));
    }
}

/// Renders the message for `event` and `outcome`.
///
/// # Errors
///
/// Returns the template engine error when rendering fails.
pub fn render(
    event: SyncEvent,
    outcome: OutcomeCategory,
    context: &AnnouncementContext,
) -> Result<String, minijinja::Error> {
    let mut full_context = context.clone();
    full_context.insert("action".to_owned(), Value::from(action(event)));
    Environment::new().render_str(template(event, outcome), full_context)
}

const fn action(event: SyncEvent) -> &'static str {
    match event {
        SyncEvent::IssueCreate => "create the issue in the issue tracker",
        SyncEvent::IssueStart => "start the issue in the issue tracker",
        SyncEvent::IssueClose => "close the issue in the issue tracker",
        SyncEvent::WorkLog => "log work to the issue tracker",
        SyncEvent::StoryFetch => "fetch the story from the story tracker",
        SyncEvent::StoryCreate => "create the story in the story tracker",
        SyncEvent::StoryStart => "start the story in the story tracker",
        SyncEvent::StoryFinish => "finish the story in the story tracker",
        SyncEvent::GitRebase => "rebase onto the upstream branch",
        SyncEvent::GitPush => "push the branch",
        SyncEvent::PullRequest => "open the pull request",
    }
}

const fn template(event: SyncEvent, outcome: OutcomeCategory) -> &'static str {
    use OutcomeCategory as O;
    use SyncEvent as E;

    match (event, outcome) {
        (E::IssueCreate, O::Success) => "Created the issue {{ key }} in the issue tracker.",
        (E::IssueStart, O::Success) => "Started the issue {{ key }} in the issue tracker.",
        (E::IssueClose, O::Success) => "Closed the issue {{ key }} in the issue tracker.",
        (E::WorkLog, O::Success) => "Work logged to the issue {{ key }}.",
        (E::IssueCreate, O::Forbidden) => {
            "Forbidden access to the resource in the issue tracker. Maybe login, api_key or project id {{ project_id }} are incorrect."
        }
        (E::IssueCreate, O::NotFound) => {
            "Not found the resource in the issue tracker. Maybe the project id {{ project_id }} is incorrect."
        }
        (E::IssueStart | E::IssueClose | E::WorkLog, O::Forbidden) => {
            "No access to the task {{ key }} in the issue tracker. Maybe login or api_key are incorrect."
        }
        (E::IssueStart | E::IssueClose | E::WorkLog, O::NotFound) => {
            "A task with ID {{ key }} is not found in the issue tracker."
        }
        (E::IssueCreate | E::IssueStart | E::IssueClose | E::WorkLog, O::ConnectionFailed) => {
            "Connection failed. Performing the task without requests to the issue tracker."
        }
        (E::StoryFetch, O::Success) => "Fetched the story #{{ story_id }} from the story tracker.",
        (E::StoryCreate, O::Success) => "Created the story #{{ story_id }} in the story tracker.",
        (E::StoryStart, O::Success) => "Started the story #{{ story_id }} in the story tracker.",
        (E::StoryFinish, O::Success) => "Finished the story #{{ story_id }} in the story tracker.",
        (E::StoryCreate, O::Forbidden) => {
            "No access to the server. Maybe login, api_key or story tracker project #{{ story_project_id }} is incorrect."
        }
        (E::StoryCreate, O::NotFound) => {
            "Resource not found. Maybe story tracker project #{{ story_project_id }} is incorrect."
        }
        (E::StoryFetch | E::StoryStart | E::StoryFinish, O::Forbidden) => {
            "No access to the story #{{ story_id }} in the story tracker. Maybe login or api_key are incorrect."
        }
        (E::StoryFetch | E::StoryStart | E::StoryFinish, O::NotFound) => {
            "A story with ID #{{ story_id }} is not found in the story tracker."
        }
        (E::StoryFetch | E::StoryCreate | E::StoryStart | E::StoryFinish, O::ConnectionFailed) => {
            "Connection failed. Performing the task without requests to the story tracker."
        }
        (E::GitRebase, O::Success) => "Rebased onto the latest upstream changes.",
        (E::GitPush, O::Success) => {
            "Pushed{% if branch %} {{ branch }}{% endif %} to the remote."
        }
        (E::PullRequest, O::Success) => "Opened pull request {{ url }}.",
        (E::GitRebase, O::ConnectionFailed) => {
            "Connection failed. Performing the task without pulling the latest code from Git."
        }
        (E::GitPush, O::ConnectionFailed) => {
            "Connection failed. Performing the task without pushing to Git."
        }
        (E::PullRequest, O::ConnectionFailed) => {
            "Connection failed. Performing the task without requests to Git."
        }
        (E::PullRequest, O::Forbidden) => {
            "No access to the repository {{ repository }}. Maybe login or api_key are incorrect."
        }
        (E::PullRequest, O::NotFound) => "Repository {{ repository }} is not found.",
        (E::GitRebase | E::GitPush, O::Forbidden | O::NotFound) | (_, O::Unknown) => {
            "Could not {{ action }}.{% if status %} Error status: {{ status }}.{% endif %} Message: {{ reason }}"
        }
    }
}
