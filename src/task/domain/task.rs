//! Task aggregate root.

use super::{
    AnnouncementLedger, BranchName, IssueLink, IssueSyncOperation, IssueSyncState,
    LifecycleOperation, LifecycleState, StoryId, StorySyncOperation, StorySyncState, TaskDomainError,
    TaskId, TaskKind, TimeSpent, TransitionPlan,
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Subject used for the separate formatter commit.
const FORMATTING_COMMIT_SUBJECT: &str = "Apply formatting";

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    kind: TaskKind,
    title: String,
    description: Option<String>,
    project: String,
    state: LifecycleState,
    issue_sync: IssueSyncState,
    story_sync: StorySyncState,
    issue: Option<IssueLink>,
    story_id: Option<StoryId>,
    branch: Option<BranchName>,
    parent_branch: Option<BranchName>,
    pull_request_url: Option<String>,
    additional_time: Option<u32>,
    comment: Option<String>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    #[serde(default)]
    announcements: AnnouncementLedger,
}

impl Task {
    /// Creates a task in the `created` state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank.
    pub fn new(
        kind: TaskKind,
        title: impl Into<String>,
        project: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<Self, TaskDomainError> {
        let raw_title = title.into();
        let normalized_title = raw_title.trim();
        if normalized_title.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }

        Ok(Self {
            id: TaskId::new(),
            kind,
            title: normalized_title.to_owned(),
            description: None,
            project: project.into(),
            state: LifecycleState::Created,
            issue_sync: IssueSyncState::Pending,
            story_sync: StorySyncState::Pending,
            issue: None,
            story_id: None,
            branch: None,
            parent_branch: None,
            pull_request_url: None,
            additional_time: None,
            comment: None,
            started_at: None,
            finished_at: None,
            created_at: clock.utc(),
            announcements: AnnouncementLedger::new(),
        })
    }

    /// Sets the description; blank values clear it.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let value = description.into();
        let normalized = value.trim();
        self.description = (!normalized.is_empty()).then(|| normalized.to_owned());
        self
    }

    /// Links an existing story.
    #[must_use]
    pub fn with_story_id(mut self, story_id: StoryId) -> Self {
        self.story_id = Some(story_id);
        self
    }

    /// Backdates the start by the given number of minutes.
    #[must_use]
    pub fn with_additional_time(mut self, minutes: u32) -> Self {
        self.additional_time = Some(minutes);
        self
    }

    /// Records the branch the task was started from.
    #[must_use]
    pub fn with_parent_branch(mut self, branch: BranchName) -> Self {
        self.parent_branch = Some(branch);
        self
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task kind.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the owning project name.
    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LifecycleState {
        self.state
    }

    /// Returns the issue sync state.
    #[must_use]
    pub const fn issue_sync(&self) -> IssueSyncState {
        self.issue_sync
    }

    /// Returns the story sync state.
    #[must_use]
    pub const fn story_sync(&self) -> StorySyncState {
        self.story_sync
    }

    /// Returns the linked issue, if one was created.
    #[must_use]
    pub const fn issue(&self) -> Option<&IssueLink> {
        self.issue.as_ref()
    }

    /// Returns the linked story identifier.
    #[must_use]
    pub const fn story_id(&self) -> Option<&StoryId> {
        self.story_id.as_ref()
    }

    /// Returns the task branch.
    #[must_use]
    pub const fn branch(&self) -> Option<&BranchName> {
        self.branch.as_ref()
    }

    /// Returns the branch the task was started from.
    #[must_use]
    pub const fn parent_branch(&self) -> Option<&BranchName> {
        self.parent_branch.as_ref()
    }

    /// Returns the URL of the pull request opened for the task.
    #[must_use]
    pub fn pull_request_url(&self) -> Option<&str> {
        self.pull_request_url.as_deref()
    }

    /// Returns the comment given when the task stopped.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Returns when work started.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when work stopped.
    #[must_use]
    pub const fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// Returns when the task was recorded.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the announcement ledger.
    #[must_use]
    pub const fn announcements(&self) -> &AnnouncementLedger {
        &self.announcements
    }

    /// Returns the announcement ledger for recording.
    pub const fn announcements_mut(&mut self) -> &mut AnnouncementLedger {
        &mut self.announcements
    }

    /// Plans `operation` against the current state and this kind's workflow.
    #[must_use]
    pub fn plan(&self, operation: LifecycleOperation) -> Option<TransitionPlan> {
        self.state.plan(operation, self.kind.policy().workflow)
    }

    /// Moves the task into the planned state.
    ///
    /// Callers obtain `plan` from [`Self::plan`] on the same task.
    pub const fn enter(&mut self, plan: &TransitionPlan) {
        self.state = plan.next;
    }

    /// Records the start time, backdated by the additional time.
    ///
    /// The start time is only ever set once.
    pub fn stamp_start(&mut self, clock: &impl Clock) {
        if self.started_at.is_some() {
            return;
        }
        let backdate = Duration::minutes(i64::from(self.additional_time.unwrap_or_default()));
        self.started_at = Some(clock.utc() - backdate);
    }

    /// Records the finish time.
    pub fn stamp_finish(&mut self, clock: &impl Clock) {
        self.finished_at = Some(clock.utc());
    }

    /// Stores the comment given at a stopping transition.
    pub fn set_comment(&mut self, comment: Option<String>) {
        self.comment = comment.filter(|value| !value.trim().is_empty());
    }

    /// Advances the issue sync machine.
    ///
    /// Returns `false`, leaving the state untouched, when the operation does
    /// not apply to the current state.
    pub fn advance_issue_sync(&mut self, operation: IssueSyncOperation) -> bool {
        match self.issue_sync.next(operation) {
            Some(next) => {
                self.issue_sync = next;
                true
            }
            None => false,
        }
    }

    /// Advances the story sync machine.
    ///
    /// Returns `false`, leaving the state untouched, when the operation does
    /// not apply to the current state.
    pub fn advance_story_sync(&mut self, operation: StorySyncOperation) -> bool {
        match self.story_sync.next(operation) {
            Some(next) => {
                self.story_sync = next;
                true
            }
            None => false,
        }
    }

    /// Links the issue created for this task.
    pub fn link_issue(&mut self, issue: IssueLink) {
        self.issue = Some(issue);
    }

    /// Links the story created for this task.
    pub fn link_story(&mut self, story_id: StoryId) {
        self.story_id = Some(story_id);
    }

    /// Records the task branch.
    pub fn set_branch(&mut self, branch: BranchName) {
        self.branch = Some(branch);
    }

    /// Records the pull request URL.
    pub fn set_pull_request_url(&mut self, url: impl Into<String>) {
        self.pull_request_url = Some(url.into());
    }

    /// Returns the time between start and finish, once both are known.
    #[must_use]
    pub fn time_spent(&self) -> Option<TimeSpent> {
        Some(TimeSpent::between(self.started_at?, self.finished_at?))
    }

    /// Returns the time spent up to `now`, or up to the finish time.
    #[must_use]
    pub fn time_spent_so_far(&self, now: DateTime<Utc>) -> TimeSpent {
        self.started_at.map_or(TimeSpent::from_minutes(0), |started| {
            TimeSpent::between(started, self.finished_at.unwrap_or(now))
        })
    }

    /// Builds the commit message for the task's work, e.g.
    /// `[RUC-123][#12345678] Hello World`.
    #[must_use]
    pub fn commit_message(&self) -> String {
        self.reference_prefixed(&self.title)
    }

    /// Builds the commit message for the separate formatter commit.
    #[must_use]
    pub fn formatting_commit_message(&self) -> String {
        self.reference_prefixed(FORMATTING_COMMIT_SUBJECT)
    }

    fn reference_prefixed(&self, subject: &str) -> String {
        commit_message(
            self.issue.as_ref().map(|issue| issue.key.as_str()),
            self.story_id.as_ref().map(StoryId::as_str),
            subject,
        )
    }
}

/// Builds a commit subject prefixed with the issue key and story id.
///
/// Absent references are omitted and surrounding whitespace is trimmed.
#[must_use]
pub fn commit_message(issue_key: Option<&str>, story_id: Option<&str>, subject: &str) -> String {
    let mut message = String::new();
    if let Some(key) = issue_key {
        message.push_str(&format!("[{key}]"));
    }
    if let Some(id) = story_id {
        message.push_str(&format!("[#{id}]"));
    }
    message.push(' ');
    message.push_str(subject);
    message.trim().to_owned()
}
