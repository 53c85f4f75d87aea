//! Service layer driving the task lifecycle machine.

use crate::task::{
    domain::{
        Effect, LifecycleOperation, LifecycleState, StoryId, Task, TaskDomainError, TaskId,
        TaskKind, Workflow,
    },
    ports::{
        Announcer, IssueTracker, SourceControl, StoryTracker, TaskRepository, TaskRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

use super::{
    Invocation, IssueSync, SourceControlWorkflow, StorySync, TaskStatus, announce::Announcements,
};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    kind: TaskKind,
    title: String,
    description: Option<String>,
    story_id: Option<String>,
    additional_time: Option<u32>,
}

impl CreateTaskRequest {
    /// Creates a request for a task of `kind`.
    ///
    /// The title may be blank when a story id is supplied; it is then taken
    /// from the story.
    #[must_use]
    pub fn new(kind: TaskKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            story_id: None,
            additional_time: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Links an existing story, e.g. `#12345678`.
    #[must_use]
    pub fn with_story_id(mut self, story_id: impl Into<String>) -> Self {
        self.story_id = Some(story_id.into());
        self
    }

    /// Backdates the start by `minutes`.
    #[must_use]
    pub const fn with_additional_time(mut self, minutes: u32) -> Self {
        self.additional_time = Some(minutes);
        self
    }
}

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Remote collaborators used by lifecycle effects.
#[derive(Clone)]
pub struct RemotePorts {
    /// Issue tracker.
    pub issue_tracker: Arc<dyn IssueTracker>,
    /// Story tracker.
    pub story_tracker: Arc<dyn StoryTracker>,
    /// Source control.
    pub source_control: Arc<dyn SourceControl>,
    /// Sink for user-facing lines.
    pub announcer: Arc<dyn Announcer>,
}

/// Task lifecycle orchestration service.
///
/// Operations whose source state does not match are silent no-ops: the task
/// is returned unchanged, nothing is persisted and no remote is called.
#[derive(Clone)]
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    issues: IssueSync,
    stories: StorySync,
    workflow: SourceControlWorkflow,
    announcements: Announcements,
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(repository: Arc<R>, clock: Arc<C>, ports: RemotePorts) -> Self {
        let announcements = Announcements::new(ports.announcer);
        Self {
            repository,
            clock,
            issues: IssueSync::new(ports.issue_tracker, announcements.clone()),
            stories: StorySync::new(ports.story_tracker, announcements.clone()),
            workflow: SourceControlWorkflow::new(ports.source_control, announcements.clone()),
            announcements,
        }
    }

    /// Creates and persists a task in the `created` state.
    ///
    /// Commit-workflow kinds rebase onto upstream first; separate-branch
    /// kinds record the current branch as the pull request base.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Domain`] for an invalid story id or a
    /// title that is blank (and could not be fetched from the story), and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn create(
        &self,
        request: CreateTaskRequest,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        let story_id = request.story_id.map(StoryId::new).transpose()?;
        let mut title = request.title;
        let mut description = request.description;
        if let Some(id) = story_id.as_ref().filter(|_| title.trim().is_empty()) {
            match self.stories.fetch(id, invocation).await {
                Some(story) => {
                    title = story.name;
                    description = description.or(story.description);
                }
                None => tracing::debug!(story = %id, "story details unavailable"),
            }
        }

        let mut task = Task::new(
            request.kind,
            title,
            invocation.project.name.clone(),
            &*self.clock,
        )?;
        if let Some(text) = description {
            task = task.with_description(text);
        }
        if let Some(id) = story_id {
            task = task.with_story_id(id);
        }
        if let Some(minutes) = request.additional_time {
            task = task.with_additional_time(minutes);
        }

        let workflow = request.kind.policy().workflow;
        if workflow.commits() {
            self.workflow.rebase(&mut task, invocation).await;
        }
        if workflow.uses_branch()
            && let Some(parent) = self.workflow.current_branch(invocation).await
        {
            task = task.with_parent_branch(parent);
        }
        if workflow == Workflow::Commit
            && let Some(subject) = self.workflow.last_commit_subject(invocation).await
        {
            let note = format!("(For: {subject})");
            let full = task
                .description()
                .map_or_else(|| note.clone(), |existing| format!("{existing}\n{note}"));
            task = task.with_description(full);
        }

        self.repository.store(&task).await?;
        tracing::info!(task_id = %task.id(), kind = %task.kind(), "task created");
        Ok(task)
    }

    /// Creates a task and starts it straight away.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when creation or persistence fails.
    pub async fn create_and_start(
        &self,
        request: CreateTaskRequest,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        let task = self.create(request, invocation).await?;
        self.start(task.id(), invocation).await
    }

    /// Runs `created -> started`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn start(&self, id: TaskId, invocation: &Invocation) -> TaskLifecycleResult<Task> {
        self.apply(id, LifecycleOperation::Start, None, invocation)
            .await
    }

    /// Runs `started -> finished`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn finish(
        &self,
        id: TaskId,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        self.apply(id, LifecycleOperation::Finish, comment, invocation)
            .await
    }

    /// Runs `started -> paused`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn pause(
        &self,
        id: TaskId,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        self.apply(id, LifecycleOperation::Pause, comment, invocation)
            .await
    }

    /// Runs `started -> aborted`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn abort(
        &self,
        id: TaskId,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        self.apply(id, LifecycleOperation::Abort, comment, invocation)
            .await
    }

    /// Runs `started -> aborted_without_time`: the issue is closed but no
    /// time is logged and the story is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for an unknown task and
    /// [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn abort_without_time(
        &self,
        id: TaskId,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        self.apply(id, LifecycleOperation::AbortWithoutTime, comment, invocation)
            .await
    }

    /// Finishes every started task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn finish_started(
        &self,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.apply_to_started(LifecycleOperation::Finish, comment, invocation)
            .await
    }

    /// Pauses every started task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn pause_started(
        &self,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.apply_to_started(LifecycleOperation::Pause, comment, invocation)
            .await
    }

    /// Aborts every started task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn abort_started(
        &self,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.apply_to_started(LifecycleOperation::Abort, comment, invocation)
            .await
    }

    /// Aborts every started task without logging time.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence fails.
    pub async fn abort_started_without_time(
        &self,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Vec<Task>> {
        self.apply_to_started(LifecycleOperation::AbortWithoutTime, comment, invocation)
            .await
    }

    /// Returns a snapshot of every started task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence lookup
    /// fails.
    pub async fn status(&self, invocation: &Invocation) -> TaskLifecycleResult<Vec<TaskStatus>> {
        let now = self.clock.utc();
        let started = self
            .repository
            .find_by_state(LifecycleState::Started)
            .await?;
        Ok(started
            .iter()
            .map(|task| TaskStatus::of(task, invocation, now))
            .collect())
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when persistence lookup
    /// fails.
    pub async fn find_by_id(&self, id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(id).await?)
    }

    async fn apply_to_started(
        &self,
        operation: LifecycleOperation,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Vec<Task>> {
        let started = self
            .repository
            .find_by_state(LifecycleState::Started)
            .await?;
        let mut updated = Vec::with_capacity(started.len());
        for task in started {
            updated.push(
                self.run(task, operation, comment.clone(), invocation)
                    .await?,
            );
        }
        Ok(updated)
    }

    async fn apply(
        &self,
        id: TaskId,
        operation: LifecycleOperation,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        let task = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(id))?;
        self.run(task, operation, comment, invocation).await
    }

    async fn run(
        &self,
        mut task: Task,
        operation: LifecycleOperation,
        comment: Option<String>,
        invocation: &Invocation,
    ) -> TaskLifecycleResult<Task> {
        let Some(plan) = task.plan(operation) else {
            tracing::debug!(
                task_id = %task.id(),
                state = %task.state(),
                ?operation,
                "operation does not apply; ignoring"
            );
            return Ok(task);
        };

        tracing::info!(task_id = %task.id(), from = %task.state(), to = %plan.next, "transitioning task");
        if operation != LifecycleOperation::Start {
            task.set_comment(comment);
        }
        task.enter(&plan);
        for effect in &plan.effects {
            self.run_effect(*effect, &mut task, invocation).await;
        }
        self.repository.update(&task).await?;
        Ok(task)
    }

    async fn run_effect(&self, effect: Effect, task: &mut Task, invocation: &Invocation) {
        match effect {
            Effect::StampStart => task.stamp_start(&*self.clock),
            Effect::StampFinish => task.stamp_finish(&*self.clock),
            Effect::CreateIssue => {
                self.issues.create(task, invocation).await;
            }
            Effect::StartIssue => {
                self.issues.start(task, invocation).await;
            }
            Effect::CloseIssue => {
                self.issues.close(task, invocation).await;
            }
            Effect::LogWork => {
                self.issues.log_work(task, invocation).await;
            }
            Effect::CreateStory => {
                self.stories.create(task, invocation).await;
            }
            Effect::StartStory => {
                self.stories.start(task, invocation).await;
            }
            Effect::FinishStory => {
                self.stories.finish(task, invocation).await;
            }
            Effect::RebaseOntoUpstream => self.workflow.rebase(task, invocation).await,
            Effect::CreateBranch => self.workflow.create_branch(task, invocation).await,
            Effect::CommitAndPush => self.workflow.commit_and_push(task, invocation).await,
            Effect::OpenPullRequest => self.workflow.open_pull_request(task, invocation).await,
            Effect::CheckoutParent => self.workflow.checkout_parent(task, invocation).await,
            Effect::ReportElapsed => {
                let spent = task.time_spent_so_far(self.clock.utc());
                self.announcements.say(&format!("Time spent: {spent}"));
            }
        }
    }
}

