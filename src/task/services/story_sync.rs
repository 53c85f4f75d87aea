//! Story tracker synchronisation.

use std::sync::Arc;

use super::{
    Invocation,
    announce::{Announcements, Observed, story_context, task_context},
};
use crate::task::{
    domain::{ExternalSystem, StoryId, StoryState, StorySyncOperation, SyncEvent, Task},
    ports::{NewStory, StoryDetails, StoryTracker},
};

/// Drives the story sync machine of a task.
#[derive(Clone)]
pub struct StorySync {
    tracker: Arc<dyn StoryTracker>,
    announcements: Announcements,
}

impl StorySync {
    /// Creates the sync driver.
    #[must_use]
    pub fn new(tracker: Arc<dyn StoryTracker>, announcements: Announcements) -> Self {
        Self {
            tracker,
            announcements,
        }
    }

    /// Fetches an existing story before its task exists.
    ///
    /// Returns `None` when no account is configured or the fetch failed;
    /// failures are announced.
    pub async fn fetch(&self, story_id: &StoryId, invocation: &Invocation) -> Option<StoryDetails> {
        if !invocation.accounts.is_configured(ExternalSystem::StoryTracker) {
            return None;
        }
        tracing::info!(story = %story_id, "fetching story");
        let observed = Observed::from_result(self.tracker.fetch_story(story_id).await);
        if !observed.outcome.is_success() {
            let mut context = story_context(story_id);
            observed.annotate(&mut context);
            self.announcements
                .announce(SyncEvent::StoryFetch, observed.outcome, &context);
        }
        observed.payload
    }

    /// Creates a story for `task` when its kind auto-creates stories.
    ///
    /// Returns `true` when the machine advanced to `created`.
    pub async fn create(&self, task: &mut Task, invocation: &Invocation) -> bool {
        let project = &invocation.project;
        let policy = task.kind().policy();
        if task.story_id().is_some()
            || !policy.auto_creates_story(project)
            || !invocation.accounts.is_configured(ExternalSystem::StoryTracker)
            || task.story_sync().next(StorySyncOperation::Create).is_none()
        {
            return false;
        }
        let Some(project_id) = project.story_tracker.project_id.clone() else {
            tracing::warn!(task_id = %task.id(), "no story tracker project configured");
            return false;
        };

        let story = NewStory {
            project_id,
            name: task.title().to_owned(),
            description: policy
                .detailed_story
                .then(|| task.description().unwrap_or_default().to_owned()),
            story_type: policy.story_type,
            estimate: policy
                .detailed_story
                .then(|| project.story_tracker.effective_estimate()),
        };
        tracing::info!(task_id = %task.id(), "creating story");
        let observed = Observed::from_result(self.tracker.create_story(&story).await);

        let advanced = match observed.payload.clone() {
            Some(created) => {
                task.link_story(created.id);
                task.advance_story_sync(StorySyncOperation::Create)
            }
            None => false,
        };
        let mut context = task_context(task, project);
        observed.annotate(&mut context);
        self.announcements
            .announce_once(task, SyncEvent::StoryCreate, observed.outcome, &context);
        advanced
    }

    /// Marks the story as started.
    ///
    /// Returns `true` when the machine advanced to `started`.
    pub async fn start(&self, task: &mut Task, invocation: &Invocation) -> bool {
        self.update(task, invocation, StorySyncOperation::Start)
            .await
    }

    /// Moves the story to the kind's finish state.
    ///
    /// Returns `true` when the machine advanced to `finished`.
    pub async fn finish(&self, task: &mut Task, invocation: &Invocation) -> bool {
        self.update(task, invocation, StorySyncOperation::Finish)
            .await
    }

    async fn update(
        &self,
        task: &mut Task,
        invocation: &Invocation,
        operation: StorySyncOperation,
    ) -> bool {
        let Some(story_id) = task.story_id().cloned() else {
            return false;
        };
        if !invocation.accounts.is_configured(ExternalSystem::StoryTracker)
            || task.story_sync().next(operation).is_none()
        {
            return false;
        }

        let (state, event) = match operation {
            StorySyncOperation::Finish => {
                (task.kind().policy().story_finish_state, SyncEvent::StoryFinish)
            }
            StorySyncOperation::Start | StorySyncOperation::Create => {
                (StoryState::Started, SyncEvent::StoryStart)
            }
        };
        tracing::info!(task_id = %task.id(), story = %story_id, state = state.as_str(), "updating story");
        let observed =
            Observed::from_result(self.tracker.update_story_state(&story_id, state).await);
        let advanced = observed.outcome.is_success() && task.advance_story_sync(operation);
        let mut context = task_context(task, &invocation.project);
        observed.annotate(&mut context);
        self.announcements
            .announce_once(task, event, observed.outcome, &context);
        advanced
    }
}
