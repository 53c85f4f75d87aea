//! Story tracker port.

use crate::task::domain::{RemoteResult, StoryId, StoryState, StoryType};
use async_trait::async_trait;

/// Payload for creating a story.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStory {
    /// Story tracker project identifier.
    pub project_id: String,
    /// Story name (the task title).
    pub name: String,
    /// Story description; only sent for detailed stories.
    pub description: Option<String>,
    /// Story classification.
    pub story_type: StoryType,
    /// Point estimate; only sent for detailed stories.
    pub estimate: Option<u32>,
}

/// Story returned by the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryDetails {
    /// Story identifier.
    pub id: StoryId,
    /// Story name.
    pub name: String,
    /// Story description.
    pub description: Option<String>,
    /// Browser URL of the story.
    pub url: Option<String>,
}

/// Story tracker contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StoryTracker: Send + Sync {
    /// Fetches an existing story.
    async fn fetch_story(&self, id: &StoryId) -> RemoteResult<StoryDetails>;

    /// Creates a story in the `unstarted` state.
    async fn create_story(&self, story: &NewStory) -> RemoteResult<StoryDetails>;

    /// Sets a story's `current_state`.
    async fn update_story_state(&self, id: &StoryId, state: StoryState) -> RemoteResult<()>;
}
