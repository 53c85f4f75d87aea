//! Project-scoped settings a task belongs to.
//!
//! A [`Project`] is read once per invocation and never mutated by the
//! lifecycle engine.

use super::RepositoryFullName;
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Default story tracker API root.
pub const DEFAULT_STORY_TRACKER_URL: &str = "https://www.pivotaltracker.com/";

/// Project configuration scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Display name of the project.
    pub name: String,
    /// Local working directory of the repository.
    pub folder_path: Utf8PathBuf,
    /// Issue tracker settings.
    pub issue_tracker: IssueTrackerSettings,
    /// Story tracker settings.
    pub story_tracker: StoryTrackerSettings,
    /// Source-control settings.
    pub source_control: SourceControlSettings,
}

/// Issue tracker settings for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueTrackerSettings {
    /// Base URL of the tracker, e.g. `https://acme.atlassian.net/`.
    pub url: String,
    /// Tracker project identifier.
    pub project_id: String,
    /// Issue-type identifiers per task kind.
    pub issue_types: IssueTypeIds,
    /// Transition identifiers.
    pub transitions: TransitionIds,
}

impl IssueTrackerSettings {
    /// Returns the browser URL for an issue key.
    #[must_use]
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{key}", self.url.trim_end_matches('/'))
    }
}

/// Issue-type identifiers per task kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueTypeIds {
    /// Issue type for features.
    pub feature: Option<String>,
    /// Issue type for bugs.
    pub bug: Option<String>,
    /// Issue type for chores.
    pub chore: Option<String>,
    /// Issue type for fixes.
    pub fix: Option<String>,
    /// Issue type for meetings.
    pub meeting: Option<String>,
}

/// Workflow transition identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionIds {
    /// Transition into the to-do column.
    pub todo: Option<String>,
    /// Transition into the in-progress column.
    pub in_progress: Option<String>,
    /// Transition into the done column.
    pub done: Option<String>,
}

/// Story tracker settings for a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryTrackerSettings {
    /// API root of the story tracker.
    pub url: String,
    /// Story tracker project identifier.
    pub project_id: Option<String>,
    /// Estimate given to created feature and bug stories.
    pub estimate: Option<u32>,
    /// Which task kinds create stories automatically.
    pub auto_create: AutoCreateFlags,
}

impl Default for StoryTrackerSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_STORY_TRACKER_URL.to_owned(),
            project_id: None,
            estimate: None,
            auto_create: AutoCreateFlags::default(),
        }
    }
}

impl StoryTrackerSettings {
    /// Returns the estimate for new stories, defaulting zero or absent to 1.
    #[must_use]
    pub fn effective_estimate(&self) -> u32 {
        match self.estimate {
            Some(estimate) if estimate > 0 => estimate,
            _ => 1,
        }
    }

    /// Returns the browser URL of a story.
    #[must_use]
    pub fn story_url(&self, story_id: &str) -> String {
        format!("{}/story/show/{story_id}", self.url.trim_end_matches('/'))
    }
}

/// Per-kind switches for creating stories automatically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoCreateFlags {
    /// Create stories for features.
    pub features: bool,
    /// Create stories for bugs.
    pub bugs: bool,
    /// Create stories for chores.
    pub chores: bool,
    /// Create chore stories for fixes.
    pub fixes: bool,
    /// Create chore stories for meetings.
    pub meetings: bool,
}

/// Source-control settings for a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceControlSettings {
    /// Hosted repository in `owner/repo` form.
    pub repository: Option<RepositoryFullName>,
    /// Formatter command run before the formatting commit, e.g.
    /// `cargo fmt`.
    pub formatter: Option<String>,
}
