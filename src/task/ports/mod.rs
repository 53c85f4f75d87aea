//! Port contracts for task lifecycle management.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod announcer;
pub mod issue_tracker;
pub mod repository;
pub mod source_control;
pub mod story_tracker;

pub use announcer::Announcer;
pub use issue_tracker::{IssueTracker, NewIssue, WorkLogEntry};
pub use repository::{TaskRepository, TaskRepositoryError, TaskRepositoryResult};
pub use source_control::{
    PullRequestCreated, PullRequestDraft, SourceControl, SourceControlError, SourceControlResult,
};
pub use story_tracker::{NewStory, StoryDetails, StoryTracker};

#[cfg(test)]
pub use issue_tracker::MockIssueTracker;
#[cfg(test)]
pub use source_control::MockSourceControl;
#[cfg(test)]
pub use story_tracker::MockStoryTracker;
