//! Application services for task lifecycle orchestration.

pub mod announce;
mod invocation;
mod issue_sync;
mod lifecycle;
mod status;
mod story_sync;
mod workflow;

pub use announce::{AnnouncementContext, Announcements, Observed};
pub use invocation::{Invocation, WorkflowSettings};
pub use issue_sync::{DEFAULT_WORK_LOG_COMMENT, IssueSync, WORK_LOG_TIME_FORMAT};
pub use lifecycle::{
    CreateTaskRequest, RemotePorts, TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService,
};
pub use status::{IDLE_MESSAGE, TaskStatus};
pub use story_sync::StorySync;
pub use workflow::SourceControlWorkflow;
