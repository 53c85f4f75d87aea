//! Domain model for task lifecycle management.
//!
//! The task domain models the lifecycle machine, the two tracker
//! synchronisation machines, the per-kind variant policy and the
//! announcement ledger while keeping all infrastructure concerns outside of
//! the domain boundary.

mod account;
mod announcement;
mod branch;
mod error;
mod ids;
mod kind;
mod outcome;
mod project;
mod state;
mod task;
mod time;

pub use account::{Accounts, Credentials, ExternalSystem};
pub use announcement::{AnnouncementLedger, SyncEvent};
pub use branch::BranchName;
pub use error::{ParseTaskKindError, ParseTaskStateError, TaskDomainError};
pub use ids::{IssueKey, IssueLink, RepositoryFullName, StoryId, TaskId};
pub use kind::{StoryState, StoryType, TaskKind, VariantPolicy, Workflow};
pub use outcome::{ConnectionFailed, OutcomeCategory, RemoteResponse, RemoteResult};
pub use project::{
    AutoCreateFlags, DEFAULT_STORY_TRACKER_URL, IssueTrackerSettings, IssueTypeIds, Project,
    SourceControlSettings, StoryTrackerSettings, TransitionIds,
};
pub use state::{
    Effect, IssueSyncOperation, IssueSyncState, LifecycleOperation, LifecycleState,
    StorySyncOperation, StorySyncState, TransitionPlan,
};
pub use task::{Task, commit_message};
pub use time::TimeSpent;
