//! In-memory adapters for tests and dry runs.
//!
//! - [`task::InMemoryTaskRepository`]: task storage without a filesystem
//! - [`remote`]: scripted issue tracker, story tracker and source control
//! - [`announcer::RecordingAnnouncer`]: captures announcements
//! - [`clock::ManualClock`]: a clock tests move by hand

pub mod announcer;
pub mod clock;
pub mod remote;
pub mod task;

pub use announcer::RecordingAnnouncer;
pub use clock::ManualClock;
pub use remote::{
    IssueTrackerCall, Reply, ScriptedIssueTracker, ScriptedSourceControl, ScriptedStoryTracker,
    SourceControlCall, StoryTrackerCall,
};
pub use task::InMemoryTaskRepository;
