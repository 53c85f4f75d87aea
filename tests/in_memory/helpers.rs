//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use camino::Utf8PathBuf;
use hourglass::task::{
    adapters::memory::{
        InMemoryTaskRepository, ManualClock, RecordingAnnouncer, ScriptedIssueTracker,
        ScriptedSourceControl, ScriptedStoryTracker,
    },
    domain::{
        Accounts, BranchName, Credentials, IssueTrackerSettings, IssueTypeIds, Project,
        StoryTrackerSettings, TransitionIds,
    },
    services::{Invocation, RemotePorts, TaskLifecycleService, WorkflowSettings},
};
use rstest::fixture;

/// Service type wired to in-memory adapters.
pub type TestService = TaskLifecycleService<InMemoryTaskRepository, ManualClock>;

/// A lifecycle service plus handles on every fake it talks to.
pub struct Harness {
    pub service: TestService,
    pub clock: ManualClock,
    pub issue_tracker: ScriptedIssueTracker,
    pub story_tracker: ScriptedStoryTracker,
    pub announcer: RecordingAnnouncer,
}

/// Builds a harness around the given trackers.
#[must_use]
pub fn harness_with(
    issue_tracker: ScriptedIssueTracker,
    story_tracker: ScriptedStoryTracker,
) -> Harness {
    let clock = ManualClock::fixed();
    let announcer = RecordingAnnouncer::new();
    let master = BranchName::new("master").expect("valid branch");
    let service = TaskLifecycleService::new(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(clock.clone()),
        RemotePorts {
            issue_tracker: Arc::new(issue_tracker.clone()),
            story_tracker: Arc::new(story_tracker.clone()),
            source_control: Arc::new(ScriptedSourceControl::on_branch(master)),
            announcer: Arc::new(announcer.clone()),
        },
    );
    Harness {
        service,
        clock,
        issue_tracker,
        story_tracker,
        announcer,
    }
}

/// Provides a harness whose trackers answer every call successfully.
#[fixture]
pub fn harness() -> Harness {
    harness_with(
        ScriptedIssueTracker::succeeding("TST-24").expect("valid issue key"),
        ScriptedStoryTracker::succeeding("12345678").expect("valid story id"),
    )
}

fn credentials() -> Credentials {
    Credentials {
        email: "developer@example.com".to_owned(),
        secret: "api-token".to_owned(),
        username: Some("developer".to_owned()),
    }
}

/// Project configured for both trackers.
#[must_use]
pub fn project() -> Project {
    Project {
        name: "test".to_owned(),
        folder_path: Utf8PathBuf::from("/work/test"),
        issue_tracker: IssueTrackerSettings {
            url: "http://www.example.com/".to_owned(),
            project_id: "10000".to_owned(),
            issue_types: IssueTypeIds {
                feature: Some("10001".to_owned()),
                bug: Some("10004".to_owned()),
                chore: Some("10002".to_owned()),
                fix: Some("10003".to_owned()),
                meeting: Some("10005".to_owned()),
            },
            transitions: TransitionIds {
                todo: Some("11".to_owned()),
                in_progress: Some("21".to_owned()),
                done: Some("31".to_owned()),
            },
        },
        story_tracker: StoryTrackerSettings {
            project_id: Some("2374972".to_owned()),
            ..StoryTrackerSettings::default()
        },
        ..Project::default()
    }
}

/// Tracker accounts configured, git disabled.
#[must_use]
pub fn remote_only() -> Invocation {
    Invocation {
        project: project(),
        accounts: Accounts {
            issue_tracker: Some(credentials()),
            story_tracker: Some(credentials()),
            ..Accounts::default()
        },
        settings: WorkflowSettings { enable_git: false },
    }
}

/// No accounts, git disabled.
#[must_use]
pub fn offline() -> Invocation {
    Invocation {
        accounts: Accounts::default(),
        ..remote_only()
    }
}
