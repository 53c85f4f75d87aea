//! Shared world state for task lifecycle BDD scenarios.

use std::sync::Arc;

use camino::Utf8PathBuf;
use hourglass::task::{
    adapters::memory::{
        InMemoryTaskRepository, ManualClock, RecordingAnnouncer, ScriptedIssueTracker,
        ScriptedSourceControl, ScriptedStoryTracker,
    },
    domain::{
        Accounts, BranchName, Credentials, IssueTrackerSettings, IssueTypeIds, Project,
        StoryTrackerSettings, Task, TransitionIds,
    },
    services::{Invocation, RemotePorts, TaskLifecycleService, WorkflowSettings},
};
use rstest::fixture;

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, ManualClock>;

/// Scenario world for lifecycle behaviour tests.
pub struct LifecycleWorld {
    pub service: TestTaskService,
    pub clock: ManualClock,
    pub issue_tracker: ScriptedIssueTracker,
    pub story_tracker: ScriptedStoryTracker,
    pub announcer: RecordingAnnouncer,
    pub invocation: Invocation,
    pub pending_story_id: Option<String>,
    pub task: Option<Task>,
    pub task_before: Option<Task>,
    pub issue_calls_before: usize,
    pub story_calls_before: usize,
}

impl LifecycleWorld {
    /// Creates a world with no accounts and trackers that answer
    /// successfully.
    ///
    /// # Panics
    ///
    /// Panics if the built-in scripted identifiers are rejected.
    #[must_use]
    pub fn new() -> Self {
        let clock = ManualClock::fixed();
        let issue_tracker = ScriptedIssueTracker::succeeding("TST-1").expect("valid issue key");
        let story_tracker =
            ScriptedStoryTracker::succeeding("87654321").expect("valid story id");
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

        Self {
            service,
            clock,
            issue_tracker,
            story_tracker,
            announcer,
            invocation: Invocation {
                project: project(),
                accounts: Accounts::default(),
                settings: WorkflowSettings { enable_git: false },
            },
            pending_story_id: None,
            task: None,
            task_before: None,
            issue_calls_before: 0,
            story_calls_before: 0,
        }
    }

    /// Remembers the current task and remote traffic so then-steps can
    /// compare against what a when-step changed.
    pub fn mark(&mut self) {
        self.task_before = self.task.clone();
        self.issue_calls_before = self.issue_tracker.calls().len();
        self.story_calls_before = self.story_tracker.calls().len();
    }
}

impl Default for LifecycleWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Credentials used for every configured account.
#[must_use]
pub fn credentials() -> Credentials {
    Credentials {
        email: "developer@example.com".to_owned(),
        secret: "api-token".to_owned(),
        username: Some("developer".to_owned()),
    }
}

fn project() -> Project {
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

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> LifecycleWorld {
    LifecycleWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
