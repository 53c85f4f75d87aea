//! In-memory integration tests for lifecycle operations.

use hourglass::task::{
    adapters::memory::{IssueTrackerCall, Reply, ScriptedIssueTracker, ScriptedStoryTracker},
    domain::{IssueSyncState, LifecycleState, StorySyncState, TaskKind},
    ports::WorkLogEntry,
    services::CreateTaskRequest,
};
use rstest::rstest;

use super::helpers::{Harness, harness, harness_with, offline, remote_only};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn chore_round_trip_closes_issue_and_logs_work(harness: Harness) {
    let invocation = remote_only();
    let task = harness
        .service
        .create_and_start(CreateTaskRequest::new(TaskKind::Chore, "Tidy up"), &invocation)
        .await
        .expect("task starts");
    harness.clock.advance_minutes(20);

    let finished = harness
        .service
        .finish(task.id(), Some("Reviewed".to_owned()), &invocation)
        .await
        .expect("finish succeeds");

    assert_eq!(finished.state(), LifecycleState::Finished);
    assert_eq!(finished.issue_sync(), IssueSyncState::Closed);
    assert_eq!(finished.story_sync(), StorySyncState::Pending);
    assert_eq!(
        harness.issue_tracker.calls().last(),
        Some(&IssueTrackerCall::LogWork {
            key: "TST-24".to_owned(),
            entry: WorkLogEntry {
                comment: "Reviewed".to_owned(),
                started: "2014-05-23T09:00:00.000+0000".to_owned(),
                time_spent: "0h 20m".to_owned(),
            },
        })
    );
    assert!(harness.story_tracker.calls().is_empty());
    assert_eq!(
        harness.announcer.lines().last(),
        Some(&"Time spent: 0h 20m".to_owned())
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn meeting_backdates_its_work_log(harness: Harness) {
    let invocation = remote_only();
    let task = harness
        .service
        .create_and_start(
            CreateTaskRequest::new(TaskKind::Meeting, "Standup").with_additional_time(15),
            &invocation,
        )
        .await
        .expect("task starts");

    harness
        .service
        .finish(task.id(), None, &invocation)
        .await
        .expect("finish succeeds");

    let logged = harness.issue_tracker.calls().into_iter().find_map(|call| match call {
        IssueTrackerCall::LogWork { entry, .. } => Some(entry),
        _ => None,
    });
    assert_eq!(
        logged,
        Some(WorkLogEntry {
            comment: "Done".to_owned(),
            started: "2014-05-23T08:45:00.000+0000".to_owned(),
            time_spent: "0h 15m".to_owned(),
        })
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unreachable_issue_tracker_is_announced_once_per_task() {
    let harness = harness_with(
        ScriptedIssueTracker::with_replies(Reply::Disconnect, Reply::Disconnect, Reply::Disconnect),
        ScriptedStoryTracker::succeeding("12345678").expect("valid story id"),
    );
    let invocation = remote_only();
    let task = harness
        .service
        .create_and_start(CreateTaskRequest::new(TaskKind::Chore, "Offline work"), &invocation)
        .await
        .expect("task starts despite the tracker being down");
    harness.clock.advance_minutes(5);

    let finished = harness
        .service
        .finish(task.id(), None, &invocation)
        .await
        .expect("finish succeeds despite the tracker being down");

    assert_eq!(finished.state(), LifecycleState::Finished);
    assert_eq!(finished.issue_sync(), IssueSyncState::Pending);
    assert_eq!(harness.issue_tracker.calls().len(), 1);
    let failures: Vec<String> = harness
        .announcer
        .lines()
        .into_iter()
        .filter(|line| line.starts_with("Connection failed"))
        .collect();
    assert_eq!(
        failures,
        vec!["Connection failed. Performing the task without requests to the issue tracker."
            .to_owned()]
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn offline_abort_still_reports_elapsed_time(harness: Harness) {
    let invocation = offline();
    let task = harness
        .service
        .create_and_start(CreateTaskRequest::new(TaskKind::Feature, "Spike"), &invocation)
        .await
        .expect("task starts");
    harness.clock.advance_minutes(65);

    let aborted = harness
        .service
        .abort(task.id(), None, &invocation)
        .await
        .expect("abort succeeds");

    assert_eq!(aborted.state(), LifecycleState::Aborted);
    assert!(harness.issue_tracker.calls().is_empty());
    assert!(harness.story_tracker.calls().is_empty());
    assert_eq!(harness.announcer.lines(), vec!["Time spent: 1h 5m".to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn pause_started_stops_every_started_task(harness: Harness) {
    let invocation = offline();
    for title in ["First", "Second"] {
        harness
            .service
            .create_and_start(CreateTaskRequest::new(TaskKind::Chore, title), &invocation)
            .await
            .expect("task starts");
        harness.clock.advance_minutes(1);
    }
    harness
        .service
        .create(CreateTaskRequest::new(TaskKind::Chore, "Not started"), &invocation)
        .await
        .expect("task is created");

    let paused = harness
        .service
        .pause_started(None, &invocation)
        .await
        .expect("pause succeeds");

    let titles: Vec<&str> = paused.iter().map(|task| task.title()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert!(
        paused
            .iter()
            .all(|task| task.state() == LifecycleState::Paused)
    );
    assert!(
        harness
            .service
            .status(&invocation)
            .await
            .expect("status succeeds")
            .is_empty()
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paused_task_cannot_be_resumed(harness: Harness) {
    let invocation = offline();
    let task = harness
        .service
        .create_and_start(CreateTaskRequest::new(TaskKind::Chore, "Once"), &invocation)
        .await
        .expect("task starts");
    let paused = harness
        .service
        .pause(task.id(), None, &invocation)
        .await
        .expect("pause succeeds");

    let restarted = harness
        .service
        .start(task.id(), &invocation)
        .await
        .expect("start is a no-op");

    assert_eq!(restarted, paused);
}
