//! Subcommand dispatch against in-memory adapters.

use hourglass::{
    cli::{Command, CommentArgs, NewTaskArgs, execute},
    task::{adapters::memory::RecordingAnnouncer, services::IDLE_MESSAGE},
};
use rstest::rstest;

use super::helpers::{Harness, harness, offline};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn status_without_tasks_reports_idle(harness: Harness) {
    let out = RecordingAnnouncer::new();

    execute(Command::Status, &harness.service, &offline(), &out)
        .await
        .expect("status succeeds");

    assert_eq!(out.lines(), vec![IDLE_MESSAGE.to_owned()]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_status_and_finish_report_progress(harness: Harness) {
    let invocation = offline();
    let out = RecordingAnnouncer::new();
    let args = NewTaskArgs {
        title: "Tidy up".to_owned(),
        ..NewTaskArgs::default()
    };

    execute(Command::Chore(args), &harness.service, &invocation, &out)
        .await
        .expect("chore starts");
    harness.clock.advance_minutes(75);
    execute(Command::Status, &harness.service, &invocation, &out)
        .await
        .expect("status succeeds");
    execute(
        Command::Finish(CommentArgs::default()),
        &harness.service,
        &invocation,
        &out,
    )
    .await
    .expect("finish succeeds");

    let lines = out.lines();
    assert_eq!(lines.first(), Some(&"Started chore \"Tidy up\".".to_owned()));
    assert!(lines.contains(&"Title: Tidy up".to_owned()));
    assert!(lines.contains(&"Time spent at the moment: 1h 15m".to_owned()));
    assert_eq!(lines.last(), Some(&"Current task finished.".to_owned()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn finishing_with_nothing_started_reports_idle(harness: Harness) {
    let out = RecordingAnnouncer::new();

    execute(
        Command::AbortWithoutTime(CommentArgs::default()),
        &harness.service,
        &offline(),
        &out,
    )
    .await
    .expect("abort succeeds");

    assert_eq!(out.lines(), vec![IDLE_MESSAGE.to_owned()]);
}
