//! Then steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use hourglass::task::{
    adapters::memory::{IssueTrackerCall, StoryTrackerCall},
    domain::{LifecycleState, Task},
};
use rstest_bdd_macros::then;

fn task(world: &LifecycleWorld) -> Result<&Task, eyre::Report> {
    world
        .task
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
}

fn issue_calls_since_mark(world: &LifecycleWorld) -> Vec<IssueTrackerCall> {
    world
        .issue_tracker
        .calls()
        .into_iter()
        .skip(world.issue_calls_before)
        .collect()
}

fn story_calls_since_mark(world: &LifecycleWorld) -> Vec<StoryTrackerCall> {
    world
        .story_tracker
        .calls()
        .into_iter()
        .skip(world.story_calls_before)
        .collect()
}

#[then(r#"the stored task title is "{title}""#)]
fn stored_title_is(world: &LifecycleWorld, title: String) -> Result<(), eyre::Report> {
    let id = task(world)?.id();
    let stored = run_async(world.service.find_by_id(id))
        .wrap_err("look up stored task")?
        .ok_or_else(|| eyre::eyre!("task {id} was not persisted"))?;
    eyre::ensure!(
        stored.title() == title,
        "expected title {title:?}, found {:?}",
        stored.title()
    );
    Ok(())
}

#[then("the task has no story id")]
fn task_has_no_story(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let story_id = task(world)?.story_id();
    eyre::ensure!(story_id.is_none(), "expected no story id, found {story_id:?}");
    Ok(())
}

#[then(r#"the task issue key is "{key}""#)]
fn task_issue_key_is(world: &LifecycleWorld, key: String) -> Result<(), eyre::Report> {
    let issue = task(world)?
        .issue()
        .ok_or_else(|| eyre::eyre!("task has no linked issue"))?;
    eyre::ensure!(
        issue.key.as_str() == key,
        "expected issue key {key}, found {}",
        issue.key
    );
    Ok(())
}

#[then(r#"the issue sync state is "{state}""#)]
fn issue_sync_state_is(world: &LifecycleWorld, state: String) -> Result<(), eyre::Report> {
    let actual = task(world)?.issue_sync();
    eyre::ensure!(
        actual.as_str() == state,
        "expected issue sync {state}, found {}",
        actual.as_str()
    );
    Ok(())
}

#[then(r#"the story sync state is "{state}""#)]
fn story_sync_state_is(world: &LifecycleWorld, state: String) -> Result<(), eyre::Report> {
    let actual = task(world)?.story_sync();
    eyre::ensure!(
        actual.as_str() == state,
        "expected story sync {state}, found {}",
        actual.as_str()
    );
    Ok(())
}

#[then(r#"the task state is "{state}""#)]
fn task_state_is(world: &LifecycleWorld, state: String) -> Result<(), eyre::Report> {
    let expected = LifecycleState::try_from(state.as_str())
        .map_err(|err| eyre::eyre!("invalid expected state in scenario: {err}"))?;
    let actual = task(world)?.state();
    eyre::ensure!(
        actual == expected,
        "expected state {}, found {}",
        expected.as_str(),
        actual.as_str()
    );
    Ok(())
}

#[then(r#"an announcement mentions "{text}""#)]
fn announcement_mentions(world: &LifecycleWorld, text: String) -> Result<(), eyre::Report> {
    let needle = text.to_lowercase();
    let lines = world.announcer.lines();
    eyre::ensure!(
        lines.iter().any(|line| line.to_lowercase().contains(&needle)),
        "no announcement mentions {text:?}: {lines:?}"
    );
    Ok(())
}

#[then("the task has a finish time")]
fn task_has_finish_time(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    eyre::ensure!(
        task(world)?.finished_at().is_some(),
        "expected finished_at to be set"
    );
    Ok(())
}

#[then(r#"the issue tracker only received a "{transition_id}" transition"#)]
fn issue_tracker_only_transitioned(
    world: &LifecycleWorld,
    transition_id: String,
) -> Result<(), eyre::Report> {
    let calls = issue_calls_since_mark(world);
    eyre::ensure!(
        matches!(
            calls.as_slice(),
            [IssueTrackerCall::Transition { transition_id: sent, .. }] if *sent == transition_id
        ),
        "expected a single {transition_id} transition, found {calls:?}"
    );
    Ok(())
}

#[then("the issue tracker received no calls")]
fn issue_tracker_received_nothing(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let calls = issue_calls_since_mark(world);
    eyre::ensure!(calls.is_empty(), "unexpected issue tracker calls: {calls:?}");
    Ok(())
}

#[then("the story tracker received no calls")]
fn story_tracker_received_nothing(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let calls = story_calls_since_mark(world);
    eyre::ensure!(calls.is_empty(), "unexpected story tracker calls: {calls:?}");
    Ok(())
}

#[then("the story tracker received {count:usize} story creation call")]
fn story_tracker_creations(world: &LifecycleWorld, count: usize) -> Result<(), eyre::Report> {
    let created = story_calls_since_mark(world)
        .iter()
        .filter(|call| matches!(call, StoryTrackerCall::Create(_)))
        .count();
    eyre::ensure!(
        created == count,
        "expected {count} story creation calls, found {created}"
    );
    Ok(())
}

#[then("the task is unchanged")]
fn task_is_unchanged(world: &LifecycleWorld) -> Result<(), eyre::Report> {
    let before = world
        .task_before
        .as_ref()
        .ok_or_else(|| eyre::eyre!("no task snapshot was taken"))?;
    let after = task(world)?;
    eyre::ensure!(before == after, "task changed: {before:?} -> {after:?}");
    Ok(())
}
