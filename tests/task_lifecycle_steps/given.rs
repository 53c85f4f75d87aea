//! Given steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, credentials, run_async};
use eyre::WrapErr;
use hourglass::task::{
    adapters::memory::Reply,
    domain::{Accounts, IssueKey, IssueLink, TaskKind},
    services::CreateTaskRequest,
};
use rstest_bdd_macros::given;

fn request(
    world: &mut LifecycleWorld,
    kind: &str,
    title: String,
) -> Result<CreateTaskRequest, eyre::Report> {
    let task_kind =
        TaskKind::try_from(kind).map_err(|err| eyre::eyre!("invalid kind in scenario: {err}"))?;
    let base = CreateTaskRequest::new(task_kind, title);
    Ok(match world.pending_story_id.take() {
        Some(story_id) => base.with_story_id(story_id),
        None => base,
    })
}

#[given("a project without any accounts")]
fn project_without_accounts(world: &mut LifecycleWorld) {
    world.invocation.accounts = Accounts::default();
}

#[given("an issue tracker account")]
fn issue_tracker_account(world: &mut LifecycleWorld) {
    world.invocation.accounts.issue_tracker = Some(credentials());
}

#[given("a story tracker account")]
fn story_tracker_account(world: &mut LifecycleWorld) {
    world.invocation.accounts.story_tracker = Some(credentials());
}

#[given("bugs create stories automatically")]
fn bugs_create_stories(world: &mut LifecycleWorld) {
    world.invocation.project.story_tracker.auto_create.bugs = true;
}

#[given(r#"the issue tracker creates issues as "{key}""#)]
fn issue_tracker_creates_as(world: &mut LifecycleWorld, key: String) -> Result<(), eyre::Report> {
    let link = IssueLink {
        id: "10000".to_owned(),
        key: IssueKey::new(key).wrap_err("issue key in scenario")?,
        url: "http://www.example.com/rest/api/3/issue/10000".to_owned(),
    };
    world.issue_tracker.reply_to_creates_with(Reply::Respond {
        status: 201,
        payload: Some(link),
    });
    Ok(())
}

#[given("the story tracker answers state updates with status {status:u16}")]
fn story_tracker_answers_updates(world: &mut LifecycleWorld, status: u16) {
    world.story_tracker.reply_to_updates_with(Reply::status(status));
}

#[given(r#"the next task is for story "{story_id}""#)]
fn next_task_for_story(world: &mut LifecycleWorld, story_id: String) {
    world.pending_story_id = Some(story_id);
}

#[given(r#"a created "{kind}" task titled "{title}""#)]
fn created_task(
    world: &mut LifecycleWorld,
    kind: String,
    title: String,
) -> Result<(), eyre::Report> {
    let request = request(world, &kind, title)?;
    let created = run_async(world.service.create(request, &world.invocation))
        .wrap_err("create task in scenario setup")?;
    world.task = Some(created);
    Ok(())
}

#[given(r#"a started "{kind}" task titled "{title}""#)]
fn started_task(
    world: &mut LifecycleWorld,
    kind: String,
    title: String,
) -> Result<(), eyre::Report> {
    let request = request(world, &kind, title)?;
    let started = run_async(world.service.create_and_start(request, &world.invocation))
        .wrap_err("start task in scenario setup")?;
    world.task = Some(started);
    Ok(())
}

#[given("{minutes:i64} minutes have passed")]
fn minutes_pass(world: &mut LifecycleWorld, minutes: i64) {
    world.clock.advance_minutes(minutes);
}

#[given("the task was finished")]
fn task_was_finished(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let id = world
        .task
        .as_ref()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))?;
    let finished = run_async(world.service.finish(id, None, &world.invocation))
        .wrap_err("finish task in scenario setup")?;
    world.task = Some(finished);
    Ok(())
}
