//! When steps for task lifecycle BDD scenarios.

use super::world::{LifecycleWorld, run_async};
use eyre::WrapErr;
use hourglass::task::{
    domain::{TaskId, TaskKind},
    services::CreateTaskRequest,
};
use rstest_bdd_macros::when;

fn current_task_id(world: &LifecycleWorld) -> Result<TaskId, eyre::Report> {
    world
        .task
        .as_ref()
        .map(|task| task.id())
        .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
}

fn parse_kind(kind: &str) -> Result<TaskKind, eyre::Report> {
    TaskKind::try_from(kind).map_err(|err| eyre::eyre!("invalid kind in scenario: {err}"))
}

#[when(r#"I create a "{kind}" task titled "{title}""#)]
fn create_task(
    world: &mut LifecycleWorld,
    kind: String,
    title: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(parse_kind(&kind)?, title);
    world.mark();
    let created = run_async(world.service.create(request, &world.invocation))
        .wrap_err("create task")?;
    world.task = Some(created);
    Ok(())
}

#[when(r#"I start a "{kind}" task titled "{title}""#)]
fn start_task(
    world: &mut LifecycleWorld,
    kind: String,
    title: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(parse_kind(&kind)?, title);
    world.mark();
    let started = run_async(world.service.create_and_start(request, &world.invocation))
        .wrap_err("start task")?;
    world.task = Some(started);
    Ok(())
}

#[when("I finish the task")]
fn finish_task(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let id = current_task_id(world)?;
    world.mark();
    let finished = run_async(world.service.finish(id, None, &world.invocation))
        .wrap_err("finish task")?;
    world.task = Some(finished);
    Ok(())
}

#[when("I finish the task again")]
fn finish_task_again(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    finish_task(world)
}

#[when("I abort the task")]
fn abort_task(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let id = current_task_id(world)?;
    world.mark();
    let aborted = run_async(world.service.abort(id, None, &world.invocation))
        .wrap_err("abort task")?;
    world.task = Some(aborted);
    Ok(())
}

#[when("I abort the task without time")]
fn abort_task_without_time(world: &mut LifecycleWorld) -> Result<(), eyre::Report> {
    let id = current_task_id(world)?;
    world.mark();
    let aborted = run_async(world.service.abort_without_time(id, None, &world.invocation))
        .wrap_err("abort task without time")?;
    world.task = Some(aborted);
    Ok(())
}
