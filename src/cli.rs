//! Command-line surface.
//!
//! Each kind subcommand creates a task and starts it; the lifecycle
//! subcommands act on every started task.

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use mockable::{Clock, DefaultClock};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, ConfigEnv, ConfigError};
use crate::task::{
    adapters::{
        console::ConsoleAnnouncer,
        file::JsonFileTaskRepository,
        git::{GitHubPullRequests, GitSourceControl},
        http::AdapterSetupError,
        jira::JiraIssueTracker,
        pivotal::PivotalStoryTracker,
    },
    domain::TaskKind,
    ports::{Announcer, TaskRepository, TaskRepositoryError},
    services::{
        CreateTaskRequest, IDLE_MESSAGE, Invocation, RemotePorts, TaskLifecycleError,
        TaskLifecycleService,
    },
};

/// Parsed command line.
#[derive(Debug, Parser)]
#[command(name = "hourglass", version, about = "Track work and keep the trackers in step")]
pub struct Cli {
    /// Path to `hourglass.toml`.
    #[arg(long, global = true)]
    pub config: Option<Utf8PathBuf>,
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start a chore.
    Chore(NewTaskArgs),
    /// Start a bug on its own branch.
    Bug(NewTaskArgs),
    /// Start a feature on its own branch.
    Feature(NewTaskArgs),
    /// Start a fix committed on the current branch.
    Fix(NewTaskArgs),
    /// Start tracking a meeting.
    Meeting(NewTaskArgs),
    /// Finish the current task.
    Finish(CommentArgs),
    /// Pause the current task.
    Pause(CommentArgs),
    /// Abort the current task, logging time.
    Abort(CommentArgs),
    /// Abort the current task without logging time.
    AbortWithoutTime(CommentArgs),
    /// Show the current task.
    Status,
}

/// Arguments for task-creating subcommands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct NewTaskArgs {
    /// Task title; may be omitted when `--story` is given.
    #[arg(default_value = "")]
    pub title: String,
    /// Longer description.
    #[arg(short, long)]
    pub description: Option<String>,
    /// Existing story id, e.g. `#12345678`.
    #[arg(short = 'p', long = "story")]
    pub story_id: Option<String>,
    /// Minutes already spent before starting.
    #[arg(short, long = "additional-time")]
    pub additional_time: Option<u32>,
}

impl NewTaskArgs {
    /// Converts the arguments into a creation request for `kind`.
    #[must_use]
    pub fn into_request(self, kind: TaskKind) -> CreateTaskRequest {
        let mut request = CreateTaskRequest::new(kind, self.title);
        if let Some(description) = self.description {
            request = request.with_description(description);
        }
        if let Some(story_id) = self.story_id {
            request = request.with_story_id(story_id);
        }
        if let Some(minutes) = self.additional_time {
            request = request.with_additional_time(minutes);
        }
        request
    }
}

/// Arguments for subcommands acting on the current task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Args)]
pub struct CommentArgs {
    /// Work-log comment.
    pub comment: Option<String>,
}

/// Failures surfaced to the user by the binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A remote adapter could not be built.
    #[error(transparent)]
    Setup(#[from] AdapterSetupError),
    /// The task store could not be opened.
    #[error(transparent)]
    Store(#[from] TaskRepositoryError),
    /// A lifecycle operation failed.
    #[error(transparent)]
    Lifecycle(#[from] TaskLifecycleError),
}

/// Loads configuration, wires the adapters and runs `cli.command`.
///
/// # Errors
///
/// Returns [`CliError`] when configuration, adapter setup, the task store or
/// the lifecycle operation fails.
pub async fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::load(cli.config.as_deref(), &ConfigEnv::from_process())?;
    let announcer: Arc<dyn Announcer> = Arc::new(ConsoleAnnouncer);
    let ports = build_ports(&config, Arc::clone(&announcer))?;
    let repository = Arc::new(JsonFileTaskRepository::open(config.data_dir.clone())?);
    let service = TaskLifecycleService::new(repository, Arc::new(DefaultClock), ports);
    execute(cli.command, &service, &config.invocation, announcer.as_ref()).await?;
    Ok(())
}

/// Builds the remote adapters for `config`.
///
/// Systems without an account get an adapter with empty credentials; the
/// sync guards never call it.
///
/// # Errors
///
/// Returns [`AdapterSetupError`] when an HTTP client cannot be built.
pub fn build_ports(
    config: &Config,
    announcer: Arc<dyn Announcer>,
) -> Result<RemotePorts, AdapterSetupError> {
    let project = &config.invocation.project;
    let accounts = &config.invocation.accounts;
    let issue_tracker = JiraIssueTracker::new(
        project.issue_tracker.url.clone(),
        accounts.issue_tracker.clone().unwrap_or_default(),
    )?;
    let story_tracker = PivotalStoryTracker::new(
        project.story_tracker.url.clone(),
        &accounts.story_tracker.clone().unwrap_or_default(),
    )?;
    let source_control = match &accounts.source_control {
        Some(credentials) => GitSourceControl::with_pull_requests(GitHubPullRequests::new(
            config.github_api_url.clone(),
            credentials.clone(),
        )?),
        None => GitSourceControl::local_only(),
    };
    Ok(RemotePorts {
        issue_tracker: Arc::new(issue_tracker),
        story_tracker: Arc::new(story_tracker),
        source_control: Arc::new(source_control),
        announcer,
    })
}

/// Runs one subcommand against `service`, printing through `out`.
///
/// # Errors
///
/// Returns [`TaskLifecycleError`] when the lifecycle operation fails.
pub async fn execute<R, C>(
    command: Command,
    service: &TaskLifecycleService<R, C>,
    invocation: &Invocation,
    out: &dyn Announcer,
) -> Result<(), TaskLifecycleError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    match command {
        Command::Chore(args) => start(service, TaskKind::Chore, args, invocation, out).await?,
        Command::Bug(args) => start(service, TaskKind::Bug, args, invocation, out).await?,
        Command::Feature(args) => start(service, TaskKind::Feature, args, invocation, out).await?,
        Command::Fix(args) => start(service, TaskKind::Fix, args, invocation, out).await?,
        Command::Meeting(args) => start(service, TaskKind::Meeting, args, invocation, out).await?,
        Command::Finish(args) => {
            report(out, "finished", service.finish_started(args.comment, invocation).await?.len());
        }
        Command::Pause(args) => {
            report(out, "paused", service.pause_started(args.comment, invocation).await?.len());
        }
        Command::Abort(args) => {
            report(out, "aborted", service.abort_started(args.comment, invocation).await?.len());
        }
        Command::AbortWithoutTime(args) => {
            let done = service
                .abort_started_without_time(args.comment, invocation)
                .await?;
            report(out, "aborted", done.len());
        }
        Command::Status => {
            let statuses = service.status(invocation).await?;
            if statuses.is_empty() {
                out.announce(IDLE_MESSAGE);
            }
            for line in statuses.iter().flat_map(|status| status.lines()) {
                out.announce(&line);
            }
        }
    }
    Ok(())
}

async fn start<R, C>(
    service: &TaskLifecycleService<R, C>,
    kind: TaskKind,
    args: NewTaskArgs,
    invocation: &Invocation,
    out: &dyn Announcer,
) -> Result<(), TaskLifecycleError>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    let task = service
        .create_and_start(args.into_request(kind), invocation)
        .await?;
    out.announce(&format!("Started {} \"{}\".", task.kind(), task.title()));
    Ok(())
}

fn report(out: &dyn Announcer, verb: &str, count: usize) {
    if count == 0 {
        out.announce(IDLE_MESSAGE);
    } else {
        out.announce(&format!("Current task {verb}."));
    }
}
