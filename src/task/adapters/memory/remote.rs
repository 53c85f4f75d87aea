//! Scripted remote systems for exercising the lifecycle without a network.
//!
//! Each fake replays a configured reply per operation and records every call
//! it receives, so tests can assert both on task state and on the exact
//! remote traffic an operation produced.

use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::task::{
    domain::{
        BranchName, ConnectionFailed, IssueKey, IssueLink, RemoteResponse, RemoteResult,
        RepositoryFullName, StoryId, StoryState,
    },
    ports::{
        IssueTracker, NewIssue, NewStory, PullRequestCreated, PullRequestDraft, SourceControl,
        SourceControlError, SourceControlResult, StoryDetails, StoryTracker, WorkLogEntry,
    },
};

/// Reply a scripted remote gives to one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T> {
    /// Answer with a status code and optional payload.
    Respond {
        /// HTTP status code.
        status: u16,
        /// Payload returned alongside the status.
        payload: Option<T>,
    },
    /// Fail at the transport level.
    Disconnect,
}

impl<T: Clone> Reply<T> {
    /// A `200` reply carrying `payload`.
    #[must_use]
    pub const fn ok(payload: T) -> Self {
        Self::Respond {
            status: 200,
            payload: Some(payload),
        }
    }

    /// A reply with only a status code.
    #[must_use]
    pub const fn status(status: u16) -> Self {
        Self::Respond {
            status,
            payload: None,
        }
    }

    fn replay(&self) -> RemoteResult<T> {
        match self {
            Self::Respond { status, payload } => Ok(RemoteResponse {
                status: *status,
                reason: String::new(),
                payload: payload.clone(),
            }),
            Self::Disconnect => Err(ConnectionFailed("scripted disconnect".to_owned())),
        }
    }
}

impl Reply<()> {
    /// A `204` reply for operations without a payload.
    #[must_use]
    pub const fn no_content() -> Self {
        Self::Respond {
            status: 204,
            payload: Some(()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// A call received by [`ScriptedIssueTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueTrackerCall {
    /// `create_issue`.
    Create(NewIssue),
    /// `transition_issue`.
    Transition {
        /// Issue key.
        key: String,
        /// Transition identifier.
        transition_id: String,
    },
    /// `log_work`.
    LogWork {
        /// Issue key.
        key: String,
        /// Logged entry.
        entry: WorkLogEntry,
    },
}

#[derive(Debug)]
struct IssueScript {
    create: Reply<IssueLink>,
    transition: Reply<()>,
    log_work: Reply<()>,
    calls: Vec<IssueTrackerCall>,
}

/// Issue tracker fake.
#[derive(Debug, Clone)]
pub struct ScriptedIssueTracker {
    script: Arc<Mutex<IssueScript>>,
}

impl ScriptedIssueTracker {
    /// Creates a tracker that answers every call successfully, creating
    /// issues as `key`.
    ///
    /// # Errors
    ///
    /// Returns the key validation error when `key` is not a valid issue key.
    pub fn succeeding(key: &str) -> Result<Self, crate::task::domain::TaskDomainError> {
        let link = IssueLink {
            id: "10000".to_owned(),
            key: IssueKey::new(key)?,
            url: "http://www.example.com/rest/api/3/issue/10000".to_owned(),
        };
        Ok(Self::with_replies(
            Reply::Respond {
                status: 201,
                payload: Some(link),
            },
            Reply::no_content(),
            Reply::Respond {
                status: 201,
                payload: Some(()),
            },
        ))
    }

    /// Creates a tracker with explicit replies per operation.
    #[must_use]
    pub fn with_replies(
        create: Reply<IssueLink>,
        transition: Reply<()>,
        log_work: Reply<()>,
    ) -> Self {
        Self {
            script: Arc::new(Mutex::new(IssueScript {
                create,
                transition,
                log_work,
                calls: Vec::new(),
            })),
        }
    }

    /// Replaces the reply to later issue creations.
    pub fn reply_to_creates_with(&self, reply: Reply<IssueLink>) {
        lock(&self.script).create = reply;
    }

    /// Replaces the reply to later transitions.
    pub fn reply_to_transitions_with(&self, reply: Reply<()>) {
        lock(&self.script).transition = reply;
    }

    /// Returns the calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<IssueTrackerCall> {
        lock(&self.script).calls.clone()
    }
}

#[async_trait]
impl IssueTracker for ScriptedIssueTracker {
    async fn create_issue(&self, issue: &NewIssue) -> RemoteResult<IssueLink> {
        let mut script = lock(&self.script);
        script.calls.push(IssueTrackerCall::Create(issue.clone()));
        script.create.replay()
    }

    async fn transition_issue(&self, key: &IssueKey, transition_id: &str) -> RemoteResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(IssueTrackerCall::Transition {
            key: key.to_string(),
            transition_id: transition_id.to_owned(),
        });
        script.transition.replay()
    }

    async fn log_work(&self, key: &IssueKey, entry: &WorkLogEntry) -> RemoteResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(IssueTrackerCall::LogWork {
            key: key.to_string(),
            entry: entry.clone(),
        });
        script.log_work.replay()
    }
}

/// A call received by [`ScriptedStoryTracker`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryTrackerCall {
    /// `fetch_story`.
    Fetch(String),
    /// `create_story`.
    Create(NewStory),
    /// `update_story_state`.
    UpdateState {
        /// Story identifier.
        id: String,
        /// Requested state.
        state: StoryState,
    },
}

#[derive(Debug)]
struct StoryScript {
    fetch: Reply<StoryDetails>,
    create: Reply<StoryDetails>,
    update: Reply<()>,
    calls: Vec<StoryTrackerCall>,
}

/// Story tracker fake.
#[derive(Debug, Clone)]
pub struct ScriptedStoryTracker {
    script: Arc<Mutex<StoryScript>>,
}

impl ScriptedStoryTracker {
    /// Creates a tracker that answers every call successfully, creating
    /// stories as `story_id`.
    ///
    /// # Errors
    ///
    /// Returns the id validation error when `story_id` is not a valid story id.
    pub fn succeeding(story_id: &str) -> Result<Self, crate::task::domain::TaskDomainError> {
        let story = StoryDetails {
            id: StoryId::new(story_id)?,
            name: "Scripted story".to_owned(),
            description: None,
            url: None,
        };
        Ok(Self::with_replies(
            Reply::ok(story.clone()),
            Reply::ok(story),
            Reply::ok(()),
        ))
    }

    /// Creates a tracker with explicit replies per operation.
    #[must_use]
    pub fn with_replies(
        fetch: Reply<StoryDetails>,
        create: Reply<StoryDetails>,
        update: Reply<()>,
    ) -> Self {
        Self {
            script: Arc::new(Mutex::new(StoryScript {
                fetch,
                create,
                update,
                calls: Vec::new(),
            })),
        }
    }

    /// Replaces the reply to later state updates.
    pub fn reply_to_updates_with(&self, reply: Reply<()>) {
        lock(&self.script).update = reply;
    }

    /// Returns the calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<StoryTrackerCall> {
        lock(&self.script).calls.clone()
    }
}

#[async_trait]
impl StoryTracker for ScriptedStoryTracker {
    async fn fetch_story(&self, id: &StoryId) -> RemoteResult<StoryDetails> {
        let mut script = lock(&self.script);
        script.calls.push(StoryTrackerCall::Fetch(id.to_string()));
        script.fetch.replay()
    }

    async fn create_story(&self, story: &NewStory) -> RemoteResult<StoryDetails> {
        let mut script = lock(&self.script);
        script.calls.push(StoryTrackerCall::Create(story.clone()));
        script.create.replay()
    }

    async fn update_story_state(&self, id: &StoryId, state: StoryState) -> RemoteResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(StoryTrackerCall::UpdateState {
            id: id.to_string(),
            state,
        });
        script.update.replay()
    }
}

/// A call received by [`ScriptedSourceControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceControlCall {
    /// `rebase_onto_upstream`.
    Rebase,
    /// `create_branch`.
    CreateBranch(String),
    /// `checkout`.
    Checkout(String),
    /// `commit_all`.
    Commit(String),
    /// `run_formatter`.
    Format(String),
    /// `push`.
    Push,
    /// `open_pull_request`.
    OpenPullRequest(PullRequestDraft),
}

#[derive(Debug)]
struct GitScript {
    branch: BranchName,
    last_commit_subject: Option<String>,
    push_error: Option<SourceControlError>,
    rebase_error: Option<SourceControlError>,
    pull_request: Reply<PullRequestCreated>,
    calls: Vec<SourceControlCall>,
}

/// Source-control fake tracking the checked-out branch.
#[derive(Debug, Clone)]
pub struct ScriptedSourceControl {
    script: Arc<Mutex<GitScript>>,
}

impl ScriptedSourceControl {
    /// Creates a working copy checked out on `branch`.
    #[must_use]
    pub fn on_branch(branch: BranchName) -> Self {
        Self {
            script: Arc::new(Mutex::new(GitScript {
                branch,
                last_commit_subject: None,
                push_error: None,
                rebase_error: None,
                pull_request: Reply::Respond {
                    status: 201,
                    payload: Some(PullRequestCreated {
                        number: 1,
                        url: "https://github.com/example/repo/pull/1".to_owned(),
                    }),
                },
                calls: Vec::new(),
            })),
        }
    }

    /// Sets the subject reported for the latest commit.
    #[must_use]
    pub fn with_last_commit_subject(self, subject: impl Into<String>) -> Self {
        lock(&self.script).last_commit_subject = Some(subject.into());
        self
    }

    /// Makes every push fail with `error`.
    #[must_use]
    pub fn with_push_error(self, error: SourceControlError) -> Self {
        lock(&self.script).push_error = Some(error);
        self
    }

    /// Makes every rebase fail with `error`.
    #[must_use]
    pub fn with_rebase_error(self, error: SourceControlError) -> Self {
        lock(&self.script).rebase_error = Some(error);
        self
    }

    /// Sets the reply to pull request creation.
    #[must_use]
    pub fn with_pull_request_reply(self, reply: Reply<PullRequestCreated>) -> Self {
        lock(&self.script).pull_request = reply;
        self
    }

    /// Returns the currently checked-out branch.
    #[must_use]
    pub fn checked_out(&self) -> BranchName {
        lock(&self.script).branch.clone()
    }

    /// Returns the calls received so far, excluding read-only queries.
    #[must_use]
    pub fn calls(&self) -> Vec<SourceControlCall> {
        lock(&self.script).calls.clone()
    }
}

#[async_trait]
impl SourceControl for ScriptedSourceControl {
    async fn current_branch(&self, _workdir: &Utf8Path) -> SourceControlResult<BranchName> {
        Ok(lock(&self.script).branch.clone())
    }

    async fn last_commit_subject(&self, _workdir: &Utf8Path) -> SourceControlResult<Option<String>> {
        Ok(lock(&self.script).last_commit_subject.clone())
    }

    async fn rebase_onto_upstream(&self, _workdir: &Utf8Path) -> SourceControlResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(SourceControlCall::Rebase);
        script.rebase_error.clone().map_or(Ok(()), Err)
    }

    async fn create_branch(
        &self,
        _workdir: &Utf8Path,
        branch: &BranchName,
    ) -> SourceControlResult<()> {
        let mut script = lock(&self.script);
        script
            .calls
            .push(SourceControlCall::CreateBranch(branch.to_string()));
        script.branch = branch.clone();
        Ok(())
    }

    async fn checkout(&self, _workdir: &Utf8Path, branch: &BranchName) -> SourceControlResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(SourceControlCall::Checkout(branch.to_string()));
        script.branch = branch.clone();
        Ok(())
    }

    async fn commit_all(&self, _workdir: &Utf8Path, message: &str) -> SourceControlResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(SourceControlCall::Commit(message.to_owned()));
        script.last_commit_subject = Some(message.to_owned());
        Ok(())
    }

    async fn run_formatter(&self, _workdir: &Utf8Path, command: &str) -> SourceControlResult<()> {
        lock(&self.script)
            .calls
            .push(SourceControlCall::Format(command.to_owned()));
        Ok(())
    }

    async fn push(&self, _workdir: &Utf8Path) -> SourceControlResult<()> {
        let mut script = lock(&self.script);
        script.calls.push(SourceControlCall::Push);
        script.push_error.clone().map_or(Ok(()), Err)
    }

    async fn open_pull_request(
        &self,
        _repository: &RepositoryFullName,
        draft: &PullRequestDraft,
    ) -> RemoteResult<PullRequestCreated> {
        let mut script = lock(&self.script);
        script
            .calls
            .push(SourceControlCall::OpenPullRequest(draft.clone()));
        script.pull_request.replay()
    }
}
