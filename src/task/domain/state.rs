//! Lifecycle and synchronisation state machines.
//!
//! Every machine is an explicit `(state, operation) -> next state` table.
//! A `None` result means the operation is inert in the current state.

use super::{ParseTaskStateError, Workflow};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Task has been recorded but work has not started.
    Created,
    /// Work is in progress.
    Started,
    /// Work was delivered.
    Finished,
    /// Work stopped without delivery.
    Paused,
    /// Work was abandoned; time is still logged.
    Aborted,
    /// Work was abandoned and its time discarded.
    AbortedWithoutTime,
}

impl LifecycleState {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Paused => "paused",
            Self::Aborted => "aborted",
            Self::AbortedWithoutTime => "aborted_without_time",
        }
    }

    /// Returns whether the state ends the lifecycle.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Paused | Self::Aborted | Self::AbortedWithoutTime
        )
    }

    /// Plans a lifecycle operation from this state.
    ///
    /// Returns `None` when the operation does not apply, in which case the
    /// caller performs no state change and no side effects.
    #[must_use]
    pub fn plan(self, operation: LifecycleOperation, workflow: Workflow) -> Option<TransitionPlan> {
        let next = match (self, operation) {
            (Self::Created, LifecycleOperation::Start) => Self::Started,
            (Self::Started, LifecycleOperation::Finish) => Self::Finished,
            (Self::Started, LifecycleOperation::Pause) => Self::Paused,
            (Self::Started, LifecycleOperation::Abort) => Self::Aborted,
            (Self::Started, LifecycleOperation::AbortWithoutTime) => Self::AbortedWithoutTime,
            _ => return None,
        };
        Some(TransitionPlan {
            next,
            effects: effects_for(operation, workflow),
        })
    }
}

impl TryFrom<&str> for LifecycleState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "created" => Ok(Self::Created),
            "started" => Ok(Self::Started),
            "finished" => Ok(Self::Finished),
            "paused" => Ok(Self::Paused),
            "aborted" => Ok(Self::Aborted),
            "aborted_without_time" => Ok(Self::AbortedWithoutTime),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operations accepted by the lifecycle machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleOperation {
    /// `created -> started`.
    Start,
    /// `started -> finished`.
    Finish,
    /// `started -> paused`.
    Pause,
    /// `started -> aborted`.
    Abort,
    /// `started -> aborted_without_time`.
    AbortWithoutTime,
}

/// Side effects executed, in order, by a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effect {
    /// Record `started_at`, backdated by the additional time.
    StampStart,
    /// Record `finished_at`.
    StampFinish,
    /// Issue sync `create`.
    CreateIssue,
    /// Issue sync `start`.
    StartIssue,
    /// Issue sync `close`.
    CloseIssue,
    /// Append the elapsed time to the issue's work log.
    LogWork,
    /// Story sync `create`.
    CreateStory,
    /// Story sync `start`.
    StartStory,
    /// Story sync `finish`.
    FinishStory,
    /// Rebase the working tree onto its upstream.
    RebaseOntoUpstream,
    /// Create and check out the task branch.
    CreateBranch,
    /// Commit pending work, run the formatter, commit again and push.
    CommitAndPush,
    /// Open a pull request from the task branch to its parent.
    OpenPullRequest,
    /// Check the parent branch back out.
    CheckoutParent,
    /// Announce the elapsed time.
    ReportElapsed,
}

/// Outcome of planning a lifecycle operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionPlan {
    /// State the task moves to.
    pub next: LifecycleState,
    /// Effects to run, in order.
    pub effects: Vec<Effect>,
}

fn effects_for(operation: LifecycleOperation, workflow: Workflow) -> Vec<Effect> {
    let mut effects = Vec::new();
    match operation {
        LifecycleOperation::Start => {
            effects.extend([
                Effect::StampStart,
                Effect::CreateIssue,
                Effect::StartIssue,
                Effect::CreateStory,
                Effect::StartStory,
            ]);
            if workflow.uses_branch() {
                effects.push(Effect::CreateBranch);
            }
        }
        LifecycleOperation::Finish => {
            if workflow == Workflow::Commit {
                effects.push(Effect::RebaseOntoUpstream);
            }
            effects.extend(stop_effects());
            if workflow.commits() {
                effects.push(Effect::CommitAndPush);
            }
            if workflow.uses_branch() {
                effects.extend([Effect::OpenPullRequest, Effect::CheckoutParent]);
            }
            effects.push(Effect::ReportElapsed);
        }
        LifecycleOperation::Pause => {
            effects.extend(stop_effects());
            if workflow.commits() {
                effects.push(Effect::CommitAndPush);
            }
            effects.push(Effect::ReportElapsed);
        }
        LifecycleOperation::Abort => {
            effects.extend(stop_effects());
            if workflow.uses_branch() {
                effects.push(Effect::CheckoutParent);
            }
            effects.push(Effect::ReportElapsed);
        }
        LifecycleOperation::AbortWithoutTime => {
            effects.extend([Effect::StampFinish, Effect::CloseIssue, Effect::ReportElapsed]);
        }
    }
    effects
}

const fn stop_effects() -> [Effect; 4] {
    [
        Effect::StampFinish,
        Effect::CloseIssue,
        Effect::LogWork,
        Effect::FinishStory,
    ]
}

/// Issue tracker synchronisation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSyncState {
    /// Nothing mirrored yet.
    #[default]
    Pending,
    /// Issue exists in the tracker.
    Created,
    /// Issue moved to in-progress.
    Started,
    /// Issue moved to done.
    Closed,
}

/// Operations on the issue sync machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueSyncOperation {
    /// Create the issue.
    Create,
    /// Move the issue to in-progress.
    Start,
    /// Move the issue to done.
    Close,
}

impl IssueSyncState {
    /// Returns the state reached by `operation`, if it applies.
    #[must_use]
    pub const fn next(self, operation: IssueSyncOperation) -> Option<Self> {
        match (self, operation) {
            (Self::Pending, IssueSyncOperation::Create) => Some(Self::Created),
            (Self::Created, IssueSyncOperation::Start) => Some(Self::Started),
            (Self::Created | Self::Started, IssueSyncOperation::Close) => Some(Self::Closed),
            _ => None,
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Created => "created",
            Self::Started => "started",
            Self::Closed => "closed",
        }
    }
}

/// Story tracker synchronisation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorySyncState {
    /// Nothing mirrored yet.
    #[default]
    Pending,
    /// Story exists in the tracker.
    Created,
    /// Story moved to started.
    Started,
    /// Story moved to finished or accepted.
    Finished,
}

/// Operations on the story sync machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorySyncOperation {
    /// Create the story.
    Create,
    /// Move the story to started.
    Start,
    /// Move the story to finished or accepted.
    Finish,
}

impl StorySyncState {
    /// Returns the state reached by `operation`, if it applies.
    #[must_use]
    pub const fn next(self, operation: StorySyncOperation) -> Option<Self> {
        match (self, operation) {
            (Self::Pending, StorySyncOperation::Create) => Some(Self::Created),
            (Self::Pending | Self::Created, StorySyncOperation::Start) => Some(Self::Started),
            (Self::Pending | Self::Created | Self::Started, StorySyncOperation::Finish) => {
                Some(Self::Finished)
            }
            _ => None,
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Created => "created",
            Self::Started => "started",
            Self::Finished => "finished",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const ALL_OPERATIONS: [LifecycleOperation; 5] = [
        LifecycleOperation::Start,
        LifecycleOperation::Finish,
        LifecycleOperation::Pause,
        LifecycleOperation::Abort,
        LifecycleOperation::AbortWithoutTime,
    ];

    #[rstest]
    #[case(LifecycleState::Created, LifecycleOperation::Start, Some(LifecycleState::Started))]
    #[case(LifecycleState::Created, LifecycleOperation::Finish, None)]
    #[case(LifecycleState::Created, LifecycleOperation::Abort, None)]
    #[case(LifecycleState::Started, LifecycleOperation::Start, None)]
    #[case(LifecycleState::Started, LifecycleOperation::Finish, Some(LifecycleState::Finished))]
    #[case(LifecycleState::Started, LifecycleOperation::Pause, Some(LifecycleState::Paused))]
    #[case(LifecycleState::Started, LifecycleOperation::Abort, Some(LifecycleState::Aborted))]
    #[case(
        LifecycleState::Started,
        LifecycleOperation::AbortWithoutTime,
        Some(LifecycleState::AbortedWithoutTime)
    )]
    fn lifecycle_table_resolves_next_state(
        #[case] from: LifecycleState,
        #[case] operation: LifecycleOperation,
        #[case] expected: Option<LifecycleState>,
    ) {
        let next = from.plan(operation, Workflow::None).map(|plan| plan.next);
        assert_eq!(next, expected);
    }

    #[rstest]
    #[case(LifecycleState::Finished)]
    #[case(LifecycleState::Paused)]
    #[case(LifecycleState::Aborted)]
    #[case(LifecycleState::AbortedWithoutTime)]
    fn terminal_states_accept_no_operation(#[case] state: LifecycleState) {
        assert!(state.is_terminal());
        for operation in ALL_OPERATIONS {
            assert!(state.plan(operation, Workflow::SeparateBranch).is_none());
        }
    }

    #[test]
    fn separate_branch_finish_opens_pull_request_after_commit() {
        let plan = LifecycleState::Started
            .plan(LifecycleOperation::Finish, Workflow::SeparateBranch)
            .expect("finish applies to started tasks");
        assert_eq!(
            plan.effects,
            vec![
                Effect::StampFinish,
                Effect::CloseIssue,
                Effect::LogWork,
                Effect::FinishStory,
                Effect::CommitAndPush,
                Effect::OpenPullRequest,
                Effect::CheckoutParent,
                Effect::ReportElapsed,
            ]
        );
    }

    #[test]
    fn commit_workflow_finish_rebases_first() {
        let plan = LifecycleState::Started
            .plan(LifecycleOperation::Finish, Workflow::Commit)
            .expect("finish applies to started tasks");
        assert_eq!(plan.effects.first(), Some(&Effect::RebaseOntoUpstream));
        assert!(!plan.effects.contains(&Effect::OpenPullRequest));
    }

    #[rstest]
    #[case(Workflow::Commit)]
    #[case(Workflow::SeparateBranch)]
    fn pause_never_opens_pull_request(#[case] workflow: Workflow) {
        let plan = LifecycleState::Started
            .plan(LifecycleOperation::Pause, workflow)
            .expect("pause applies to started tasks");
        assert!(plan.effects.contains(&Effect::CommitAndPush));
        assert!(!plan.effects.contains(&Effect::OpenPullRequest));
        assert!(!plan.effects.contains(&Effect::CheckoutParent));
    }

    #[test]
    fn abort_on_branch_workflow_only_checks_out_parent() {
        let plan = LifecycleState::Started
            .plan(LifecycleOperation::Abort, Workflow::SeparateBranch)
            .expect("abort applies to started tasks");
        assert!(plan.effects.contains(&Effect::CheckoutParent));
        assert!(!plan.effects.contains(&Effect::CommitAndPush));
        assert!(!plan.effects.contains(&Effect::OpenPullRequest));
    }

    #[test]
    fn abort_without_time_skips_work_log_and_story() {
        let plan = LifecycleState::Started
            .plan(LifecycleOperation::AbortWithoutTime, Workflow::SeparateBranch)
            .expect("abort without time applies to started tasks");
        assert_eq!(
            plan.effects,
            vec![Effect::StampFinish, Effect::CloseIssue, Effect::ReportElapsed]
        );
    }

    #[rstest]
    #[case(IssueSyncState::Pending, IssueSyncOperation::Create, Some(IssueSyncState::Created))]
    #[case(IssueSyncState::Pending, IssueSyncOperation::Start, None)]
    #[case(IssueSyncState::Pending, IssueSyncOperation::Close, None)]
    #[case(IssueSyncState::Created, IssueSyncOperation::Create, None)]
    #[case(IssueSyncState::Created, IssueSyncOperation::Close, Some(IssueSyncState::Closed))]
    #[case(IssueSyncState::Started, IssueSyncOperation::Close, Some(IssueSyncState::Closed))]
    #[case(IssueSyncState::Closed, IssueSyncOperation::Start, None)]
    fn issue_sync_never_regresses(
        #[case] from: IssueSyncState,
        #[case] operation: IssueSyncOperation,
        #[case] expected: Option<IssueSyncState>,
    ) {
        let next = from.next(operation);
        assert_eq!(next, expected);
        if let Some(next_state) = next {
            assert!(next_state > from);
        }
    }

    #[rstest]
    #[case(StorySyncState::Pending, StorySyncOperation::Start, Some(StorySyncState::Started))]
    #[case(StorySyncState::Created, StorySyncOperation::Create, None)]
    #[case(StorySyncState::Started, StorySyncOperation::Start, None)]
    #[case(StorySyncState::Started, StorySyncOperation::Finish, Some(StorySyncState::Finished))]
    #[case(StorySyncState::Finished, StorySyncOperation::Finish, None)]
    fn story_sync_never_regresses(
        #[case] from: StorySyncState,
        #[case] operation: StorySyncOperation,
        #[case] expected: Option<StorySyncState>,
    ) {
        assert_eq!(from.next(operation), expected);
    }
}
