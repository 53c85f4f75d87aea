//! At-most-once announcement bookkeeping.
//!
//! The ledger records, per task and per [`SyncEvent`], which outcome was
//! shown to the user. Once any outcome has been recorded for an event, no
//! further outcome for that event is announced for the same task.

use super::OutcomeCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// External action whose outcome is announced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncEvent {
    /// Issue creation.
    IssueCreate,
    /// Issue moved to in-progress.
    IssueStart,
    /// Issue moved to done.
    IssueClose,
    /// Work log appended to the issue.
    WorkLog,
    /// Story details fetched for a new task.
    StoryFetch,
    /// Story creation.
    StoryCreate,
    /// Story moved to started.
    StoryStart,
    /// Story moved to finished or accepted.
    StoryFinish,
    /// Working tree rebased onto upstream.
    GitRebase,
    /// Branch pushed to the remote.
    GitPush,
    /// Pull request opened.
    PullRequest,
}

impl SyncEvent {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IssueCreate => "issue_create",
            Self::IssueStart => "issue_start",
            Self::IssueClose => "issue_close",
            Self::WorkLog => "work_log",
            Self::StoryFetch => "story_fetch",
            Self::StoryCreate => "story_create",
            Self::StoryStart => "story_start",
            Self::StoryFinish => "story_finish",
            Self::GitRebase => "git_rebase",
            Self::GitPush => "git_push",
            Self::PullRequest => "pull_request",
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-task record of announced outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnouncementLedger(BTreeMap<SyncEvent, OutcomeCategory>);

impl AnnouncementLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `outcome` for `event` if nothing was announced for it yet.
    ///
    /// Returns `true` exactly once per event: on the first call, whatever
    /// the outcome. Later calls leave the ledger untouched and return
    /// `false`.
    pub fn announce_once(&mut self, event: SyncEvent, outcome: OutcomeCategory) -> bool {
        if self.0.contains_key(&event) {
            return false;
        }
        self.0.insert(event, outcome);
        true
    }

    /// Returns the outcome announced for `event`, if any.
    #[must_use]
    pub fn announced(&self, event: SyncEvent) -> Option<OutcomeCategory> {
        self.0.get(&event).copied()
    }
}
