//! Task kinds and the per-kind variant policy table.
//!
//! Each kind resolves to a static [`VariantPolicy`] describing how it is
//! mirrored into the story tracker and which source-control workflow it
//! uses. Project-specific values (issue type identifiers, auto-create
//! switches) are looked up through the policy against a [`Project`].

use super::{ParseTaskKindError, Project};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of tracked work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Routine maintenance work.
    Chore,
    /// Defect repair delivered through its own branch and pull request.
    Bug,
    /// New functionality delivered through its own branch and pull request.
    Feature,
    /// Small correction committed directly on the current branch.
    Fix,
    /// Time spent in meetings.
    Meeting,
}

impl TaskKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 5] = [
        Self::Chore,
        Self::Bug,
        Self::Feature,
        Self::Fix,
        Self::Meeting,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chore => "chore",
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Fix => "fix",
            Self::Meeting => "meeting",
        }
    }

    /// Returns the static policy for this kind.
    #[must_use]
    pub const fn policy(self) -> &'static VariantPolicy {
        match self {
            Self::Chore => &CHORE_POLICY,
            Self::Bug => &BUG_POLICY,
            Self::Feature => &FEATURE_POLICY,
            Self::Fix => &FIX_POLICY,
            Self::Meeting => &MEETING_POLICY,
        }
    }
}

impl TryFrom<&str> for TaskKind {
    type Error = ParseTaskKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| ParseTaskKindError(value.to_owned()))
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Story classification sent to the story tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryType {
    /// A user-facing feature story.
    Feature,
    /// A bug story.
    Bug,
    /// A chore story.
    Chore,
}

impl StoryType {
    /// Returns the tracker wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feature => "feature",
            Self::Bug => "bug",
            Self::Chore => "chore",
        }
    }
}

/// Story `current_state` values the lifecycle writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryState {
    /// Newly created, not yet worked on.
    Unstarted,
    /// Work in progress.
    Started,
    /// Work delivered, awaiting acceptance.
    Finished,
    /// Work accepted; used for kinds with no acceptance step.
    Accepted,
}

impl StoryState {
    /// Returns the tracker wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Accepted => "accepted",
        }
    }
}

/// Source-control workflow layered on the base lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workflow {
    /// No source-control side effects.
    None,
    /// Commit and push on the current branch when work stops.
    Commit,
    /// Work on a dedicated branch, committed, pushed and proposed as a pull
    /// request against the branch it was started from.
    SeparateBranch,
}

impl Workflow {
    /// Returns whether pending changes are committed and pushed when work
    /// stops.
    #[must_use]
    pub const fn commits(self) -> bool {
        matches!(self, Self::Commit | Self::SeparateBranch)
    }

    /// Returns whether the task works on its own branch.
    #[must_use]
    pub const fn uses_branch(self) -> bool {
        matches!(self, Self::SeparateBranch)
    }
}

/// Per-kind behaviour resolved from [`TaskKind::policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPolicy {
    /// Kind this policy belongs to.
    pub kind: TaskKind,
    /// Story classification used when creating stories.
    pub story_type: StoryType,
    /// State written to the story when the task finishes.
    pub story_finish_state: StoryState,
    /// Whether created stories carry a description and estimate.
    pub detailed_story: bool,
    /// Source-control workflow for the kind.
    pub workflow: Workflow,
}

impl VariantPolicy {
    /// Returns the issue-type identifier configured for this kind.
    #[must_use]
    pub fn issue_type_id<'p>(&self, project: &'p Project) -> Option<&'p str> {
        let ids = &project.issue_tracker.issue_types;
        match self.kind {
            TaskKind::Chore => ids.chore.as_deref(),
            TaskKind::Bug => ids.bug.as_deref(),
            TaskKind::Feature => ids.feature.as_deref(),
            TaskKind::Fix => ids.fix.as_deref(),
            TaskKind::Meeting => ids.meeting.as_deref(),
        }
    }

    /// Returns whether tasks of this kind get a story created automatically.
    #[must_use]
    pub const fn auto_creates_story(&self, project: &Project) -> bool {
        let flags = &project.story_tracker.auto_create;
        match self.kind {
            TaskKind::Chore => flags.chores,
            TaskKind::Bug => flags.bugs,
            TaskKind::Feature => flags.features,
            TaskKind::Fix => flags.fixes,
            TaskKind::Meeting => flags.meetings,
        }
    }
}

const CHORE_POLICY: VariantPolicy = VariantPolicy {
    kind: TaskKind::Chore,
    story_type: StoryType::Chore,
    story_finish_state: StoryState::Accepted,
    detailed_story: false,
    workflow: Workflow::None,
};

const BUG_POLICY: VariantPolicy = VariantPolicy {
    kind: TaskKind::Bug,
    story_type: StoryType::Bug,
    story_finish_state: StoryState::Finished,
    detailed_story: true,
    workflow: Workflow::SeparateBranch,
};

const FEATURE_POLICY: VariantPolicy = VariantPolicy {
    kind: TaskKind::Feature,
    story_type: StoryType::Feature,
    story_finish_state: StoryState::Finished,
    detailed_story: true,
    workflow: Workflow::SeparateBranch,
};

const FIX_POLICY: VariantPolicy = VariantPolicy {
    kind: TaskKind::Fix,
    story_type: StoryType::Chore,
    story_finish_state: StoryState::Accepted,
    detailed_story: false,
    workflow: Workflow::Commit,
};

const MEETING_POLICY: VariantPolicy = VariantPolicy {
    kind: TaskKind::Meeting,
    story_type: StoryType::Chore,
    story_finish_state: StoryState::Accepted,
    detailed_story: false,
    workflow: Workflow::None,
};
