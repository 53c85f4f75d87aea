//! Per-invocation inputs handed to the lifecycle engine.

use crate::task::domain::{Accounts, Project};

/// Switches controlling the source-control workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    /// Whether git operations run at all.
    pub enable_git: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self { enable_git: true }
    }
}

/// Everything a lifecycle operation reads from configuration.
///
/// Built once per command and passed explicitly into each operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Project the task belongs to.
    pub project: Project,
    /// Configured accounts.
    pub accounts: Accounts,
    /// Workflow switches.
    pub settings: WorkflowSettings,
}
