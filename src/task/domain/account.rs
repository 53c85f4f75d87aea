//! Credential sets for the external systems.

use serde::{Deserialize, Serialize};
use std::fmt;

/// External system an account belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalSystem {
    /// The issue tracker.
    IssueTracker,
    /// The story tracker.
    StoryTracker,
    /// The source-control host.
    SourceControl,
    /// Outbound mail.
    Mail,
}

/// One credential set.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login e-mail.
    pub email: String,
    /// Password or API token.
    pub secret: String,
    /// Optional username, used as the issue assignee.
    #[serde(default)]
    pub username: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// The active account per external system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Accounts {
    /// Issue tracker account.
    pub issue_tracker: Option<Credentials>,
    /// Story tracker account.
    pub story_tracker: Option<Credentials>,
    /// Source-control host account.
    pub source_control: Option<Credentials>,
    /// Mail account.
    pub mail: Option<Credentials>,
}

impl Accounts {
    /// Returns the credentials configured for a system.
    #[must_use]
    pub const fn for_system(&self, system: ExternalSystem) -> Option<&Credentials> {
        match system {
            ExternalSystem::IssueTracker => self.issue_tracker.as_ref(),
            ExternalSystem::StoryTracker => self.story_tracker.as_ref(),
            ExternalSystem::SourceControl => self.source_control.as_ref(),
            ExternalSystem::Mail => self.mail.as_ref(),
        }
    }

    /// Returns whether an account is configured for a system.
    #[must_use]
    pub const fn is_configured(&self, system: ExternalSystem) -> bool {
        self.for_system(system).is_some()
    }
}
