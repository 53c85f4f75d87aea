//! Shared project and account fixtures.

use camino::Utf8PathBuf;

use crate::task::{
    domain::{
        Accounts, AutoCreateFlags, Credentials, IssueTrackerSettings, IssueTypeIds, Project,
        RepositoryFullName, SourceControlSettings, StoryTrackerSettings, TransitionIds,
    },
    services::{Invocation, WorkflowSettings},
};

pub(super) const ISSUE_TRACKER_URL: &str = "http://www.example.com/";
pub(super) const STORY_PROJECT_ID: &str = "2374972";

pub(super) fn credentials() -> Credentials {
    Credentials {
        email: "developer@example.com".to_owned(),
        secret: "api-token".to_owned(),
        username: Some("developer".to_owned()),
    }
}

pub(super) fn all_accounts() -> Accounts {
    Accounts {
        issue_tracker: Some(credentials()),
        story_tracker: Some(credentials()),
        source_control: Some(credentials()),
        mail: None,
    }
}

pub(super) fn project() -> Project {
    Project {
        name: "test".to_owned(),
        folder_path: Utf8PathBuf::from("/work/test"),
        issue_tracker: IssueTrackerSettings {
            url: ISSUE_TRACKER_URL.to_owned(),
            project_id: "10000".to_owned(),
            issue_types: IssueTypeIds {
                feature: Some("10001".to_owned()),
                bug: Some("10004".to_owned()),
                chore: Some("10002".to_owned()),
                fix: Some("10003".to_owned()),
                meeting: Some("10005".to_owned()),
            },
            transitions: TransitionIds {
                todo: Some("11".to_owned()),
                in_progress: Some("21".to_owned()),
                done: Some("31".to_owned()),
            },
        },
        story_tracker: StoryTrackerSettings {
            project_id: Some(STORY_PROJECT_ID.to_owned()),
            auto_create: AutoCreateFlags {
                features: true,
                bugs: true,
                ..AutoCreateFlags::default()
            },
            ..StoryTrackerSettings::default()
        },
        source_control: SourceControlSettings {
            repository: Some(RepositoryFullName::new("example/repo").expect("valid repository")),
            formatter: None,
        },
    }
}

/// Every account configured, git disabled.
pub(super) fn remote_only() -> Invocation {
    Invocation {
        project: project(),
        accounts: all_accounts(),
        settings: WorkflowSettings { enable_git: false },
    }
}

/// Every account configured, git enabled.
pub(super) fn with_git() -> Invocation {
    Invocation {
        settings: WorkflowSettings { enable_git: true },
        ..remote_only()
    }
}

/// No accounts, git disabled.
pub(super) fn offline() -> Invocation {
    Invocation {
        accounts: Accounts::default(),
        ..remote_only()
    }
}
