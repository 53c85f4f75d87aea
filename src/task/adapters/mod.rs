//! Adapter implementations of the task ports.
//!
//! # Available Adapters
//!
//! - [`memory`]: in-memory storage and scripted remotes for tests
//! - [`file::JsonFileTaskRepository`]: JSON document persistence
//! - [`jira::JiraIssueTracker`]: issue tracker over the Jira REST API
//! - [`pivotal::PivotalStoryTracker`]: story tracker over the Pivotal
//!   Tracker API
//! - [`git::GitSourceControl`]: local git plus GitHub pull requests
//! - [`console::ConsoleAnnouncer`]: announcements on standard output

pub mod console;
pub mod file;
pub mod git;
pub mod http;
pub mod jira;
pub mod memory;
pub mod pivotal;
