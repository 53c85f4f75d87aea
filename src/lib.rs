//! Hourglass: task lifecycle tracking with issue, story and source-control
//! synchronisation.
//!
//! A task moves through `created -> started -> {finished, paused, aborted,
//! aborted_without_time}`. Each transition drives two synchronisation
//! machines (issue tracker, story tracker) and, for some kinds, a git
//! workflow. Remote failures never abort a transition; each outcome is
//! announced at most once per task.
//!
//! # Architecture
//!
//! - **Domain**: task state, transition tables and the outcome classifier
//! - **Ports**: trait interfaces for persistence, remotes and announcements
//! - **Adapters**: HTTP clients, git shell-outs, JSON store and in-memory fakes
//!
//! # Modules
//!
//! - [`task`]: lifecycle engine
//! - [`config`]: TOML configuration
//! - [`cli`]: command-line surface
//! - [`telemetry`]: diagnostic logging

pub mod cli;
pub mod config;
pub mod task;
pub mod telemetry;
