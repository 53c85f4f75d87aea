//! Task lifecycle engine.
//!
//! A task moves through `created -> started -> {finished, paused, aborted,
//! aborted_without_time}`. Each transition drives two synchronisation
//! machines, one per external tracker, and, for some kinds, a git workflow.
//! Remote failures never abort a transition; they are announced once per
//! task and event. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
