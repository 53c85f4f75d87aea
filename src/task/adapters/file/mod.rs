//! File-backed persistence adapters.

pub mod task;

pub use task::{JsonFileTaskRepository, TASKS_FILE_NAME};
