//! JSON-file task repository.
//!
//! All tasks live in a single `tasks.json` document inside a data
//! directory. Every operation reads the document, applies its change and
//! writes it back through a temporary file, so a crash mid-write leaves the
//! previous document intact.

use async_trait::async_trait;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::sync::{Arc, Mutex};

use crate::task::{
    domain::{LifecycleState, Task, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// File name of the task document.
pub const TASKS_FILE_NAME: &str = "tasks.json";
const TASKS_TEMP_FILE_NAME: &str = "tasks.json.tmp";

/// Task repository persisted as a JSON document.
#[derive(Debug, Clone)]
pub struct JsonFileTaskRepository {
    directory: Utf8PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileTaskRepository {
    /// Opens the repository rooted at `directory`, creating the directory
    /// when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the directory cannot
    /// be created.
    pub fn open(directory: impl Into<Utf8PathBuf>) -> TaskRepositoryResult<Self> {
        let directory = directory.into();
        Dir::create_ambient_dir_all(&directory, ambient_authority())
            .map_err(TaskRepositoryError::persistence)?;
        Ok(Self {
            directory,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Returns the directory holding the task document.
    #[must_use]
    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    fn open_dir(&self) -> TaskRepositoryResult<Dir> {
        Dir::open_ambient_dir(&self.directory, ambient_authority())
            .map_err(TaskRepositoryError::persistence)
    }

    fn load(&self) -> TaskRepositoryResult<Vec<Task>> {
        let dir = self.open_dir()?;
        let contents = match dir.read_to_string(TASKS_FILE_NAME) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(TaskRepositoryError::persistence(err)),
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(TaskRepositoryError::persistence)
    }

    fn save(&self, tasks: &[Task]) -> TaskRepositoryResult<()> {
        let dir = self.open_dir()?;
        let document =
            serde_json::to_string_pretty(tasks).map_err(TaskRepositoryError::persistence)?;
        dir.write(TASKS_TEMP_FILE_NAME, document)
            .map_err(TaskRepositoryError::persistence)?;
        dir.rename(TASKS_TEMP_FILE_NAME, &dir, TASKS_FILE_NAME)
            .map_err(TaskRepositoryError::persistence)
    }

    fn modify(
        &self,
        change: impl FnOnce(&mut Vec<Task>) -> TaskRepositoryResult<()>,
    ) -> TaskRepositoryResult<()> {
        let _guard = self.write_lock.lock().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let mut tasks = self.load()?;
        change(&mut tasks)?;
        self.save(&tasks)
    }
}

#[async_trait]
impl TaskRepository for JsonFileTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.modify(|tasks| {
            if tasks.iter().any(|existing| existing.id() == task.id()) {
                return Err(TaskRepositoryError::DuplicateTask(task.id()));
            }
            tasks.push(task.clone());
            Ok(())
        })
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.modify(|tasks| {
            let slot = tasks
                .iter_mut()
                .find(|existing| existing.id() == task.id())
                .ok_or(TaskRepositoryError::NotFound(task.id()))?;
            *slot = task.clone();
            Ok(())
        })
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.load()?.into_iter().find(|task| task.id() == id))
    }

    async fn find_by_state(&self, state: LifecycleState) -> TaskRepositoryResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .load()?
            .into_iter()
            .filter(|task| task.state() == state)
            .collect();
        tasks.sort_by_key(Task::created_at);
        Ok(tasks)
    }
}
