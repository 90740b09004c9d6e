//! Task repository over a single JSON blob.
//!
//! # Responsibility
//! - Persist the ordered task collection under one fixed storage key.
//! - Provide append/filter/flag operations as read-modify-write cycles.
//!
//! # Invariants
//! - Insertion order is preserved across every write.
//! - IDs are unique within the stored collection.
//! - An absent key reads as an empty collection.
//! - Reads reject invalid persisted state instead of masking it.

use super::kv_store::KeyValueStore;
use super::{RepoError, RepoResult};
use crate::model::task::{Task, TaskId};
use log::debug;

/// Storage key holding the serialized task collection.
pub const TASKS_STORAGE_KEY: &str = "@tasks";

/// Repository interface for task persistence.
pub trait TaskRepository {
    fn load_tasks(&self) -> RepoResult<Vec<Task>>;
    fn append_task(&self, task: &Task) -> RepoResult<()>;
    /// Returns `true` when a task with `id` was removed.
    fn delete_task(&self, id: TaskId) -> RepoResult<bool>;
    /// Returns `true` when a task with `id` was found; unknown IDs are a no-op.
    fn mark_synced(&self, id: TaskId) -> RepoResult<bool>;
    fn clear_all(&self) -> RepoResult<()>;
}

/// Task repository storing every task in one key-value entry.
#[derive(Clone)]
pub struct KvTaskRepository<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> KvTaskRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn write_tasks(&self, tasks: &[Task]) -> RepoResult<()> {
        let json = serde_json::to_string(tasks)
            .map_err(|err| RepoError::InvalidData(format!("failed to encode tasks: {err}")))?;
        self.store.set_item(TASKS_STORAGE_KEY, &json)
    }
}

impl<S: KeyValueStore> TaskRepository for KvTaskRepository<S> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        let Some(json) = self.store.get_item(TASKS_STORAGE_KEY)? else {
            return Ok(Vec::new());
        };
        decode_tasks(&json)
    }

    fn append_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let mut tasks = self.load_tasks()?;
        if tasks.iter().any(|existing| existing.id == task.id) {
            return Err(RepoError::DuplicateId(task.id));
        }
        tasks.push(task.clone());
        self.write_tasks(&tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let mut tasks = self.load_tasks()?;
        let before = tasks.len();
        tasks.retain(|task| task.id != id);
        let removed = tasks.len() != before;

        self.write_tasks(&tasks)?;
        Ok(removed)
    }

    fn mark_synced(&self, id: TaskId) -> RepoResult<bool> {
        let mut tasks = self.load_tasks()?;
        let Some(task) = tasks.iter_mut().find(|task| task.id == id) else {
            debug!("event=task_mark_synced module=repo status=skipped reason=not_found task_id={id}");
            return Ok(false);
        };
        task.mark_synced();

        self.write_tasks(&tasks)?;
        Ok(true)
    }

    fn clear_all(&self) -> RepoResult<()> {
        self.store.remove_item(TASKS_STORAGE_KEY)
    }
}

fn decode_tasks(json: &str) -> RepoResult<Vec<Task>> {
    let tasks: Vec<Task> = serde_json::from_str(json).map_err(|err| {
        RepoError::InvalidData(format!("invalid JSON under `{TASKS_STORAGE_KEY}`: {err}"))
    })?;

    for (index, task) in tasks.iter().enumerate() {
        if task.validate().is_err() {
            return Err(RepoError::InvalidData(format!(
                "task at index {index} ({}) has a blank title",
                task.id
            )));
        }
        if tasks[..index].iter().any(|earlier| earlier.id == task.id) {
            return Err(RepoError::InvalidData(format!(
                "task id {} appears more than once",
                task.id
            )));
        }
    }

    Ok(tasks)
}
