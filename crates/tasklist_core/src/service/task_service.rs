//! Task use-case service.
//!
//! # Responsibility
//! - Provide create/list/delete entry points for core callers.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Log lines carry task IDs only, never titles.

use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoResult;
use log::{error, info};

/// Use-case service wrapper for task CRUD operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates and stores a new unsynced task.
    ///
    /// # Contract
    /// - Title is trimmed; blank titles fail with a validation error.
    /// - The returned task is the stored record, appended last.
    pub fn add_task(&self, title: impl AsRef<str>) -> RepoResult<Task> {
        let task = Task::new(title)?;
        match self.repo.append_task(&task) {
            Ok(()) => {
                info!(
                    "event=task_add module=service status=ok task_id={}",
                    task.id
                );
                Ok(task)
            }
            Err(err) => {
                error!(
                    "event=task_add module=service status=error error={}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Lists all stored tasks in insertion order.
    pub fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.repo.load_tasks()
    }

    /// Deletes one task by ID; returns whether it existed.
    pub fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        match self.repo.delete_task(id) {
            Ok(removed) => {
                info!(
                    "event=task_delete module=service status=ok task_id={} removed={}",
                    id, removed
                );
                Ok(removed)
            }
            Err(err) => {
                error!(
                    "event=task_delete module=service status=error task_id={} error={}",
                    id, err
                );
                Err(err)
            }
        }
    }

    /// Removes the whole task collection.
    pub fn clear_all_tasks(&self) -> RepoResult<()> {
        self.repo.clear_all()?;
        info!("event=task_clear module=service status=ok");
        Ok(())
    }
}
