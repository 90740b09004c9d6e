//! Task list controller.
//!
//! # Responsibility
//! - Mirror storage into an in-memory list for rendering.
//! - Run manual sync and connectivity-triggered sync.
//!
//! # Invariants
//! - `is_refreshing` is `true` only while `synchronize` runs.
//! - Connectivity-triggered sync never surfaces errors; they are logged.
//! - Dropping the controller drops its connectivity subscription.

use super::{AppError, ConfirmPrompt, DELETE_CONFIRMATION};
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use crate::service::task_service::TaskService;
use crate::sync::connectivity::{ConnectivityProvider, ConnectivityState, Subscription};
use crate::sync::remote::RemoteBackend;
use crate::sync::sync_service::{SyncOutcome, SyncReport, SyncService};
use log::{error, info, warn};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

/// Screen-level state machine for the task list.
pub struct TaskListController<R, B, C>
where
    R: TaskRepository + Clone,
    B: RemoteBackend,
    C: ConnectivityProvider,
{
    service: TaskService<R>,
    sync: SyncService<R, B, C>,
    tasks: Vec<Task>,
    is_online: bool,
    is_refreshing: bool,
    events: Receiver<ConnectivityState>,
    _subscription: Subscription,
}

impl<R, B, C> TaskListController<R, B, C>
where
    R: TaskRepository + Clone,
    B: RemoteBackend,
    C: ConnectivityProvider,
{
    /// Builds a controller and subscribes to connectivity transitions.
    ///
    /// The visible list starts empty; call `load` to populate it.
    pub fn new(repo: R, backend: B, connectivity: C) -> Self {
        let (sender, events) = mpsc::channel::<ConnectivityState>();
        let subscription = connectivity.subscribe(Arc::new(move |state: ConnectivityState| {
            let _ = sender.send(state);
        }));
        let is_online = connectivity.current_state().is_connected();

        Self {
            service: TaskService::new(repo.clone()),
            sync: SyncService::new(repo, backend, connectivity),
            tasks: Vec::new(),
            is_online,
            is_refreshing: false,
            events,
            _subscription: subscription,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_online(&self) -> bool {
        self.is_online
    }

    pub fn is_refreshing(&self) -> bool {
        self.is_refreshing
    }

    /// Prompt the UI must confirm before calling `delete_task`.
    pub fn delete_confirmation(&self) -> ConfirmPrompt {
        DELETE_CONFIRMATION
    }

    /// Reloads the visible list from storage.
    pub fn load(&mut self) -> Result<&[Task], AppError> {
        match self.service.list_tasks() {
            Ok(tasks) => {
                self.tasks = tasks;
                Ok(&self.tasks)
            }
            Err(err) => {
                error!("event=tasks_load module=app status=error error={err}");
                Err(AppError::Load(err))
            }
        }
    }

    /// Stores a new task and appends it to the visible list.
    pub fn add_task(&mut self, title: &str) -> Result<Task, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::EmptyTitle);
        }
        let task = self.service.add_task(title).map_err(AppError::Add)?;
        self.tasks.push(task.clone());
        Ok(task)
    }

    /// Deletes a task the user already confirmed.
    pub fn delete_task(&mut self, id: TaskId) -> Result<bool, AppError> {
        let removed = self.service.delete_task(id).map_err(AppError::Delete)?;
        self.tasks.retain(|task| task.id != id);
        Ok(removed)
    }

    /// Manual sync / pull-to-refresh.
    ///
    /// # Errors
    /// - `Offline` without connectivity; storage is untouched.
    /// - `Sync` or `Load` when the pass or the reload fails.
    pub fn synchronize(&mut self) -> Result<SyncReport, AppError> {
        self.is_refreshing = true;
        let result = self.synchronize_inner();
        self.is_refreshing = false;
        result
    }

    fn synchronize_inner(&mut self) -> Result<SyncReport, AppError> {
        let state = self.sync.connectivity().current_state();
        self.is_online = state.is_connected();
        if !self.is_online {
            warn!("event=sync_manual module=app status=error reason=offline");
            return Err(AppError::Offline);
        }

        match self.sync.sync_tasks() {
            Ok(SyncOutcome::Completed(report)) => {
                self.load()?;
                Ok(report)
            }
            Ok(SyncOutcome::Offline) => Err(AppError::Offline),
            Err(err) => Err(AppError::Sync(err)),
        }
    }

    /// Applies one connectivity transition; syncs when connected.
    ///
    /// Returns the report of the triggered pass, if one completed.
    pub fn handle_connectivity_change(&mut self, state: ConnectivityState) -> Option<SyncReport> {
        self.is_online = state.is_connected();
        info!("event=connectivity_apply module=app status=ok state={state}");
        if !self.is_online {
            return None;
        }

        match self.sync.sync_tasks() {
            Ok(SyncOutcome::Completed(report)) => {
                if let Err(err) = self.load() {
                    warn!("event=sync_auto module=app status=error stage=reload error={err}");
                }
                Some(report)
            }
            Ok(SyncOutcome::Offline) => None,
            Err(err) => {
                warn!("event=sync_auto module=app status=error stage=sync error={err}");
                None
            }
        }
    }

    /// Drains queued connectivity transitions in arrival order.
    ///
    /// Returns how many transitions were applied.
    pub fn process_connectivity_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(state) = self.events.try_recv() {
            self.handle_connectivity_change(state);
            applied += 1;
        }
        applied
    }
}
