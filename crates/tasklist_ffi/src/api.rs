//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task list use-cases to Dart via FRB.
//! - Convert every core failure into a response envelope with alert text.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Each storage read-modify-write holds one process-wide lock; the
//!   simulated send delay runs outside it.
//! - Connectivity state is process-wide and outlives individual calls.

use chrono::SecondsFormat;
use log::{error, warn};
use once_cell::sync::{Lazy, OnceCell};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tasklist_core::db::open_db;
use tasklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    AppError, ConnectivityMonitor, ConnectivityProvider, ConnectivityState, CoreConfig,
    KvTaskRepository, RemoteBackend, RepoError, RepoResult, SimulatedBackend,
    SqliteKeyValueStore, SqliteTaskRepository, SyncReport, Task, TaskId, TaskListController,
    TaskRepository, DELETE_CONFIRMATION,
};
use uuid::Uuid;

type FfiController<'conn, B> =
    TaskListController<LockedRepository<SqliteTaskRepository<'conn>>, B, ConnectivityMonitor>;

static CONFIG: OnceCell<CoreConfig> = OnceCell::new();
static CONNECTIVITY: Lazy<ConnectivityMonitor> = Lazy::new(ConnectivityMonitor::default);
static STORAGE_LOCK: Mutex<()> = Mutex::new(());

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins storage path and simulated send delay for this process.
///
/// Must run before the first task call; otherwise environment defaults are
/// already locked in. Repeating the same values is accepted.
///
/// # FFI contract
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure(db_path: String, sync_delay_ms: u64) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = CoreConfig {
        db_path: PathBuf::from(trimmed),
        sync_delay: Duration::from_millis(sync_delay_ms),
        ..CoreConfig::default()
    };

    let active = CONFIG.get_or_init(|| requested.clone());
    if active.db_path != requested.db_path || active.sync_delay != requested.sync_delay {
        return format!(
            "already configured with db_path `{}` and sync_delay_ms {}",
            active.db_path.display(),
            active.sync_delay.as_millis()
        );
    }
    String::new()
}

/// One task as rendered by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// RFC 3339 UTC creation timestamp.
    pub created_at: String,
    pub synced: bool,
}

/// List response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    pub ok: bool,
    /// Tasks in insertion order; empty on failure.
    pub items: Vec<TaskItem>,
    pub is_online: bool,
    /// Alert message on failure; empty on success.
    pub message: String,
}

/// Add/delete response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Created or deleted task on success.
    pub task: Option<TaskItem>,
    /// Alert title on failure; empty on success.
    pub alert_title: String,
    pub message: String,
}

/// Sync response envelope for manual and connectivity-triggered passes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncResponse {
    pub ok: bool,
    pub attempted: u32,
    pub synced: u32,
    pub rejected: u32,
    pub is_online: bool,
    pub alert_title: String,
    pub message: String,
}

/// Delete confirmation dialog content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePrompt {
    pub title: String,
    pub message: String,
    pub confirm_label: String,
    pub cancel_label: String,
}

/// Lists stored tasks.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list() -> TaskListResponse {
    let result = with_controller(|controller| {
        let items: Vec<TaskItem> = controller.tasks().iter().map(to_task_item).collect();
        Ok((items, controller.is_online()))
    });
    match result {
        Ok((items, is_online)) => TaskListResponse {
            ok: true,
            items,
            is_online,
            message: String::new(),
        },
        Err(err) => TaskListResponse {
            ok: false,
            items: Vec::new(),
            is_online: CONNECTIVITY.current_state().is_connected(),
            message: err.alert().message.to_string(),
        },
    }
}

/// Creates a task from the input field.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Blank titles fail without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String) -> TaskActionResponse {
    match with_controller(|controller| controller.add_task(&title)) {
        Ok(task) => TaskActionResponse::success(&task),
        Err(err) => TaskActionResponse::failure(&err),
    }
}

/// Deletes a task after the user confirmed the prompt.
///
/// Unknown IDs succeed with `task = None`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    let Ok(id) = Uuid::parse_str(task_id.trim()) else {
        warn!("event=ffi_task_delete module=ffi status=error reason=invalid_id");
        return TaskActionResponse::failure(&AppError::Delete(RepoError::InvalidData(
            "task id is not a UUID".to_string(),
        )));
    };

    let result = with_controller(|controller| {
        let existing = controller.tasks().iter().find(|task| task.id == id).cloned();
        controller.delete_task(id)?;
        Ok(existing)
    });
    match result {
        Ok(Some(task)) => TaskActionResponse::success(&task),
        Ok(None) => TaskActionResponse {
            ok: true,
            task: None,
            alert_title: String::new(),
            message: String::new(),
        },
        Err(err) => TaskActionResponse::failure(&err),
    }
}

/// Returns the confirmation dialog shown before `task_delete`.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_confirmation_prompt() -> DeletePrompt {
    DeletePrompt {
        title: DELETE_CONFIRMATION.title.to_string(),
        message: DELETE_CONFIRMATION.message.to_string(),
        confirm_label: DELETE_CONFIRMATION.confirm_label.to_string(),
        cancel_label: DELETE_CONFIRMATION.cancel_label.to_string(),
    }
}

/// Manual sync / pull-to-refresh.
///
/// # FFI contract
/// - Async on the Dart side; blocks for the simulated delay per task.
/// - Storage stays available to other calls while a task is in flight.
/// - Offline requests fail with the "no internet" alert.
pub fn tasks_sync() -> SyncResponse {
    match with_controller(|controller| controller.synchronize()) {
        Ok(report) => SyncResponse::success(report),
        Err(err) => SyncResponse::failure(&err),
    }
}

/// Platform connectivity callback.
///
/// The reported state is recorded before storage is touched, so the status
/// stays current even when storage fails. Transitions to connected trigger a
/// sync pass whose failures are only logged. Repeated reports of the same
/// state do nothing.
pub fn connectivity_changed(is_connected: bool) -> SyncResponse {
    let state = ConnectivityState::from_connected(is_connected);
    if !CONNECTIVITY.set_state(state) || !state.is_connected() {
        return SyncResponse::success(SyncReport::default());
    }

    let result = with_controller(|controller| {
        Ok(controller
            .handle_connectivity_change(state)
            .unwrap_or_default())
    });
    match result {
        Ok(report) => SyncResponse::success(report),
        Err(err) => SyncResponse::failure(&err),
    }
}

/// Returns the last connectivity state reported by the platform.
#[flutter_rust_bridge::frb(sync)]
pub fn connectivity_status() -> bool {
    CONNECTIVITY.current_state().is_connected()
}

impl TaskActionResponse {
    fn success(task: &Task) -> Self {
        Self {
            ok: true,
            task: Some(to_task_item(task)),
            alert_title: String::new(),
            message: String::new(),
        }
    }

    fn failure(err: &AppError) -> Self {
        let alert = err.alert();
        Self {
            ok: false,
            task: None,
            alert_title: alert.title.to_string(),
            message: alert.message.to_string(),
        }
    }
}

impl SyncResponse {
    fn success(report: SyncReport) -> Self {
        Self {
            ok: true,
            attempted: saturating_u32(report.attempted),
            synced: saturating_u32(report.synced),
            rejected: saturating_u32(report.rejected),
            is_online: CONNECTIVITY.current_state().is_connected(),
            alert_title: String::new(),
            message: String::new(),
        }
    }

    fn failure(err: &AppError) -> Self {
        let alert = err.alert();
        Self {
            ok: false,
            attempted: 0,
            synced: 0,
            rejected: 0,
            is_online: CONNECTIVITY.current_state().is_connected(),
            alert_title: alert.title.to_string(),
            message: alert.message.to_string(),
        }
    }
}

fn saturating_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

/// Task repository taking `STORAGE_LOCK` around every call.
///
/// Calls never nest, so one non-reentrant lock is enough.
#[derive(Clone)]
struct LockedRepository<R> {
    inner: R,
}

fn storage_guard() -> MutexGuard<'static, ()> {
    STORAGE_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R: TaskRepository> TaskRepository for LockedRepository<R> {
    fn load_tasks(&self) -> RepoResult<Vec<Task>> {
        let _guard = storage_guard();
        self.inner.load_tasks()
    }

    fn append_task(&self, task: &Task) -> RepoResult<()> {
        let _guard = storage_guard();
        self.inner.append_task(task)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<bool> {
        let _guard = storage_guard();
        self.inner.delete_task(id)
    }

    fn mark_synced(&self, id: TaskId) -> RepoResult<bool> {
        let _guard = storage_guard();
        self.inner.mark_synced(id)
    }

    fn clear_all(&self) -> RepoResult<()> {
        let _guard = storage_guard();
        self.inner.clear_all()
    }
}

fn resolve_config(lookup: impl Fn(&str) -> Option<String>) -> Result<CoreConfig, AppError> {
    CoreConfig::from_lookup(lookup).map_err(|err| {
        error!("event=ffi_config module=ffi status=error error={err}");
        AppError::Config(err)
    })
}

fn active_config() -> Result<&'static CoreConfig, AppError> {
    CONFIG.get_or_try_init(|| resolve_config(|key| std::env::var(key).ok()))
}

fn with_controller<T>(
    f: impl FnOnce(&mut FfiController<'_, SimulatedBackend>) -> Result<T, AppError>,
) -> Result<T, AppError> {
    with_controller_using(|config| SimulatedBackend::with_delay(config.sync_delay), f)
}

fn with_controller_using<B, T>(
    backend: impl FnOnce(&CoreConfig) -> B,
    f: impl FnOnce(&mut FfiController<'_, B>) -> Result<T, AppError>,
) -> Result<T, AppError>
where
    B: RemoteBackend,
{
    let config = active_config()?;

    let conn = {
        // First open of a fresh file runs migrations.
        let _guard = storage_guard();
        open_db(&config.db_path).map_err(|err| {
            error!("event=ffi_db_open module=ffi status=error error={err}");
            AppError::Load(err.into())
        })?
    };
    let store = SqliteKeyValueStore::try_new(&conn).map_err(AppError::Load)?;
    let mut controller = TaskListController::new(
        LockedRepository {
            inner: KvTaskRepository::new(store),
        },
        backend(config),
        CONNECTIVITY.clone(),
    );
    controller.load()?;
    f(&mut controller)
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        completed: task.completed,
        created_at: task.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        synced: task.synced,
    }
}
