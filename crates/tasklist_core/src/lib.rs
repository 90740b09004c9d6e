//! Core domain logic for the offline-first task list.
//! This crate is the single source of truth for task storage and sync rules.

pub mod app;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;

pub use app::controller::TaskListController;
pub use app::{AppError, ConfirmPrompt, UserAlert, DELETE_CONFIRMATION};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use repo::kv_store::{KeyValueStore, SqliteKeyValueStore};
pub use repo::task_repo::{KvTaskRepository, TaskRepository, TASKS_STORAGE_KEY};
pub use repo::{RepoError, RepoResult};
pub use service::task_service::TaskService;
pub use sync::connectivity::{
    ConnectivityListener, ConnectivityMonitor, ConnectivityProvider, ConnectivityState,
    Subscription,
};
pub use sync::remote::{RemoteBackend, SendReceipt, SimulatedBackend, DEFAULT_SEND_DELAY};
pub use sync::sync_service::{SyncOutcome, SyncReport, SyncService};
pub use sync::{SyncError, SyncResult};

/// Repository type used by front ends: task blob over SQLite key-value storage.
pub type SqliteTaskRepository<'conn> = KvTaskRepository<SqliteKeyValueStore<'conn>>;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
