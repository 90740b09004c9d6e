use std::time::Duration;
use tasklist_core::db::open_db_in_memory;
use tasklist_core::{
    AppError, ConnectivityMonitor, ConnectivityState, KeyValueStore, KvTaskRepository, RepoError,
    SimulatedBackend, SqliteKeyValueStore, SyncReport, TaskListController, TaskRepository,
    DELETE_CONFIRMATION, TASKS_STORAGE_KEY,
};
use uuid::Uuid;

fn instant_backend() -> SimulatedBackend {
    SimulatedBackend::with_delay(Duration::ZERO)
}

#[test]
fn load_add_and_delete_keep_list_in_step_with_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let mut controller =
        TaskListController::new(repo.clone(), instant_backend(), ConnectivityMonitor::default());

    assert!(controller.load().unwrap().is_empty());

    let first = controller.add_task("first").unwrap();
    let second = controller.add_task("second").unwrap();
    assert_eq!(controller.tasks().len(), 2);

    assert!(controller.delete_task(first.id).unwrap());
    assert_eq!(controller.tasks(), &[second.clone()]);
    assert_eq!(repo.load_tasks().unwrap(), vec![second]);
}

#[test]
fn blank_title_is_rejected_before_storage() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let mut controller =
        TaskListController::new(repo.clone(), instant_backend(), ConnectivityMonitor::default());

    let err = controller.add_task("  ").unwrap_err();
    assert!(matches!(err, AppError::EmptyTitle));
    assert!(repo.load_tasks().unwrap().is_empty());
}

#[test]
fn manual_sync_offline_surfaces_alert_and_keeps_flags() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let connectivity = ConnectivityMonitor::new(ConnectivityState::Disconnected);
    let mut controller = TaskListController::new(repo.clone(), instant_backend(), connectivity);
    controller.add_task("pending").unwrap();

    let err = controller.synchronize().unwrap_err();
    assert!(matches!(err, AppError::Offline));
    assert_eq!(err.alert().message, "No internet connection.");
    assert!(!controller.is_refreshing());
    assert!(!controller.is_online());
    assert!(!repo.load_tasks().unwrap()[0].synced);
}

#[test]
fn manual_sync_online_reloads_synced_tasks() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let mut controller =
        TaskListController::new(repo, instant_backend(), ConnectivityMonitor::default());
    controller.add_task("a").unwrap();
    controller.add_task("b").unwrap();

    let report = controller.synchronize().unwrap();
    assert_eq!(
        report,
        SyncReport {
            attempted: 2,
            synced: 2,
            rejected: 0,
        }
    );
    assert!(controller.tasks().iter().all(|task| task.synced));
    assert!(!controller.is_refreshing());
}

#[test]
fn connectivity_transitions_drive_online_flag_and_auto_sync() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let connectivity = ConnectivityMonitor::new(ConnectivityState::Disconnected);
    let mut controller =
        TaskListController::new(repo.clone(), instant_backend(), connectivity.clone());
    assert!(!controller.is_online());

    controller.add_task("queued offline").unwrap();
    assert_eq!(controller.process_connectivity_events(), 0);

    connectivity.set_state(ConnectivityState::Connected);
    assert_eq!(controller.process_connectivity_events(), 1);
    assert!(controller.is_online());
    assert!(controller.tasks()[0].synced);
    assert!(repo.load_tasks().unwrap()[0].synced);

    connectivity.set_state(ConnectivityState::Disconnected);
    assert_eq!(controller.process_connectivity_events(), 1);
    assert!(!controller.is_online());
}

#[test]
fn disconnect_event_does_not_sync() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let connectivity = ConnectivityMonitor::default();
    let mut controller = TaskListController::new(repo.clone(), instant_backend(), connectivity);
    controller.add_task("stay pending").unwrap();

    assert_eq!(
        controller.handle_connectivity_change(ConnectivityState::Disconnected),
        None
    );
    assert!(!repo.load_tasks().unwrap()[0].synced);
}

#[test]
fn dropping_controller_releases_subscription() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let connectivity = ConnectivityMonitor::default();

    let controller = TaskListController::new(repo, instant_backend(), connectivity.clone());
    assert_eq!(connectivity.listener_count(), 1);
    drop(controller);
    assert_eq!(connectivity.listener_count(), 0);
}

#[test]
fn delete_prompt_has_confirm_and_cancel() {
    let conn = open_db_in_memory().unwrap();
    let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
    let controller =
        TaskListController::new(repo, instant_backend(), ConnectivityMonitor::default());

    let prompt = controller.delete_confirmation();
    assert_eq!(prompt, DELETE_CONFIRMATION);
    assert_eq!(prompt.confirm_label, "Delete");
    assert_eq!(prompt.cancel_label, "Cancel");
}

#[test]
fn unreadable_blob_surfaces_operation_specific_alerts() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKeyValueStore::try_new(&conn).unwrap();
    let mut controller = TaskListController::new(
        KvTaskRepository::new(store),
        instant_backend(),
        ConnectivityMonitor::default(),
    );
    store.set_item(TASKS_STORAGE_KEY, "{corrupt").unwrap();

    let err = controller.load().unwrap_err();
    assert!(matches!(err, AppError::Load(RepoError::InvalidData(_))));
    assert_eq!(err.alert().message, "Could not load tasks.");

    let err = controller.add_task("write me").unwrap_err();
    assert!(matches!(err, AppError::Add(RepoError::InvalidData(_))));
    assert_eq!(err.alert().message, "Could not add the task. Try again.");

    let err = controller.delete_task(Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, AppError::Delete(RepoError::InvalidData(_))));
    assert_eq!(err.alert().message, "Could not delete the task. Try again.");

    let err = controller.synchronize().unwrap_err();
    assert!(matches!(err, AppError::Sync(_)));
    assert!(!controller.is_refreshing());

    assert!(controller.tasks().is_empty());
    assert_eq!(
        store.get_item(TASKS_STORAGE_KEY).unwrap().as_deref(),
        Some("{corrupt")
    );
}
