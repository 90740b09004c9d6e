//! Sync pass over unsynced tasks.
//!
//! # Invariants
//! - A disconnected pass touches neither storage nor the backend.
//! - Tasks are sent sequentially in stored order; each send completes before
//!   the next starts.
//! - Each acknowledgement is persisted by its own read-modify-write, so a
//!   task deleted mid-pass stays deleted.

use super::connectivity::ConnectivityProvider;
use super::remote::RemoteBackend;
use super::SyncResult;
use crate::repo::task_repo::TaskRepository;
use log::{error, info, warn};
use std::time::Instant;

/// Counters for one completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Unsynced tasks found at the start of the pass.
    pub attempted: usize,
    /// Tasks acknowledged and flagged `synced`.
    pub synced: usize,
    /// Tasks the backend answered with `success = false`.
    pub rejected: usize,
}

/// Result of a sync request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No connectivity; nothing was read or sent.
    Offline,
    Completed(SyncReport),
}

/// Pushes unsynced tasks through a remote backend.
pub struct SyncService<R, B, C>
where
    R: TaskRepository,
    B: RemoteBackend,
    C: ConnectivityProvider,
{
    repo: R,
    backend: B,
    connectivity: C,
}

impl<R, B, C> SyncService<R, B, C>
where
    R: TaskRepository,
    B: RemoteBackend,
    C: ConnectivityProvider,
{
    pub fn new(repo: R, backend: B, connectivity: C) -> Self {
        Self {
            repo,
            backend,
            connectivity,
        }
    }

    pub fn connectivity(&self) -> &C {
        &self.connectivity
    }

    /// Sends every unsynced task and flags acknowledged ones.
    ///
    /// # Errors
    /// - Storage or transport failures abort the pass; tasks flagged before
    ///   the failure stay flagged.
    pub fn sync_tasks(&self) -> SyncResult<SyncOutcome> {
        let state = self.connectivity.current_state();
        if !state.is_connected() {
            info!("event=sync_run module=sync status=skipped reason=offline");
            return Ok(SyncOutcome::Offline);
        }

        let started_at = Instant::now();
        match self.run_pass() {
            Ok(report) => {
                info!(
                    "event=sync_run module=sync status=ok attempted={} synced={} rejected={} duration_ms={}",
                    report.attempted,
                    report.synced,
                    report.rejected,
                    started_at.elapsed().as_millis()
                );
                Ok(SyncOutcome::Completed(report))
            }
            Err(err) => {
                error!(
                    "event=sync_run module=sync status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }

    fn run_pass(&self) -> SyncResult<SyncReport> {
        let pending: Vec<_> = self
            .repo
            .load_tasks()?
            .into_iter()
            .filter(|task| task.is_pending_sync())
            .collect();

        let mut report = SyncReport {
            attempted: pending.len(),
            ..SyncReport::default()
        };

        for task in &pending {
            let receipt = self.backend.send_task(task)?;
            if !receipt.success {
                warn!(
                    "event=sync_task module=sync status=rejected task_id={}",
                    task.id
                );
                report.rejected += 1;
                continue;
            }
            if self.repo.mark_synced(task.id)? {
                report.synced += 1;
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::{SyncOutcome, SyncReport, SyncService};
    use crate::db::open_db_in_memory;
    use crate::model::task::Task;
    use crate::repo::kv_store::SqliteKeyValueStore;
    use crate::repo::task_repo::{KvTaskRepository, TaskRepository};
    use crate::sync::connectivity::{ConnectivityMonitor, ConnectivityState};
    use crate::sync::remote::{RemoteBackend, SendReceipt, SimulatedBackend};
    use crate::sync::{SyncError, SyncResult};
    use std::time::Duration;

    struct RejectTitled(&'static str);

    impl RemoteBackend for RejectTitled {
        fn send_task(&self, task: &Task) -> SyncResult<SendReceipt> {
            Ok(SendReceipt {
                success: task.title != self.0,
            })
        }
    }

    struct Unreachable;

    impl RemoteBackend for Unreachable {
        fn send_task(&self, _task: &Task) -> SyncResult<SendReceipt> {
            Err(SyncError::Remote("connection reset".to_string()))
        }
    }

    #[test]
    fn rejected_send_leaves_task_pending() {
        let conn = open_db_in_memory().unwrap();
        let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
        repo.append_task(&Task::new("ok").unwrap()).unwrap();
        repo.append_task(&Task::new("nope").unwrap()).unwrap();

        let service = SyncService::new(
            repo.clone(),
            RejectTitled("nope"),
            ConnectivityMonitor::default(),
        );
        let outcome = service.sync_tasks().unwrap();
        assert_eq!(
            outcome,
            SyncOutcome::Completed(SyncReport {
                attempted: 2,
                synced: 1,
                rejected: 1,
            })
        );

        let tasks = repo.load_tasks().unwrap();
        assert!(tasks[0].synced);
        assert!(!tasks[1].synced);
    }

    #[test]
    fn transport_error_aborts_pass() {
        let conn = open_db_in_memory().unwrap();
        let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
        repo.append_task(&Task::new("a").unwrap()).unwrap();

        let service = SyncService::new(repo.clone(), Unreachable, ConnectivityMonitor::default());
        assert!(matches!(service.sync_tasks(), Err(SyncError::Remote(_))));
        assert!(!repo.load_tasks().unwrap()[0].synced);
    }

    #[test]
    fn offline_pass_reports_offline() {
        let conn = open_db_in_memory().unwrap();
        let repo = KvTaskRepository::new(SqliteKeyValueStore::try_new(&conn).unwrap());
        let service = SyncService::new(
            repo,
            SimulatedBackend::with_delay(Duration::ZERO),
            ConnectivityMonitor::new(ConnectivityState::Disconnected),
        );
        assert_eq!(service.sync_tasks().unwrap(), SyncOutcome::Offline);
    }
}
