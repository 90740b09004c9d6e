//! Remote backend boundary.
//!
//! There is no real endpoint; `SimulatedBackend` stands in for one by
//! waiting a fixed delay and acknowledging every task.

use super::SyncResult;
use crate::model::task::Task;
use log::debug;
use std::time::Duration;

/// Delay applied by the simulated backend per task.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(1000);

/// Remote acknowledgement for one sent task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReceipt {
    pub success: bool,
}

/// Destination for unsynced tasks.
pub trait RemoteBackend {
    fn send_task(&self, task: &Task) -> SyncResult<SendReceipt>;
}

/// Stand-in backend that always succeeds after `delay`.
#[derive(Debug, Clone)]
pub struct SimulatedBackend {
    delay: Duration,
}

impl SimulatedBackend {
    pub fn new() -> Self {
        Self::with_delay(DEFAULT_SEND_DELAY)
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteBackend for SimulatedBackend {
    fn send_task(&self, task: &Task) -> SyncResult<SendReceipt> {
        debug!(
            "event=remote_send module=sync status=start task_id={} delay_ms={}",
            task.id,
            self.delay.as_millis()
        );
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(SendReceipt { success: true })
    }
}

#[cfg(test)]
mod tests {
    use super::{RemoteBackend, SimulatedBackend, DEFAULT_SEND_DELAY};
    use crate::model::task::Task;
    use std::time::{Duration, Instant};

    #[test]
    fn default_delay_is_one_second() {
        assert_eq!(SimulatedBackend::new().delay(), DEFAULT_SEND_DELAY);
        assert_eq!(DEFAULT_SEND_DELAY, Duration::from_secs(1));
    }

    #[test]
    fn always_reports_success_after_delay() {
        let backend = SimulatedBackend::with_delay(Duration::from_millis(20));
        let task = Task::new("send me").unwrap();

        let started = Instant::now();
        let receipt = backend.send_task(&task).unwrap();
        assert!(receipt.success);
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
