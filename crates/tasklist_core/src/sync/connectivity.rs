//! Network connectivity state and transition subscription.
//!
//! # Responsibility
//! - Expose the current connected/disconnected state to sync callers.
//! - Deliver transitions to fire-and-forget listeners.
//!
//! # Invariants
//! - Listeners are notified only when the state actually changes.
//! - Listeners run outside internal locks, in subscription order.
//! - Dropping a `Subscription` removes its listener.

use log::info;
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Reachability reported by the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Connected,
    Disconnected,
}

impl ConnectivityState {
    pub fn from_connected(is_connected: bool) -> Self {
        if is_connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn is_connected(self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl Display for ConnectivityState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connected => write!(f, "connected"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Callback invoked on every connectivity transition.
pub type ConnectivityListener = Arc<dyn Fn(ConnectivityState) + Send + Sync>;

/// Handle keeping one listener registered.
pub struct Subscription {
    unsubscribe: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(unsubscribe: impl FnOnce() + Send + 'static) -> Self {
        Self {
            unsubscribe: Some(Box::new(unsubscribe)),
        }
    }

    /// Removes the listener now instead of at drop.
    pub fn unsubscribe(mut self) {
        self.run_unsubscribe();
    }

    fn run_unsubscribe(&mut self) {
        if let Some(unsubscribe) = self.unsubscribe.take() {
            unsubscribe();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_unsubscribe();
    }
}

/// Source of connectivity state for sync and UI.
pub trait ConnectivityProvider {
    fn current_state(&self) -> ConnectivityState;
    fn subscribe(&self, listener: ConnectivityListener) -> Subscription;
}

/// In-process connectivity provider fed by the host platform.
///
/// Clones share state and listeners.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    state: Mutex<ConnectivityState>,
    listeners: Mutex<ListenerTable>,
}

#[derive(Default)]
struct ListenerTable {
    next_id: u64,
    entries: BTreeMap<u64, ConnectivityListener>,
}

impl ConnectivityMonitor {
    pub fn new(initial: ConnectivityState) -> Self {
        Self {
            inner: Arc::new(MonitorInner {
                state: Mutex::new(initial),
                listeners: Mutex::new(ListenerTable::default()),
            }),
        }
    }

    /// Records a platform report; returns `true` when it was a transition.
    pub fn set_state(&self, state: ConnectivityState) -> bool {
        {
            let mut current = self
                .inner
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *current == state {
                return false;
            }
            *current = state;
        }

        info!("event=connectivity_change module=sync status=ok state={state}");
        let listeners: Vec<ConnectivityListener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(state);
        }
        true
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }
}

impl Default for ConnectivityMonitor {
    fn default() -> Self {
        Self::new(ConnectivityState::Connected)
    }
}

impl ConnectivityProvider for ConnectivityMonitor {
    fn current_state(&self) -> ConnectivityState {
        *self
            .inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn subscribe(&self, listener: ConnectivityListener) -> Subscription {
        let id = {
            let mut table = self
                .inner
                .listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let id = table.next_id;
            table.next_id += 1;
            table.entries.insert(id, listener);
            id
        };

        let weak: Weak<MonitorInner> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner
                    .listeners
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entries
                    .remove(&id);
            }
        })
    }
}
