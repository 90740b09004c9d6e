//! Offline-first synchronization.
//!
//! # Responsibility
//! - Track network connectivity reported by the host platform.
//! - Push unsynced tasks to the remote backend one at a time.
//!
//! # Invariants
//! - Nothing is sent while disconnected.
//! - No retries, timeouts, or conflict handling; the next connectivity event
//!   resends whatever is still unsynced.

pub mod connectivity;
pub mod remote;
pub mod sync_service;

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SyncResult<T> = Result<T, SyncError>;

/// Failure that aborted a sync pass.
#[derive(Debug)]
pub enum SyncError {
    Repo(RepoError),
    Remote(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Remote(message) => write!(f, "remote send failed: {message}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Remote(_) => None,
        }
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}
