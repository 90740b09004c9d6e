//! UI-independent application state for the task list screen.
//!
//! # Responsibility
//! - Hold the visible list plus online/refreshing flags.
//! - Turn every failure into one generic user alert.
//!
//! # Invariants
//! - Failures are logged where they are caught and never retried.

pub mod controller;

use crate::config::ConfigError;
use crate::repo::RepoError;
use crate::sync::SyncError;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ALERT_TITLE: &str = "Error";

/// Title/message pair for a modal alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserAlert {
    pub title: &'static str,
    pub message: &'static str,
}

/// Confirmation dialog shown before a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub message: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
}

pub const DELETE_CONFIRMATION: ConfirmPrompt = ConfirmPrompt {
    title: "Delete task",
    message: "Are you sure you want to delete this task?",
    confirm_label: "Delete",
    cancel_label: "Cancel",
};

/// Controller-level failure.
#[derive(Debug)]
pub enum AppError {
    /// Submitted title is blank; nothing was stored.
    EmptyTitle,
    /// Manual sync requested without connectivity.
    Offline,
    /// Runtime configuration is set but invalid; storage was not opened.
    Config(ConfigError),
    Load(RepoError),
    Add(RepoError),
    Delete(RepoError),
    Sync(SyncError),
}

impl AppError {
    /// Generic alert content for this failure.
    pub fn alert(&self) -> UserAlert {
        let message = match self {
            Self::EmptyTitle => "Enter a task title.",
            Self::Offline => "No internet connection.",
            Self::Config(_) => "Task storage is not configured correctly.",
            Self::Load(_) => "Could not load tasks.",
            Self::Add(_) => "Could not add the task. Try again.",
            Self::Delete(_) => "Could not delete the task. Try again.",
            Self::Sync(_) => "Could not sync tasks.",
        };
        UserAlert {
            title: ALERT_TITLE,
            message,
        }
    }
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
            Self::Offline => write!(f, "no network connectivity"),
            Self::Config(err) => write!(f, "configuration rejected: {err}"),
            Self::Load(err) => write!(f, "load failed: {err}"),
            Self::Add(err) => write!(f, "add failed: {err}"),
            Self::Delete(err) => write!(f, "delete failed: {err}"),
            Self::Sync(err) => write!(f, "sync failed: {err}"),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Load(err) | Self::Add(err) | Self::Delete(err) => Some(err),
            Self::Sync(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::EmptyTitle | Self::Offline => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, ALERT_TITLE};
    use crate::config::{ConfigError, ENV_SYNC_DELAY_MS};
    use crate::repo::RepoError;
    use crate::sync::SyncError;
    use std::error::Error;

    #[test]
    fn every_failure_maps_to_generic_error_alert() {
        let errors = [
            AppError::EmptyTitle,
            AppError::Offline,
            AppError::Load(RepoError::InvalidData("x".to_string())),
            AppError::Add(RepoError::InvalidData("x".to_string())),
            AppError::Delete(RepoError::InvalidData("x".to_string())),
            AppError::Sync(SyncError::Remote("x".to_string())),
        ];
        for err in errors {
            let alert = err.alert();
            assert_eq!(alert.title, ALERT_TITLE);
            assert!(!alert.message.is_empty());
        }
    }

    #[test]
    fn offline_alert_mentions_connection() {
        assert!(AppError::Offline.alert().message.contains("internet"));
    }

    #[test]
    fn config_error_keeps_the_rejected_key() {
        let err = AppError::from(ConfigError::InvalidValue {
            key: ENV_SYNC_DELAY_MS,
            value: "soon".to_string(),
            reason: "expected milliseconds".to_string(),
        });

        assert_eq!(err.alert().title, ALERT_TITLE);
        assert_eq!(
            err.alert().message,
            "Task storage is not configured correctly."
        );
        assert!(err.to_string().contains(ENV_SYNC_DELAY_MS));
        assert!(err.source().is_some());
    }
}
