//! Task domain model.
//!
//! # Responsibility
//! - Define the single record persisted by the task list.
//! - Keep the serialized shape compatible with the stored JSON blob.
//!
//! # Invariants
//! - `id` is generated client-side and never reused for another task.
//! - `title` is trimmed and never blank.
//! - `synced` only ever moves from `false` to `true`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of one task.
pub type TaskId = Uuid;

/// Validation failures for task records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty after trimming.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title cannot be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A user-created to-do item.
///
/// Field names are serialized in camelCase (`createdAt`) to stay readable by
/// blobs written before this core existed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Carried through storage; nothing toggles it yet.
    pub completed: bool,
    /// RFC 3339 UTC timestamp of creation.
    pub created_at: DateTime<Utc>,
    /// `true` once the remote backend acknowledged the task.
    pub synced: bool,
}

impl Task {
    /// Creates a new unsynced task with a generated ID and current timestamp.
    ///
    /// # Errors
    /// - Returns `EmptyTitle` when `title` is blank after trimming.
    pub fn new(title: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        Self::with_id(Uuid::new_v4(), title, Utc::now())
    }

    /// Creates a task with caller-provided identity and timestamp.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(
        id: TaskId,
        title: impl AsRef<str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        let task = Self {
            id,
            title: title.as_ref().trim().to_string(),
            completed: false,
            created_at,
            synced: false,
        };
        task.validate()?;
        Ok(task)
    }

    /// Checks record-level invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Flags this task as acknowledged by the remote backend.
    pub fn mark_synced(&mut self) {
        self.synced = true;
    }

    /// Returns whether the next sync pass should send this task.
    pub fn is_pending_sync(&self) -> bool {
        !self.synced
    }
}

#[cfg(test)]
mod tests {
    use super::{Task, TaskValidationError};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn new_task_starts_unsynced_and_incomplete() {
        let task = Task::new("  buy milk ").unwrap();
        assert_eq!(task.title, "buy milk");
        assert!(!task.completed);
        assert!(!task.synced);
        assert!(task.is_pending_sync());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(Task::new("   \n").unwrap_err(), TaskValidationError::EmptyTitle);
    }

    #[test]
    fn generated_ids_are_unique() {
        let first = Task::new("a").unwrap();
        let second = Task::new("a").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn serializes_with_camel_case_created_at() {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let id = Uuid::parse_str("00000000-0000-4000-8000-000000000001").unwrap();
        let task = Task::with_id(id, "write report", created_at).unwrap();

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["id"], "00000000-0000-4000-8000-000000000001");
        assert_eq!(value["title"], "write report");
        assert_eq!(value["completed"], false);
        assert_eq!(value["synced"], false);
        assert_eq!(value["createdAt"], "2024-05-01T12:00:00Z");
    }

    #[test]
    fn deserializes_javascript_iso_timestamp() {
        let json = r#"{
            "id": "00000000-0000-4000-8000-000000000002",
            "title": "legacy",
            "completed": false,
            "createdAt": "2024-05-01T12:00:00.123Z",
            "synced": true
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.synced);
        assert_eq!(task.created_at.timestamp_millis(), 1_714_564_800_123);
    }

    #[test]
    fn mark_synced_is_idempotent() {
        let mut task = Task::new("x").unwrap();
        task.mark_synced();
        task.mark_synced();
        assert!(task.synced);
    }
}
