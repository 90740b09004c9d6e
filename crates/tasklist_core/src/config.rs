//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Unset or blank variables fall back to defaults.
//! - Set-but-invalid variables are rejected, never silently defaulted.

use crate::logging::{default_log_level, normalize_level};
use crate::sync::remote::DEFAULT_SEND_DELAY;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TASKLIST_DB_PATH";
pub const ENV_SYNC_DELAY_MS: &str = "TASKLIST_SYNC_DELAY_MS";
pub const ENV_LOG_LEVEL: &str = "TASKLIST_LOG_LEVEL";

const DEFAULT_DB_FILE_NAME: &str = "tasklist.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key} value `{value}`: {reason}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Settings shared by the FFI and CLI front ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file backing local storage.
    pub db_path: PathBuf,
    /// Per-task delay of the simulated backend.
    pub sync_delay: Duration,
    /// Normalized `trace|debug|info|warn|error` level.
    pub log_level: &'static str,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            sync_delay: DEFAULT_SEND_DELAY,
            log_level: default_log_level(),
        }
    }
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }

        if let Some(raw) = read(ENV_SYNC_DELAY_MS) {
            let millis = raw.parse::<u64>().map_err(|err| ConfigError::InvalidValue {
                key: ENV_SYNC_DELAY_MS,
                value: raw.clone(),
                reason: err.to_string(),
            })?;
            config.sync_delay = Duration::from_millis(millis);
        }

        if let Some(raw) = read(ENV_LOG_LEVEL) {
            config.log_level =
                normalize_level(&raw).map_err(|reason| ConfigError::InvalidValue {
                    key: ENV_LOG_LEVEL,
                    value: raw.clone(),
                    reason,
                })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DB_PATH, ENV_LOG_LEVEL, ENV_SYNC_DELAY_MS};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = CoreConfig::from_lookup(lookup(&[(ENV_DB_PATH, "   ")])).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.sync_delay, Duration::from_secs(1));
    }

    #[test]
    fn reads_overrides() {
        let config = CoreConfig::from_lookup(lookup(&[
            (ENV_DB_PATH, "/data/tasks.sqlite3"),
            (ENV_SYNC_DELAY_MS, "0"),
            (ENV_LOG_LEVEL, "WARNING"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, PathBuf::from("/data/tasks.sqlite3"));
        assert_eq!(config.sync_delay, Duration::ZERO);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn rejects_non_numeric_delay() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_SYNC_DELAY_MS, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_SYNC_DELAY_MS,
                ..
            }
        ));
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = CoreConfig::from_lookup(lookup(&[(ENV_LOG_LEVEL, "verbose")])).unwrap_err();
        assert!(err.to_string().contains(ENV_LOG_LEVEL));
    }
}
