// src/errors.rs

//! Crate-wide error types.
//!
//! - [`BootgateError`] covers configuration loading and the binary's glue.
//! - [`WaitError`] is what a reader of a [`SettableFuture`] gets back when the
//!   value is not available.
//! - [`DependencyError`] is handed to a job's dependency-failure hook.
//! - [`ScheduleError`] is returned when a submission cannot be accepted.
//!
//! [`SettableFuture`]: crate::future::SettableFuture

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BootgateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Cycle detected in job graph: {0}")]
    DagCycle(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure cause stored in a future. Shared so every waiter sees the same error.
pub type SharedError = Arc<anyhow::Error>;

/// Why a value could not be read from a future.
#[derive(Error, Debug, Clone)]
pub enum WaitError {
    #[error("future '{future}' was cancelled")]
    Cancelled { future: String },

    #[error("future '{future}' failed: {cause:#}")]
    Failed { future: String, cause: SharedError },

    #[error("timed out after {timeout:?} waiting for future '{future}'")]
    TimedOut { future: String, timeout: Duration },
}

impl WaitError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WaitError::Cancelled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::TimedOut { .. })
    }
}

/// Delivered to [`Job::on_dependency_failed`](crate::job::Job::on_dependency_failed).
#[derive(Error, Debug, Clone)]
pub enum DependencyError {
    /// A dependency resolved to a failure.
    #[error("dependency '{dependency}' failed: {cause:#}")]
    Failed {
        dependency: String,
        cause: SharedError,
    },

    /// A dependency was cancelled.
    #[error("dependency '{dependency}' was cancelled")]
    Cancelled { dependency: String },

    /// Dependencies were still pending when the round limit ran out.
    #[error("dependencies not ready after {rounds} checks: {}", .pending.join(", "))]
    NotReady { rounds: u32, pending: Vec<String> },
}

impl DependencyError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DependencyError::Cancelled { .. })
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DependencyError::NotReady { .. })
    }
}

impl From<WaitError> for DependencyError {
    fn from(err: WaitError) -> Self {
        match err {
            WaitError::Cancelled { future } => DependencyError::Cancelled { dependency: future },
            WaitError::Failed { future, cause } => DependencyError::Failed {
                dependency: future,
                cause,
            },
            // Round timeouts are accounted by the executor, not by a single wait.
            WaitError::TimedOut { future, .. } => DependencyError::NotReady {
                rounds: 1,
                pending: vec![future],
            },
        }
    }
}

/// Why the executor refused a submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("job '{0}' is already in flight")]
    AlreadyInFlight(String),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BootgateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_lists_every_pending_dependency() {
        let err = DependencyError::NotReady {
            rounds: 3,
            pending: vec!["WIFI Ready".to_string(), "Metadata Ready".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 checks"));
        assert!(msg.contains("WIFI Ready, Metadata Ready"));
        assert!(err.is_timeout());
    }

    #[test]
    fn cancelled_wait_maps_to_cancelled_dependency() {
        let err: DependencyError = WaitError::Cancelled {
            future: "radio".to_string(),
        }
        .into();
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "dependency 'radio' was cancelled");
    }
}
