// src/exec/request.rs

//! Submission inputs and outputs.

use tokio::task::JoinHandle;
use tracing::error;

use crate::errors::{DependencyError, SharedError};
use crate::future::DynDependency;
use crate::job::Job;
use crate::types::RoundLimit;

/// A job plus the futures it must wait on before its first step.
pub struct ScheduleRequest<J> {
    pub(crate) job: J,
    pub(crate) dependencies: Vec<DynDependency>,
    /// `None` uses the executor's configured limit.
    pub(crate) round_limit: Option<RoundLimit>,
}

impl<J: Job> ScheduleRequest<J> {
    pub fn new(job: J) -> Self {
        Self {
            job,
            dependencies: Vec::new(),
            round_limit: None,
        }
    }

    /// Add one dependency. Order is preserved and is the order of checks.
    pub fn after(mut self, dep: impl Into<DynDependency>) -> Self {
        self.dependencies.push(dep.into());
        self
    }

    pub fn after_all(mut self, deps: impl IntoIterator<Item = DynDependency>) -> Self {
        self.dependencies.extend(deps);
        self
    }

    /// Override the executor-wide straggler round limit for this submission.
    pub fn round_limit(mut self, limit: RoundLimit) -> Self {
        self.round_limit = Some(limit);
        self
    }
}

/// How a submission ended. Diagnostic only.
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// `step()` eventually returned `Continuation::Done`.
    Finished { steps: u32 },
    /// The dependency-failure hook ran instead of `step()`.
    DependencyFailed(DependencyError),
    /// `step()` returned an error; no reschedule.
    StepFailed(SharedError),
    /// `step()` or a hook panicked.
    Panicked,
    /// The worker pool shut down before the submission ended.
    Interrupted,
}

impl SubmissionOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, SubmissionOutcome::Finished { .. })
    }
}

/// Handle to a live submission.
///
/// Dropping it does not affect the submission.
#[derive(Debug)]
pub struct SubmissionHandle {
    label: String,
    join: JoinHandle<SubmissionOutcome>,
}

impl SubmissionHandle {
    pub(crate) fn new(label: String, join: JoinHandle<SubmissionOutcome>) -> Self {
        Self { label, join }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait for the submission to end.
    pub async fn join(self) -> SubmissionOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(err) if err.is_panic() => {
                error!(job = %self.label, "submission panicked");
                SubmissionOutcome::Panicked
            }
            Err(err) => {
                error!(job = %self.label, error = %err, "submission interrupted");
                SubmissionOutcome::Interrupted
            }
        }
    }
}
