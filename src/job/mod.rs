// src/job/mod.rs

//! The contract every schedulable unit of work implements.
//!
//! A job is re-invokable: the executor calls [`Job::step`] once its
//! dependencies are satisfied and again after every positive
//! [`Continuation`], so a correct step checks whether its own futures are
//! already done and returns [`Continuation::Done`] if so.
//!
//! The two hooks have no default bodies. Jobs that only want logging opt into
//! [`log_dependency_failure`] and [`log_stragglers`].

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use crate::errors::DependencyError;
use crate::future::{DynDependency, dependency};

/// What the executor should do after a step returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// Finished; do not reschedule.
    Done,
    /// Run `step()` again after this delay.
    After(Duration),
}

impl Continuation {
    /// Map a signed seconds count: `<= 0` is done, `> 0` reschedules.
    pub fn from_secs(secs: i64) -> Self {
        if secs <= 0 {
            Continuation::Done
        } else {
            Continuation::After(Duration::from_secs(secs.unsigned_abs()))
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Continuation::Done)
    }
}

impl From<i64> for Continuation {
    fn from(secs: i64) -> Self {
        Continuation::from_secs(secs)
    }
}

/// A schedulable unit of work.
///
/// `step()` runs on the executor's blocking pool and may perform blocking
/// side effects. The hooks run on the async workers and must return quickly.
pub trait Job: Send + 'static {
    /// Label used in logs and as the in-flight key.
    fn label(&self) -> &str;

    /// Perform one unit of work.
    ///
    /// An `Err` is logged by the executor and ends this submission without a
    /// reschedule.
    fn step(&mut self) -> Result<Continuation>;

    /// Called instead of `step()` when a dependency failed, was cancelled or
    /// never became ready within the round limit. Called at most once per
    /// submission.
    fn on_dependency_failed(&mut self, error: DependencyError);

    /// Called once per polling round while some dependencies are still
    /// pending.
    fn on_dependency_straggling(&mut self, pending: &[DynDependency]);
}

impl<J: Job + ?Sized> Job for Box<J> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn step(&mut self) -> Result<Continuation> {
        (**self).step()
    }

    fn on_dependency_failed(&mut self, error: DependencyError) {
        (**self).on_dependency_failed(error)
    }

    fn on_dependency_straggling(&mut self, pending: &[DynDependency]) {
        (**self).on_dependency_straggling(pending)
    }
}

/// Log-only dependency failure handling for jobs with nothing to propagate.
pub fn log_dependency_failure(label: &str, error: &DependencyError) {
    error!(job = %label, error = %error, "dependency failed; job will not run");
}

/// Log-only straggler handling.
pub fn log_stragglers(label: &str, pending: &[DynDependency]) {
    info!(
        job = %label,
        pending = ?dependency::names(pending),
        "still waiting on dependencies"
    );
}
